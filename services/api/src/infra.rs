use async_trait::async_trait;
use data_maturity::config::{LeadStoreConfig, NotificationConfig};
use data_maturity::error::AppError;
use data_maturity::survey::{
    CsvLeadStore, DisabledNotifier, GoogleSheetsLeadStore, HttpNotifier, HttpNotifierSettings,
    LeadRow, LeadStore, NotificationMessage, Notifier, NotifyError, SheetsConnector, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Keeps lead rows in process memory; used when no backend is configured.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryLeadStore {
    rows: Arc<Mutex<Vec<LeadRow>>>,
}

impl InMemoryLeadStore {
    pub(crate) fn rows(&self) -> Vec<LeadRow> {
        self.rows.lock().expect("lead store mutex poisoned").clone()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn append_row(&self, row: LeadRow) -> Result<(), StoreError> {
        let mut guard = self.rows.lock().expect("lead store mutex poisoned");
        guard.push(row);
        Ok(())
    }
}

/// Lead store selected by `LEADS_BACKEND`.
#[derive(Debug)]
pub(crate) enum ConfiguredLeadStore {
    Memory(InMemoryLeadStore),
    Csv(CsvLeadStore),
    Sheets(GoogleSheetsLeadStore<SheetsConnector>),
}

impl ConfiguredLeadStore {
    pub(crate) async fn from_config(config: &LeadStoreConfig) -> Result<Self, AppError> {
        let store = match config {
            LeadStoreConfig::Memory => Self::Memory(InMemoryLeadStore::default()),
            LeadStoreConfig::Csv { path } => Self::Csv(CsvLeadStore::new(path.clone())),
            LeadStoreConfig::Sheets {
                spreadsheet_id,
                sheet_name,
                service_account_key,
            } => Self::Sheets(
                GoogleSheetsLeadStore::connect(
                    service_account_key,
                    spreadsheet_id.clone(),
                    sheet_name.clone(),
                )
                .await?,
            ),
        };
        Ok(store)
    }

    pub(crate) fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Csv(_) => "csv",
            Self::Sheets(_) => "sheets",
        }
    }
}

#[async_trait]
impl LeadStore for ConfiguredLeadStore {
    async fn append_row(&self, row: LeadRow) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.append_row(row).await,
            Self::Csv(store) => store.append_row(row).await,
            Self::Sheets(store) => store.append_row(row).await,
        }
    }
}

/// Notifier selected by the `NOTIFY_*` settings.
#[derive(Debug)]
pub(crate) enum ConfiguredNotifier {
    Http(HttpNotifier),
    Disabled(DisabledNotifier),
}

impl ConfiguredNotifier {
    pub(crate) fn from_config(config: &NotificationConfig) -> Result<Self, AppError> {
        match HttpNotifierSettings::from_config(config) {
            Some(settings) => Ok(Self::Http(HttpNotifier::new(settings)?)),
            None => Ok(Self::Disabled(DisabledNotifier)),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

#[async_trait]
impl Notifier for ConfiguredNotifier {
    async fn send(&self, message: NotificationMessage) -> Result<(), NotifyError> {
        match self {
            Self::Http(notifier) => notifier.send(message).await,
            Self::Disabled(notifier) => notifier.send(message).await,
        }
    }
}

/// Parse a comma separated list of 1-based option positions, e.g. `1,2,4`.
pub(crate) fn parse_choices(raw: &str) -> Result<Vec<usize>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .ok()
                .filter(|choice| *choice > 0)
                .ok_or_else(|| format!("'{part}' is not an option number (1, 2, 3, ...)"))
        })
        .collect()
}
