use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::survey::{IntakeMode, DEFAULT_SESSION_TTL};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub survey: SurveyConfig,
    pub leads: LeadStoreConfig,
    pub notification: NotificationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let require_intake = parse_flag("SURVEY_REQUIRE_INTAKE", true)?;
        let intake_mode = if require_intake {
            IntakeMode::Required
        } else {
            IntakeMode::Skipped
        };
        let session_ttl = match env::var("SURVEY_SESSION_TTL_MINUTES") {
            Err(_) => DEFAULT_SESSION_TTL,
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .map(|minutes| Duration::from_secs(minutes * 60))
                .ok_or(ConfigError::InvalidNumber {
                    key: "SURVEY_SESSION_TTL_MINUTES",
                    value: raw,
                })?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            survey: SurveyConfig {
                intake_mode,
                session_ttl,
            },
            leads: LeadStoreConfig::from_env()?,
            notification: NotificationConfig::from_env(),
        })
    }
}

impl AppConfig {
    /// Startup warning for production deployments that keep leads only in memory.
    pub fn lead_storage_warning(&self) -> Option<&'static str> {
        (self.environment == AppEnvironment::Production && self.leads == LeadStoreConfig::Memory)
            .then_some("LEADS_BACKEND is memory in production; captured leads are lost on restart")
    }
}

fn parse_flag(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { key, value: raw }),
        },
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Survey flow options applied to every new session.
#[derive(Debug, Clone, Copy)]
pub struct SurveyConfig {
    pub intake_mode: IntakeMode,
    /// Idle time after which an unfinished or abandoned session is discarded.
    pub session_ttl: Duration,
}

/// Where captured leads are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadStoreConfig {
    Memory,
    Csv {
        path: PathBuf,
    },
    Sheets {
        spreadsheet_id: String,
        sheet_name: String,
        service_account_key: PathBuf,
    },
}

pub const DEFAULT_SHEET_NAME: &str = "Data Maturity Leads";

impl LeadStoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let backend = env::var("LEADS_BACKEND").unwrap_or_else(|_| "memory".to_string());

        match backend.trim().to_ascii_lowercase().as_str() {
            "memory" | "" => Ok(Self::Memory),
            "csv" => Ok(Self::Csv {
                path: non_empty_var("LEADS_CSV_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("leads.csv")),
            }),
            "sheets" => {
                let spreadsheet_id = non_empty_var("LEADS_SPREADSHEET_ID")
                    .ok_or(ConfigError::MissingSetting("LEADS_SPREADSHEET_ID"))?;
                let service_account_key = non_empty_var("GOOGLE_SERVICE_ACCOUNT_KEY")
                    .map(PathBuf::from)
                    .ok_or(ConfigError::MissingSetting("GOOGLE_SERVICE_ACCOUNT_KEY"))?;
                let sheet_name = non_empty_var("LEADS_SHEET_NAME")
                    .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
                Ok(Self::Sheets {
                    spreadsheet_id,
                    sheet_name,
                    service_account_key,
                })
            }
            _ => Err(ConfigError::InvalidLeadBackend(backend)),
        }
    }
}

/// Outbound e-mail settings. Sending is disabled unless every endpoint field is present.
#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    pub endpoint: Option<String>,
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub user_id: Option<String>,
    pub access_token: Option<String>,
    pub recipient: Option<String>,
}

impl NotificationConfig {
    fn from_env() -> Self {
        Self {
            endpoint: non_empty_var("NOTIFY_ENDPOINT"),
            service_id: non_empty_var("NOTIFY_SERVICE_ID"),
            template_id: non_empty_var("NOTIFY_TEMPLATE_ID"),
            user_id: non_empty_var("NOTIFY_USER_ID"),
            access_token: non_empty_var("NOTIFY_ACCESS_TOKEN"),
            recipient: non_empty_var("NOTIFY_RECIPIENT"),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
            && self.service_id.is_some()
            && self.template_id.is_some()
            && self.user_id.is_some()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { key: &'static str, value: String },
    InvalidNumber { key: &'static str, value: String },
    InvalidLeadBackend(String),
    MissingSetting(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} must be true or false (got '{value}')")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a positive whole number (got '{value}')")
            }
            ConfigError::InvalidLeadBackend(value) => {
                write!(f, "LEADS_BACKEND must be memory, csv, or sheets (got '{value}')")
            }
            ConfigError::MissingSetting(key) => write!(f, "{key} is required for this backend"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidLeadBackend(_)
            | ConfigError::MissingSetting(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "SURVEY_REQUIRE_INTAKE",
            "SURVEY_SESSION_TTL_MINUTES",
            "LEADS_BACKEND",
            "LEADS_CSV_PATH",
            "LEADS_SPREADSHEET_ID",
            "LEADS_SHEET_NAME",
            "GOOGLE_SERVICE_ACCOUNT_KEY",
            "NOTIFY_ENDPOINT",
            "NOTIFY_SERVICE_ID",
            "NOTIFY_TEMPLATE_ID",
            "NOTIFY_USER_ID",
            "NOTIFY_ACCESS_TOKEN",
            "NOTIFY_RECIPIENT",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.survey.intake_mode, IntakeMode::Required);
        assert_eq!(config.survey.session_ttl, DEFAULT_SESSION_TTL);
        assert_eq!(config.leads, LeadStoreConfig::Memory);
        assert!(!config.notification.is_enabled());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn intake_flag_can_be_disabled() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SURVEY_REQUIRE_INTAKE", "false");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.survey.intake_mode, IntakeMode::Skipped);

        env::set_var("SURVEY_REQUIRE_INTAKE", "maybe");
        let err = AppConfig::load().expect_err("flag rejected");
        assert!(matches!(err, ConfigError::InvalidFlag { key: "SURVEY_REQUIRE_INTAKE", .. }));
    }

    #[test]
    fn session_ttl_reads_minutes() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SURVEY_SESSION_TTL_MINUTES", "5");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.survey.session_ttl, Duration::from_secs(300));

        env::set_var("SURVEY_SESSION_TTL_MINUTES", "0");
        let err = AppConfig::load().expect_err("zero rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                key: "SURVEY_SESSION_TTL_MINUTES",
                ..
            }
        ));
    }

    #[test]
    fn sheets_backend_requires_spreadsheet_and_key() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LEADS_BACKEND", "sheets");
        let err = AppConfig::load().expect_err("missing spreadsheet id");
        assert!(matches!(err, ConfigError::MissingSetting("LEADS_SPREADSHEET_ID")));

        env::set_var("LEADS_SPREADSHEET_ID", "sheet-123");
        env::set_var("GOOGLE_SERVICE_ACCOUNT_KEY", "/secrets/key.json");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.leads,
            LeadStoreConfig::Sheets {
                spreadsheet_id: "sheet-123".to_string(),
                sheet_name: DEFAULT_SHEET_NAME.to_string(),
                service_account_key: PathBuf::from("/secrets/key.json"),
            }
        );
    }

    #[test]
    fn notification_enabled_once_endpoint_fields_present() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LEADS_BACKEND", "csv");
        env::set_var("NOTIFY_ENDPOINT", "https://mail.example.test/send");
        env::set_var("NOTIFY_SERVICE_ID", "svc");
        env::set_var("NOTIFY_TEMPLATE_ID", "tpl");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.leads,
            LeadStoreConfig::Csv {
                path: PathBuf::from("leads.csv")
            }
        );
        assert!(!config.notification.is_enabled());

        env::set_var("NOTIFY_USER_ID", "user");
        let config = AppConfig::load().expect("config loads");
        assert!(config.notification.is_enabled());
    }

    #[test]
    fn production_memory_backend_is_flagged() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads");
        assert!(config.lead_storage_warning().is_none());

        env::set_var("APP_ENV", "production");
        let config = AppConfig::load().expect("config loads");
        assert!(config
            .lead_storage_warning()
            .is_some_and(|message| message.contains("LEADS_BACKEND")));

        env::set_var("LEADS_BACKEND", "csv");
        let config = AppConfig::load().expect("config loads");
        assert!(config.lead_storage_warning().is_none());
    }

    #[test]
    fn rejects_unknown_lead_backend() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LEADS_BACKEND", "postgres");
        let err = AppConfig::load().expect_err("backend rejected");
        assert!(matches!(err, ConfigError::InvalidLeadBackend(_)));
    }
}
