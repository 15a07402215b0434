use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredLeadStore, ConfiguredNotifier};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use data_maturity::config::AppConfig;
use data_maturity::error::AppError;
use data_maturity::survey::{AssessmentService, SessionRegistry, SurveyCatalog};
use data_maturity::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if let Some(message) = config.lead_storage_warning() {
        warn!("{message}");
    }
    let store = Arc::new(ConfiguredLeadStore::from_config(&config.leads).await?);
    let notifier = Arc::new(ConfiguredNotifier::from_config(&config.notification)?);
    info!(
        lead_backend = store.backend(),
        notifications = notifier.is_enabled(),
        intake = ?config.survey.intake_mode,
        "assessment collaborators configured"
    );

    let assessment_service = Arc::new(AssessmentService::new(
        Arc::new(SurveyCatalog::standard()),
        store,
        notifier,
        config.survey.intake_mode,
    ));
    let sessions = Arc::new(SessionRegistry::with_ttl(config.survey.session_ttl));
    spawn_session_sweeper(sessions.clone());

    let app = with_assessment_routes(assessment_service, sessions)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "data maturity survey ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically drop sessions idle past the registry TTL.
fn spawn_session_sweeper(sessions: Arc<SessionRegistry>) {
    let period = (sessions.ttl() / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let dropped = sessions.sweep_expired();
            if dropped > 0 {
                debug!(dropped, remaining = sessions.len(), "expired assessment sessions dropped");
            }
        }
    });
}
