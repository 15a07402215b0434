use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::survey::catalog::SurveyCatalog;
use crate::survey::domain::{Identity, IntakeMode};
use crate::survey::leads::{LeadRow, LeadStore, StoreError};
use crate::survey::notify::{NotificationMessage, Notifier, NotifyError};
use crate::survey::registry::SessionRegistry;
use crate::survey::router::assessment_router;
use crate::survey::service::AssessmentService;
use crate::survey::session::AssessmentSession;

#[derive(Default)]
pub(super) struct MemoryStore {
    rows: Mutex<Vec<LeadRow>>,
}

impl MemoryStore {
    pub(super) fn rows(&self) -> Vec<LeadRow> {
        self.rows.lock().expect("store mutex").clone()
    }
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn append_row(&self, row: LeadRow) -> Result<(), StoreError> {
        self.rows.lock().expect("store mutex").push(row);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct UnavailableStore {
    attempts: Mutex<usize>,
}

impl UnavailableStore {
    pub(super) fn attempts(&self) -> usize {
        *self.attempts.lock().expect("attempt mutex")
    }
}

#[async_trait]
impl LeadStore for UnavailableStore {
    async fn append_row(&self, _row: LeadRow) -> Result<(), StoreError> {
        *self.attempts.lock().expect("attempt mutex") += 1;
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    messages: Mutex<Vec<NotificationMessage>>,
}

impl MemoryNotifier {
    pub(super) fn messages(&self) -> Vec<NotificationMessage> {
        self.messages.lock().expect("notifier mutex").clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, message: NotificationMessage) -> Result<(), NotifyError> {
        self.messages.lock().expect("notifier mutex").push(message);
        Ok(())
    }
}

pub(super) struct RejectingNotifier;

#[async_trait]
impl Notifier for RejectingNotifier {
    async fn send(&self, _message: NotificationMessage) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected {
            status: 401,
            message: "invalid public key".to_string(),
        })
    }
}

pub(super) fn catalog() -> Arc<SurveyCatalog> {
    Arc::new(SurveyCatalog::standard())
}

pub(super) fn identity() -> Identity {
    Identity::new("Ada Lovelace", "ada@example.com", "Manufacturing", "£1m-£5m")
}

pub(super) fn service_with<S, N>(
    store: Arc<S>,
    notifier: Arc<N>,
    intake_mode: IntakeMode,
) -> AssessmentService<S, N>
where
    S: LeadStore + 'static,
    N: Notifier + 'static,
{
    AssessmentService::new(catalog(), store, notifier, intake_mode)
}

pub(super) fn build_service() -> (
    Arc<AssessmentService<MemoryStore, MemoryNotifier>>,
    Arc<MemoryStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = service_with(store.clone(), notifier.clone(), IntakeMode::Required);
    (Arc::new(service), store, notifier)
}

pub(super) fn router_for(
    service: Arc<AssessmentService<MemoryStore, MemoryNotifier>>,
) -> axum::Router {
    router_with_sessions(service, Arc::new(SessionRegistry::default()))
}

pub(super) fn router_with_sessions(
    service: Arc<AssessmentService<MemoryStore, MemoryNotifier>>,
    sessions: Arc<SessionRegistry>,
) -> axum::Router {
    assessment_router(service, sessions)
}

/// Option label scoring `score` for the question at `index`.
pub(super) fn label_for(catalog: &SurveyCatalog, index: usize, score: u32) -> String {
    catalog
        .question(index)
        .and_then(|question| question.options.iter().find(|option| option.score == score))
        .map(|option| option.label.clone())
        .expect("score present in catalog")
}

/// Answer every question with the matching score.
pub(super) fn answer_all(session: &mut AssessmentSession, scores: &[u32]) {
    let catalog = session.catalog().clone();
    for (index, score) in scores.iter().enumerate() {
        let label = label_for(&catalog, index, *score);
        session.select(&label).expect("selection accepted");
    }
}

pub(super) fn completed_session(scores: &[u32]) -> AssessmentSession {
    let mut session = AssessmentSession::new(
        crate::survey::domain::SessionId("assessment-test".to_string()),
        catalog(),
        IntakeMode::Required,
    );
    session
        .confirm_intake(identity())
        .expect("intake accepted");
    answer_all(&mut session, scores);
    session
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
