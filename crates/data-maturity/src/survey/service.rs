use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::catalog::SurveyCatalog;
use super::domain::{Identity, IntakeMode, Phase, SessionId};
use super::leads::{LeadRow, LeadStore};
use super::notify::{NotificationMessage, Notifier, NotifyError};
use super::scoring::MaturityTier;
use super::session::{AssessmentError, AssessmentSession};

/// External system that failed while the session itself moved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collaborator {
    Storage,
    Notification,
}

/// User-visible warning for a collaborator failure. Never rolls back session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollaboratorWarning {
    pub collaborator: Collaborator,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntakeOutcome {
    pub phase: Phase,
    pub stored: bool,
    pub warnings: Vec<CollaboratorWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowUpReceipt {
    pub total_score: u32,
    pub tier: MaturityTier,
    pub stored: bool,
    pub notified: bool,
    pub warnings: Vec<CollaboratorWarning>,
}

/// Service composing the catalog, lead store, and notifier around sessions.
pub struct AssessmentService<S, N> {
    catalog: Arc<SurveyCatalog>,
    store: Arc<S>,
    notifier: Arc<N>,
    intake_mode: IntakeMode,
}

/// Random v4 ids; a session id is the only credential a respondent holds.
fn next_session_id() -> SessionId {
    SessionId(format!("assessment-{}", Uuid::new_v4().simple()))
}

impl<S, N> AssessmentService<S, N>
where
    S: LeadStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        catalog: Arc<SurveyCatalog>,
        store: Arc<S>,
        notifier: Arc<N>,
        intake_mode: IntakeMode,
    ) -> Self {
        Self {
            catalog,
            store,
            notifier,
            intake_mode,
        }
    }

    pub fn catalog(&self) -> &SurveyCatalog {
        &self.catalog
    }

    pub fn intake_mode(&self) -> IntakeMode {
        self.intake_mode
    }

    /// Open a fresh session, optionally overriding the configured intake mode.
    pub fn start(&self, intake_mode: Option<IntakeMode>) -> AssessmentSession {
        let session = AssessmentSession::new(
            next_session_id(),
            self.catalog.clone(),
            intake_mode.unwrap_or(self.intake_mode),
        );
        info!(session = %session.id(), mode = ?session.intake_mode(), "assessment started");
        session
    }

    /// Confirm intake and log the partial lead. Storage failures become warnings.
    pub async fn confirm_intake(
        &self,
        session: &mut AssessmentSession,
        identity: Identity,
    ) -> Result<IntakeOutcome, AssessmentError> {
        let row = LeadRow::intake(session.confirm_intake(identity)?);
        info!(session = %session.id(), "intake confirmed");

        let mut warnings = Vec::new();
        let stored = match self.store.append_row(row).await {
            Ok(()) => true,
            Err(err) => {
                warn!(session = %session.id(), error = %err, "failed to store intake lead");
                warnings.push(CollaboratorWarning {
                    collaborator: Collaborator::Storage,
                    message: format!("We could not save your details: {err}"),
                });
                false
            }
        };

        Ok(IntakeOutcome {
            phase: session.phase(),
            stored,
            warnings,
        })
    }

    /// Answer the current question.
    pub fn advance(
        &self,
        session: &mut AssessmentSession,
        label: &str,
    ) -> Result<Phase, AssessmentError> {
        let phase = session.select(label)?;
        if phase == Phase::Complete {
            if let Some(result) = session.result() {
                info!(
                    session = %session.id(),
                    total = result.total_score,
                    tier = result.tier_label,
                    "assessment complete"
                );
            }
        }
        Ok(phase)
    }

    /// Persist the full record and notify the follow-up team. Not idempotent:
    /// every call appends a row and sends a message.
    pub async fn request_follow_up(
        &self,
        session: &AssessmentSession,
        contact: Option<Identity>,
    ) -> Result<FollowUpReceipt, AssessmentError> {
        let contact = session.follow_up_contact(contact.as_ref())?;
        let phase = session.phase();
        let result = session.result().ok_or(AssessmentError::OutOfPhase {
            action: "follow-up",
            phase,
        })?;

        let mut warnings = Vec::new();

        let row = LeadRow::completion(&contact, &result, session.answers());
        let stored = match self.store.append_row(row).await {
            Ok(()) => true,
            Err(err) => {
                warn!(session = %session.id(), error = %err, "failed to store completed assessment");
                warnings.push(CollaboratorWarning {
                    collaborator: Collaborator::Storage,
                    message: format!("Failed to save your results: {err}"),
                });
                false
            }
        };

        let message = NotificationMessage::follow_up(&contact, &result);
        let notified = match self.notifier.send(message).await {
            Ok(()) => true,
            Err(NotifyError::Disabled) => {
                info!(session = %session.id(), "notifications disabled; follow-up stored only");
                false
            }
            Err(err) => {
                warn!(session = %session.id(), error = %err, "failed to send follow-up notification");
                warnings.push(CollaboratorWarning {
                    collaborator: Collaborator::Notification,
                    message: format!("We could not notify our team: {err}"),
                });
                false
            }
        };

        info!(
            session = %session.id(),
            stored,
            notified,
            tier = result.tier_label,
            "follow-up requested"
        );

        Ok(FollowUpReceipt {
            total_score: result.total_score,
            tier: result.tier,
            stored,
            notified,
            warnings,
        })
    }
}
