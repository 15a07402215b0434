//! Data maturity assessment: the fixed question catalog, the per-respondent
//! session state machine, scoring, and the lead capture collaborators.

pub mod catalog;
pub mod csv_store;
pub mod domain;
pub mod leads;
pub mod notify;
pub mod registry;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;
pub mod sheets;

#[cfg(test)]
mod tests;

pub use catalog::{AnswerOption, CatalogError, Question, SurveyCatalog};
pub use csv_store::CsvLeadStore;
pub use domain::{Answer, Identity, IntakeMode, Phase, SessionId};
pub use leads::{LeadCell, LeadRow, LeadRowKind, LeadStore, StoreError};
pub use notify::{
    DisabledNotifier, HttpNotifier, HttpNotifierSettings, NotificationMessage, Notifier,
    NotifyError,
};
pub use registry::{SessionRegistry, DEFAULT_SESSION_TTL};
pub use router::{assessment_router, AssessmentApi, AssessmentResponse};
pub use scoring::{
    AssessmentResult, DomainFeedback, DomainScore, MaturityTier, TierTable, CANONICAL_TIERS,
    TIER_TABLE_VERSION,
};
pub use service::{
    AssessmentService, Collaborator, CollaboratorWarning, FollowUpReceipt, IntakeOutcome,
};
pub use session::{
    AssessmentError, AssessmentErrorKind, AssessmentSession, QuestionView, SessionView,
};
pub use sheets::{GoogleSheetsLeadStore, SheetsConnector};
