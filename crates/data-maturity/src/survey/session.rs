use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::catalog::{Question, SurveyCatalog};
use super::domain::{Answer, Identity, IntakeMode, Phase, SessionId};
use super::scoring::{score_answers, AssessmentResult, CANONICAL_TIERS};

/// Validation failures for session transitions. State is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssessmentError {
    #[error("'{label}' is not an option for question {position}")]
    InvalidSelection { position: usize, label: String },
    #[error("answers can only be recorded while the survey is in progress (currently {phase})")]
    NotInProgress { phase: Phase },
    #[error("please provide your {}", .missing.join(", "))]
    IncompleteIdentity { missing: Vec<&'static str> },
    #[error("{action} is not available while the survey is {phase}")]
    OutOfPhase { action: &'static str, phase: Phase },
}

/// Coarse grouping surfaced to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentErrorKind {
    InvalidSelection,
    IncompleteIdentity,
    OutOfPhase,
}

impl AssessmentError {
    pub fn kind(&self) -> AssessmentErrorKind {
        match self {
            Self::InvalidSelection { .. } | Self::NotInProgress { .. } => {
                AssessmentErrorKind::InvalidSelection
            }
            Self::IncompleteIdentity { .. } => AssessmentErrorKind::IncompleteIdentity,
            Self::OutOfPhase { .. } => AssessmentErrorKind::OutOfPhase,
        }
    }
}

/// One respondent's walk through the catalog.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    id: SessionId,
    catalog: Arc<SurveyCatalog>,
    intake_mode: IntakeMode,
    identity: Option<Identity>,
    answers: Vec<Answer>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl AssessmentSession {
    pub fn new(id: SessionId, catalog: Arc<SurveyCatalog>, intake_mode: IntakeMode) -> Self {
        Self {
            id,
            catalog,
            intake_mode,
            identity: None,
            answers: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn catalog(&self) -> &SurveyCatalog {
        &self.catalog
    }

    pub fn intake_mode(&self) -> IntakeMode {
        self.intake_mode
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Index of the next unanswered question; equals the answer count.
    pub fn cursor(&self) -> usize {
        self.answers.len()
    }

    pub fn phase(&self) -> Phase {
        if self.intake_mode == IntakeMode::Required && self.identity.is_none() {
            Phase::Intake
        } else if self.cursor() < self.catalog.len() {
            Phase::InProgress
        } else {
            Phase::Complete
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase() {
            Phase::InProgress => self.catalog.question(self.cursor()),
            Phase::Intake | Phase::Complete => None,
        }
    }

    pub fn progress_percent(&self) -> u8 {
        if self.catalog.is_empty() {
            return 100;
        }
        let pct = self.cursor() * 100 / self.catalog.len();
        pct.min(100) as u8
    }

    /// Record contact details and open the question flow.
    pub fn confirm_intake(&mut self, identity: Identity) -> Result<&Identity, AssessmentError> {
        let phase = self.phase();
        if phase != Phase::Intake {
            return Err(AssessmentError::OutOfPhase {
                action: "intake",
                phase,
            });
        }

        let identity = identity.trimmed();
        let missing = identity.missing_fields();
        if !missing.is_empty() {
            return Err(AssessmentError::IncompleteIdentity { missing });
        }

        Ok(self.identity.insert(identity))
    }

    /// Answer the current question with one of its option labels.
    pub fn select(&mut self, label: &str) -> Result<Phase, AssessmentError> {
        let phase = self.phase();
        if phase != Phase::InProgress {
            return Err(AssessmentError::NotInProgress { phase });
        }

        let cursor = self.cursor();
        let question = self
            .catalog
            .question(cursor)
            .ok_or(AssessmentError::NotInProgress { phase })?;
        let option = question
            .option(label)
            .ok_or_else(|| AssessmentError::InvalidSelection {
                position: cursor + 1,
                label: label.to_string(),
            })?;

        let answer = Answer {
            domain: question.domain.clone(),
            prompt: question.prompt.clone(),
            chosen_label: option.label.clone(),
            score: option.score,
        };
        self.answers.push(answer);

        let next = self.phase();
        if next == Phase::Complete {
            self.completed_at = Some(Utc::now());
        }
        Ok(next)
    }

    /// Scores for a finished survey, recomputed from the answers on every call.
    pub fn result(&self) -> Option<AssessmentResult> {
        match self.phase() {
            Phase::Complete => Some(score_answers(
                &self.answers,
                self.catalog.max_total(),
                &CANONICAL_TIERS,
            )),
            Phase::Intake | Phase::InProgress => None,
        }
    }

    /// Contact details for a follow-up request. Intake details win; details
    /// supplied with the request are only used when the session skipped intake.
    pub fn follow_up_contact(
        &self,
        supplied: Option<&Identity>,
    ) -> Result<Identity, AssessmentError> {
        let phase = self.phase();
        if phase != Phase::Complete {
            return Err(AssessmentError::OutOfPhase {
                action: "follow-up",
                phase,
            });
        }

        let contact = self
            .identity
            .as_ref()
            .or(supplied)
            .map(Identity::trimmed)
            .unwrap_or_default();
        let missing = contact.missing_fields();
        if !missing.is_empty() {
            return Err(AssessmentError::IncompleteIdentity { missing });
        }
        Ok(contact)
    }

    pub fn view(&self) -> SessionView {
        let total_questions = self.catalog.len();
        let current_question = self.current_question().map(|question| QuestionView {
            position: self.cursor() + 1,
            of: total_questions,
            domain: question.domain.clone(),
            prompt: question.prompt.clone(),
            options: question.labels().map(str::to_string).collect(),
        });

        SessionView {
            id: self.id.clone(),
            phase: self.phase(),
            intake_mode: self.intake_mode,
            progress_percent: self.progress_percent(),
            answered: self.cursor(),
            total_questions,
            contact_name: self.identity.as_ref().map(|identity| identity.name.clone()),
            current_question,
            answers: self.answers.clone(),
            result: self.result(),
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

/// Snapshot handed to the presentation layer after every transition.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub phase: Phase,
    pub intake_mode: IntakeMode,
    pub progress_percent: u8,
    pub answered: usize,
    pub total_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<QuestionView>,
    pub answers: Vec<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AssessmentResult>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub position: usize,
    pub of: usize,
    pub domain: String,
    pub prompt: String,
    pub options: Vec<String>,
}
