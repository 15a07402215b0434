use async_trait::async_trait;
use serde::Serialize;

use super::domain::{Answer, Identity};
use super::scoring::AssessmentResult;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LeadCell {
    Text(String),
    Number(u32),
}

impl LeadCell {
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => value.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(value) => serde_json::Value::String(value.clone()),
            Self::Number(value) => serde_json::Value::from(*value),
        }
    }
}

/// Whether a row captures an early lead or a finished assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadRowKind {
    Intake,
    Completion,
}

/// Ordered cells appended to the lead log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadRow {
    pub kind: LeadRowKind,
    pub cells: Vec<LeadCell>,
}

fn identity_cells(identity: &Identity) -> Vec<LeadCell> {
    vec![
        LeadCell::Text(identity.name.clone()),
        LeadCell::Text(identity.email.clone()),
        LeadCell::Text(identity.industry.clone()),
        LeadCell::Text(identity.turnover.clone()),
    ]
}

impl LeadRow {
    /// `[name, email, industry, turnover, "", ""]`; score and tier stay blank.
    pub fn intake(identity: &Identity) -> Self {
        let mut cells = identity_cells(identity);
        cells.push(LeadCell::Text(String::new()));
        cells.push(LeadCell::Text(String::new()));
        Self {
            kind: LeadRowKind::Intake,
            cells,
        }
    }

    /// Identity, total, tier, then every prompt/label pair in catalog order.
    pub fn completion(identity: &Identity, result: &AssessmentResult, answers: &[Answer]) -> Self {
        let mut cells = identity_cells(identity);
        cells.push(LeadCell::Number(result.total_score));
        cells.push(LeadCell::Text(result.tier_label.to_string()));
        for answer in answers {
            cells.push(LeadCell::Text(answer.prompt.clone()));
            cells.push(LeadCell::Text(answer.chosen_label.clone()));
        }
        Self {
            kind: LeadRowKind::Completion,
            cells,
        }
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.cells.iter().map(LeadCell::to_text).collect()
    }

    pub fn to_json_values(&self) -> Vec<serde_json::Value> {
        self.cells.iter().map(LeadCell::to_json).collect()
    }
}

/// Append-only destination for captured leads (spreadsheet, CSV log, ...).
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn append_row(&self, row: LeadRow) -> Result<(), StoreError>;
}

/// Error enumeration for lead store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("lead store unavailable: {0}")]
    Unavailable(String),
    #[error("lead store credentials rejected: {0}")]
    Credentials(String),
    #[error("lead store request failed: {0}")]
    Backend(String),
    #[error("lead store task failed: {0}")]
    Join(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
