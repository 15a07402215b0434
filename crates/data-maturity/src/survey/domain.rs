use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for live assessment sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether respondents must share contact details before the questions start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeMode {
    #[default]
    Required,
    Skipped,
}

/// Derived lifecycle stage of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Intake,
    InProgress,
    Complete,
}

impl Phase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Intake => "intake",
            Self::InProgress => "in progress",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Respondent contact details captured at intake or with a follow-up request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub turnover: String,
}

impl Identity {
    pub fn new(name: &str, email: &str, industry: &str, turnover: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            industry: industry.to_string(),
            turnover: turnover.to_string(),
        }
    }

    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            industry: self.industry.trim().to_string(),
            turnover: self.turnover.trim().to_string(),
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("industry", &self.industry),
            ("turnover", &self.turnover),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// A confirmed selection for one catalog question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub domain: String,
    pub prompt: String,
    pub chosen_label: String,
    pub score: u32,
}
