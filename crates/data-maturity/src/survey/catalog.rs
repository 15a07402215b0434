use std::collections::HashSet;

use serde::Serialize;

/// A selectable answer and the points it contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub label: String,
    pub score: u32,
}

impl AnswerOption {
    fn new(label: &str, score: u32) -> Self {
        Self {
            label: label.to_string(),
            score,
        }
    }
}

/// One survey question, scoped to a single capability domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub domain: String,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn new(domain: &str, prompt: &str, options: &[(&str, u32)]) -> Self {
        Self {
            domain: domain.to_string(),
            prompt: prompt.to_string(),
            options: options
                .iter()
                .map(|(label, score)| AnswerOption::new(label, *score))
                .collect(),
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|option| option.label.as_str())
    }

    pub fn option(&self, label: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.label == label)
    }

    pub fn score_for(&self, label: &str) -> Option<u32> {
        self.option(label).map(|option| option.score)
    }

    fn min_score(&self) -> u32 {
        self.options.first().map_or(0, |option| option.score)
    }

    fn max_score(&self) -> u32 {
        self.options.last().map_or(0, |option| option.score)
    }
}

/// Construction-time defects in a question set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog must contain at least one question")]
    Empty,
    #[error("question {position} has no options")]
    NoOptions { position: usize },
    #[error("question {position} repeats the option '{label}'")]
    DuplicateLabel { position: usize, label: String },
    #[error("question {position} option '{label}' must score above zero")]
    NonPositiveScore { position: usize, label: String },
    #[error("question {position} options must be ordered from lowest to highest score")]
    UnorderedScores { position: usize },
}

/// Fixed, ordered question set driving every assessment.
#[derive(Debug, Clone)]
pub struct SurveyCatalog {
    questions: Vec<Question>,
}

impl SurveyCatalog {
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        validate(&questions)?;
        Ok(Self { questions })
    }

    /// The seven-domain data maturity questionnaire.
    pub fn standard() -> Self {
        Self {
            questions: standard_questions(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Distinct domains in catalog order.
    pub fn domains(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .map(|question| question.domain.as_str())
            .filter(|domain| seen.insert(*domain))
            .collect()
    }

    pub fn min_total(&self) -> u32 {
        self.questions.iter().map(Question::min_score).sum()
    }

    pub fn max_total(&self) -> u32 {
        self.questions.iter().map(Question::max_score).sum()
    }
}

fn validate(questions: &[Question]) -> Result<(), CatalogError> {
    if questions.is_empty() {
        return Err(CatalogError::Empty);
    }

    for (index, question) in questions.iter().enumerate() {
        let position = index + 1;
        if question.options.is_empty() {
            return Err(CatalogError::NoOptions { position });
        }

        let mut labels = HashSet::new();
        let mut previous: Option<u32> = None;
        for option in &question.options {
            if !labels.insert(option.label.as_str()) {
                return Err(CatalogError::DuplicateLabel {
                    position,
                    label: option.label.clone(),
                });
            }
            if option.score == 0 {
                return Err(CatalogError::NonPositiveScore {
                    position,
                    label: option.label.clone(),
                });
            }
            if previous.is_some_and(|score| option.score < score) {
                return Err(CatalogError::UnorderedScores { position });
            }
            previous = Some(option.score);
        }
    }

    Ok(())
}

fn standard_questions() -> Vec<Question> {
    vec![
        Question::new(
            "Strategy & Leadership",
            "Does your organization have a documented, reviewed data strategy?",
            &[
                ("No strategy at all", 1),
                ("Informal ideas but nothing documented", 2),
                ("A documented strategy exists but isn't well used", 3),
                ("We have a clear, reviewed data strategy aligned to business goals", 4),
            ],
        ),
        Question::new(
            "People & Skills",
            "How would you rate your team's data literacy and confidence?",
            &[
                ("Most people are uncomfortable with data", 1),
                ("Some people are learning, but skills are patchy", 2),
                ("Teams can interpret dashboards, but not build them", 3),
                ("Teams are confident using data tools and making decisions", 4),
            ],
        ),
        Question::new(
            "Tools & Infrastructure",
            "What best describes your data infrastructure?",
            &[
                ("Data is stored in spreadsheets and scattered systems", 1),
                ("We have some cloud tools but no integration", 2),
                ("We use a centralized data platform (e.g., data warehouse)", 3),
                ("Our tools are integrated, scalable, and automated", 4),
            ],
        ),
        Question::new(
            "Governance & Compliance",
            "How do you manage data access, quality, and compliance?",
            &[
                ("No formal policies", 1),
                ("Some access rules, but not enforced", 2),
                ("Defined ownership and some monitoring", 3),
                ("Strong governance with audits, monitoring, and training", 4),
            ],
        ),
        Question::new(
            "Culture & Adoption",
            "How ingrained is data-driven thinking in your organization?",
            &[
                ("Gut feel drives most decisions", 1),
                ("Some teams use data occasionally", 2),
                ("Data informs key decisions across functions", 3),
                ("Data is the foundation for strategy and daily ops", 4),
            ],
        ),
        Question::new(
            "Measurement & Performance",
            "How do you measure and communicate business performance?",
            &[
                ("Little or no tracking", 1),
                ("Basic dashboards/reports", 2),
                ("Regular reporting but not action-oriented", 3),
                ("Clear KPIs tracked in real time and discussed weekly", 4),
            ],
        ),
        Question::new(
            "Innovation Readiness",
            "Are you leveraging AI, automation, or predictive analytics?",
            &[
                ("Not at all", 1),
                ("It's on our radar", 2),
                ("We're running experiments", 3),
                ("We actively use smart tools for decision support", 4),
            ],
        ),
    ]
}
