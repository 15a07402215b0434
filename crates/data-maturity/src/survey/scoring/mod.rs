mod tiers;

pub use tiers::{MaturityTier, TierBand, TierTable, CANONICAL_TIERS, TIER_TABLE_VERSION};

use serde::Serialize;

use super::domain::Answer;

/// Coaching signal for a single domain subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainFeedback {
    NeedsFoundations,
    OnTrack,
    Strong,
}

impl DomainFeedback {
    pub fn for_score(score: u32) -> Self {
        match score {
            0..=2 => Self::NeedsFoundations,
            3 => Self::OnTrack,
            _ => Self::Strong,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::NeedsFoundations => "Needs foundational work. Consider starting here.",
            Self::OnTrack => "On the right track. Refine your strategy and execution.",
            Self::Strong => "Looking strong!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainScore {
    pub domain: String,
    pub score: u32,
    pub feedback: DomainFeedback,
    pub message: &'static str,
}

/// Aggregates derived from a completed answer set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentResult {
    pub domain_scores: Vec<DomainScore>,
    pub total_score: u32,
    pub max_score: u32,
    pub tier: MaturityTier,
    pub tier_label: &'static str,
    pub recommendation: &'static str,
    pub tier_table_version: &'static str,
}

impl AssessmentResult {
    pub fn domain_score(&self, domain: &str) -> Option<u32> {
        self.domain_scores
            .iter()
            .find(|entry| entry.domain == domain)
            .map(|entry| entry.score)
    }

    pub fn score_line(&self) -> String {
        format!("Total Score: {} out of {}", self.total_score, self.max_score)
    }
}

/// Fold answers into domain subtotals, a total, and a tier. Domains keep the
/// order in which they were first answered.
pub fn score_answers(answers: &[Answer], max_score: u32, table: &TierTable) -> AssessmentResult {
    let mut subtotals: Vec<(String, u32)> = Vec::new();
    for answer in answers {
        match subtotals
            .iter_mut()
            .find(|(domain, _)| *domain == answer.domain)
        {
            Some((_, subtotal)) => *subtotal += answer.score,
            None => subtotals.push((answer.domain.clone(), answer.score)),
        }
    }

    let total_score = answers.iter().map(|answer| answer.score).sum();
    let tier = table.classify(total_score);

    let domain_scores = subtotals
        .into_iter()
        .map(|(domain, score)| {
            let feedback = DomainFeedback::for_score(score);
            DomainScore {
                domain,
                score,
                feedback,
                message: feedback.message(),
            }
        })
        .collect();

    AssessmentResult {
        domain_scores,
        total_score,
        max_score,
        tier,
        tier_label: tier.label(),
        recommendation: tier.recommendation(),
        tier_table_version: table.version(),
    }
}
