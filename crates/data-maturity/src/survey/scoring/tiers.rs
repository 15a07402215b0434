use std::fmt;

use serde::Serialize;

/// Discrete maturity classification derived from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityTier {
    EarlyStage,
    Foundational,
    EmergingLeader,
    DataDrivenPro,
}

impl MaturityTier {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::EarlyStage,
            Self::Foundational,
            Self::EmergingLeader,
            Self::DataDrivenPro,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EarlyStage => "Early Stage",
            Self::Foundational => "Foundational",
            Self::EmergingLeader => "Emerging Leader",
            Self::DataDrivenPro => "Data-Driven Pro",
        }
    }

    pub const fn recommendation(self) -> &'static str {
        match self {
            Self::EarlyStage => {
                "Start with the basics: agree a short data strategy, name owners for your key data, and move scattered spreadsheets into a single trusted source."
            }
            Self::Foundational => {
                "The building blocks are in place. Formalize governance, invest in data literacy, and connect your tools so reporting stops depending on manual effort."
            }
            Self::EmergingLeader => {
                "Data already shapes decisions. Automate your pipelines, track KPIs in real time, and pilot predictive use cases with clear business owners."
            }
            Self::DataDrivenPro => {
                "You operate as a data-driven organization. Push into advanced analytics and AI while keeping governance and skills ahead of growth."
            }
        }
    }
}

impl fmt::Display for MaturityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive upper bound for one tier; totals above the last bound fall into `top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierBand {
    pub max_total: u32,
    pub tier: MaturityTier,
}

/// Ascending, non-overlapping threshold table over total scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierTable {
    version: &'static str,
    bands: &'static [TierBand],
    top: MaturityTier,
}

pub const TIER_TABLE_VERSION: &str = "2025.1";

/// Thresholds used for every classification.
pub const CANONICAL_TIERS: TierTable = TierTable {
    version: TIER_TABLE_VERSION,
    bands: &[
        TierBand {
            max_total: 8,
            tier: MaturityTier::EarlyStage,
        },
        TierBand {
            max_total: 13,
            tier: MaturityTier::Foundational,
        },
        TierBand {
            max_total: 17,
            tier: MaturityTier::EmergingLeader,
        },
    ],
    top: MaturityTier::DataDrivenPro,
};

impl TierTable {
    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn bands(&self) -> &'static [TierBand] {
        self.bands
    }

    /// First band whose bound is not exceeded; boundary totals stay in the lower band.
    pub fn classify(&self, total: u32) -> MaturityTier {
        self.bands
            .iter()
            .find(|band| total <= band.max_total)
            .map_or(self.top, |band| band.tier)
    }

    /// Inclusive `(low, high)` totals mapped to `tier` within `[min_total, max_total]`.
    pub fn range_for(
        &self,
        tier: MaturityTier,
        min_total: u32,
        max_total: u32,
    ) -> Option<(u32, u32)> {
        let mut totals = (min_total..=max_total).filter(|total| self.classify(*total) == tier);
        let low = totals.next()?;
        let high = totals.last().unwrap_or(low);
        Some((low, high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_resolve_to_lower_band() {
        assert_eq!(CANONICAL_TIERS.classify(8), MaturityTier::EarlyStage);
        assert_eq!(CANONICAL_TIERS.classify(9), MaturityTier::Foundational);
        assert_eq!(CANONICAL_TIERS.classify(13), MaturityTier::Foundational);
        assert_eq!(CANONICAL_TIERS.classify(14), MaturityTier::EmergingLeader);
        assert_eq!(CANONICAL_TIERS.classify(17), MaturityTier::EmergingLeader);
        assert_eq!(CANONICAL_TIERS.classify(18), MaturityTier::DataDrivenPro);
    }

    #[test]
    fn bands_ascend_without_overlap() {
        let bounds: Vec<u32> = CANONICAL_TIERS
            .bands()
            .iter()
            .map(|band| band.max_total)
            .collect();
        assert!(bounds.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn every_tier_covers_a_contiguous_range_of_the_seven_question_scale() {
        let ranges: Vec<(u32, u32)> = MaturityTier::ordered()
            .into_iter()
            .map(|tier| CANONICAL_TIERS.range_for(tier, 7, 28).expect("tier reachable"))
            .collect();
        assert_eq!(ranges, vec![(7, 8), (9, 13), (14, 17), (18, 28)]);
    }

    #[test]
    fn recommendations_are_distinct_per_tier() {
        let texts: std::collections::HashSet<&str> = MaturityTier::ordered()
            .into_iter()
            .map(MaturityTier::recommendation)
            .collect();
        assert_eq!(texts.len(), 4);
    }
}
