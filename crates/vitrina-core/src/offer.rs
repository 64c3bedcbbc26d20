//! Offer records produced by the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::label::BrandLabel;

/// The page zone an offer appeared in. Positions are ranked independently
/// per channel: the main listing and each floating/banner zone get their own
/// 1-based sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Main,
    /// A banner/sticky zone, identified by its code ("b1", "b2", ...).
    Zone(String),
}

impl Placement {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Placement::Main => "main",
            Placement::Zone(code) => code,
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s == "main" {
            Placement::Main
        } else {
            Placement::Zone(s.to_string())
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted offer before positions are assigned. Ordering within the
/// producing list is the document encounter order and becomes the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedOffer {
    pub label: BrandLabel,
    /// Absolute destination URL. Cards without a destination are dropped
    /// before this type is constructed.
    pub link: String,
    pub image_url: Option<String>,
    pub placement: Placement,
}

/// Structured outcome of one showcase run. The orchestrator never panics
/// past its boundary; callers branch on this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Success { count: usize },
    Failure { error: String },
}

impl RunOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_round_trips_through_str() {
        assert_eq!(Placement::parse("main"), Placement::Main);
        assert_eq!(Placement::parse("b2"), Placement::Zone("b2".to_string()));
        assert_eq!(Placement::Zone("b1".to_string()).as_str(), "b1");
        assert_eq!(Placement::Main.as_str(), "main");
    }

    #[test]
    fn run_outcome_success_flag() {
        assert!(RunOutcome::Success { count: 0 }.is_success());
        assert!(!RunOutcome::Failure {
            error: "timeout".to_string()
        }
        .is_success());
    }
}
