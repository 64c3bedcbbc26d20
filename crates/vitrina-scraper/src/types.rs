//! Shared pipeline types: raw extraction output, strategy presets, and
//! method provenance.

use serde::{Deserialize, Serialize};

/// A card's extraction output before name normalization: the best raw label
/// candidate (empty when no signal survived the noise filter), the absolute
/// destination link, and an optional logo image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOffer {
    /// Raw label candidate. Empty string means "card located, no name".
    pub label: String,
    /// Canonical brand resolved directly by a tactic (technical attributes,
    /// deep alias scan). Takes precedence over `label` downstream.
    pub canonical: Option<String>,
    pub link: String,
    pub image_url: Option<String>,
}

/// Locator preset selected per showcase. Collapses the historical parser
/// version tags into explicit, named configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocatorStrategy {
    /// Custom selector when configured, then the heuristic ancestor walk.
    Auto,
    /// Custom selector only; no heuristics.
    SelectorOnly,
    /// Custom selector when configured, then repeating-class detection.
    PatternCluster,
}

impl LocatorStrategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LocatorStrategy::Auto => "auto",
            LocatorStrategy::SelectorOnly => "selector-only",
            LocatorStrategy::PatternCluster => "pattern-cluster",
        }
    }

    /// Parses a stored strategy tag, defaulting unknown tags to `Auto`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "selector-only" => LocatorStrategy::SelectorOnly,
            "pattern-cluster" => LocatorStrategy::PatternCluster,
            _ => LocatorStrategy::Auto,
        }
    }
}

/// Which tactic actually produced the run's offers. Recorded on the run for
/// diagnostics; the dashboard shows it next to each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    CustomSelector,
    HeuristicWalk,
    PatternCluster,
    EmbeddedJson,
    SimpleDom,
}

impl ExtractionMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMethod::CustomSelector => "DOM (Custom Selector)",
            ExtractionMethod::HeuristicWalk => "DOM (Cluster Match)",
            ExtractionMethod::PatternCluster => "DOM (Pattern Cluster)",
            ExtractionMethod::EmbeddedJson => "JSON",
            ExtractionMethod::SimpleDom => "DOM (Simple Fallback)",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-showcase pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Operator-supplied selector override. May be a plain CSS selector or a
    /// pasted HTML snippet of one card (reduced to tag + classes).
    pub custom_selector: Option<String>,
    pub strategy: Option<LocatorStrategy>,
}

impl PipelineConfig {
    #[must_use]
    pub fn strategy(&self) -> LocatorStrategy {
        self.strategy.unwrap_or(LocatorStrategy::Auto)
    }
}
