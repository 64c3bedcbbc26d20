//! The three-state identity of an extracted offer's brand.
//!
//! Historically the pipeline overloaded a single string field with three
//! meanings ("Займер", "Offer", "Unknown"). The tagged variant makes the
//! allowed transitions explicit: only `Pending` labels may be promoted to
//! `Resolved` or demoted to `Unresolved`; a `Resolved` label is final.

use serde::{Deserialize, Serialize};

/// Display sentinel for a located card whose brand is not yet known.
pub const PENDING_SENTINEL: &str = "Offer";

/// Display sentinel for a label actively determined to be unrecognizable.
pub const UNRESOLVED_SENTINEL: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "name", rename_all = "snake_case")]
pub enum BrandLabel {
    /// A canonical brand from the registry. Final; never downgraded.
    Resolved(String),
    /// A card was located but its brand is not canonical yet. Carries the
    /// best-effort cleaned label (may be empty) for later resolution.
    Pending(String),
    /// All resolution tactics were exhausted; triaged manually later.
    Unresolved,
}

impl BrandLabel {
    /// Best-effort label for a card with no usable name signal at all.
    #[must_use]
    pub fn pending_empty() -> Self {
        BrandLabel::Pending(String::new())
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, BrandLabel::Resolved(_))
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, BrandLabel::Pending(_))
    }

    /// The name written to storage and shown to operators.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            BrandLabel::Resolved(name) => name,
            BrandLabel::Pending(raw) if raw.is_empty() => PENDING_SENTINEL,
            BrandLabel::Pending(raw) => raw,
            BrandLabel::Unresolved => UNRESOLVED_SENTINEL,
        }
    }
}

impl std::fmt::Display for BrandLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
