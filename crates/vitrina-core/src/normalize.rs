//! Canonical name resolution for raw extracted labels.
//!
//! Matching is deliberately substring-based: source pages decorate brand
//! names with taglines, amounts, and legal suffixes, so exact matching would
//! miss most of them. The precision cost is paid back downstream by the
//! second-stage refinement, which only accepts exact alias matches.

use crate::label::BrandLabel;
use crate::registry::BrandRegistry;

/// Quote characters stripped before alias matching.
const QUOTE_CHARS: &[char] = &['\'', '"', '«', '»'];

/// Legal-entity tokens that carry no brand identity.
const LEGAL_TOKENS: &[&str] = &["мфо", "мкк", "ооо", "зао", "пао", "мфк"];

/// Delimiters that end the usable part of a fallback label.
pub const LABEL_DELIMITERS: &[char] = &['.', ',', '!', '?', ';', '|'];

/// Maximum length (in chars) of a best-effort fallback label.
const FALLBACK_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    registry: &'a BrandRegistry,
}

impl<'a> Normalizer<'a> {
    #[must_use]
    pub fn new(registry: &'a BrandRegistry) -> Self {
        Self { registry }
    }

    /// Resolve a raw label (and optionally its destination URL) to a brand.
    ///
    /// Tactic order: cleaned-label alias scan, then URL alias scan, then a
    /// best-effort truncated fallback. The fallback is `Pending`, not
    /// `Resolved` — callers must not assume it is canonical.
    #[must_use]
    pub fn normalize(&self, raw_label: &str, url: Option<&str>) -> BrandLabel {
        if raw_label.trim().is_empty() {
            return BrandLabel::Unresolved;
        }

        let cleaned = clean_label(raw_label);
        if let Some(brand) = self.registry.match_text(&cleaned) {
            return BrandLabel::Resolved(brand.to_string());
        }

        if let Some(url) = url {
            if let Some(brand) = self.registry.match_text(&url.to_lowercase()) {
                return BrandLabel::Resolved(brand.to_string());
            }
        }

        BrandLabel::Pending(truncate_fallback(raw_label))
    }

    #[must_use]
    pub fn registry(&self) -> &'a BrandRegistry {
        self.registry
    }
}

/// Lowercase and strip quotes and legal-entity tokens from a raw label.
#[must_use]
pub fn clean_label(raw: &str) -> String {
    let mut low: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| !QUOTE_CHARS.contains(c))
        .collect();
    for token in LEGAL_TOKENS {
        low = low.replace(token, "");
    }
    low.trim().to_string()
}

/// Best-effort cleanup of an unmatched label: cut at the first delimiter,
/// trim, cap the length.
#[must_use]
pub fn truncate_fallback(raw: &str) -> String {
    let first_segment = raw
        .split(LABEL_DELIMITERS)
        .next()
        .unwrap_or(raw)
        .trim();
    first_segment.chars().take(FALLBACK_MAX_CHARS).collect()
}
