//! The trash-name classifier: rejects label candidates that are amounts,
//! UI chrome, or technical tokens rather than brand names.

use std::sync::LazyLock;

use regex::Regex;
use vitrina_core::{BrandRegistry, Lexicon};

/// Pure numeric/currency/percent strings ("1000 руб", "30 дней", "5%").
static NUMERIC_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s%рубдней.]+$").expect("valid regex"));

/// File-derived hash fragments ("n 56cd8a16afda9").
static LEADING_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]\s[a-f0-9]{10,}").expect("valid regex"));

/// Alphanumeric run that marks a technical token next to "logo".
static TECH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]{5,}").expect("valid regex"));

/// Digit run of 3+ inside a long Latin-only string.
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]{3,}").expect("valid regex"));

/// Classifies a label candidate as noise.
///
/// A candidate that is itself a known alias is never noise, whatever its
/// shape — brand slugs can legitimately look like technical tokens.
#[must_use]
pub fn is_trash_name(text: &str, lexicon: &Lexicon, registry: &BrandRegistry) -> bool {
    let low = text.trim().to_lowercase();
    if low.is_empty() || low.chars().count() < 2 {
        return true;
    }

    if registry.exact_alias(&low).is_some() {
        return false;
    }

    let char_count = low.chars().count();

    // UI stop phrases: exact, or contained inside a short label.
    if lexicon
        .stop_words
        .iter()
        .any(|s| low == *s || (low.contains(s.as_str()) && char_count < 20))
    {
        return true;
    }

    if NUMERIC_ONLY.is_match(&low) {
        return true;
    }

    // Amount ranges ("до 5000", "от 3%").
    if lexicon
        .amount_prefixes
        .iter()
        .any(|p| low.starts_with(p.as_str()))
    {
        return true;
    }

    if LEADING_HASH.is_match(&low) {
        return true;
    }

    // Short hashed asset stems ("8f3a", "d41d8cd9"): hex-only with at least
    // one digit. Pure hex-letter words ("cafe") stay eligible as labels.
    if low.chars().all(|c| c.is_ascii_hexdigit()) && low.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }

    if low.contains("logo") && TECH_TOKEN.is_match(&low) {
        return true;
    }

    // Long Latin-only strings with digit runs and no Cyrillic: asset names,
    // cache-busted file stems.
    let has_cyrillic = low.chars().any(|c| ('а'..='я').contains(&c) || c == 'ё');
    if char_count > 15 && !has_cyrillic && DIGIT_RUN.is_match(&low) {
        return true;
    }

    false
}
