//! Redirect resolution: follow an unresolved offer's destination link and
//! infer the brand from the landing page's identity signals.
//!
//! This is the most expensive step of a run; callers invoke it per
//! unresolved item, sequentially, and a failure here never aborts the run.

use vitrina_core::Lexicon;

use crate::render::{PageMeta, Renderer};

/// Delimiters that separate a brand name from the tagline in a page title.
const TITLE_DELIMITERS: &[char] = &['|', '-', '—'];

/// Follows `url` and derives a candidate brand label from the landing page.
///
/// Returns `None` when navigation fails or no candidate survives the noise
/// stripping. There is no retry; resolution failure degrades to an
/// unresolved offer rather than an error.
pub async fn resolve_brand_from_redirect<R: Renderer>(
    renderer: &R,
    url: &str,
    lexicon: &Lexicon,
) -> Option<String> {
    match renderer.page_meta(url).await {
        Ok(meta) => {
            let candidate = candidate_from_meta(&meta, lexicon);
            match &candidate {
                Some(name) => tracing::info!(url, name, "redirect resolved a brand candidate"),
                None => tracing::debug!(url, "redirect produced no usable candidate"),
            }
            candidate
        }
        Err(e) => {
            tracing::warn!(url, error = %e, "redirect navigation failed");
            None
        }
    }
}

/// Picks the first identity signal that still has substance after noise
/// stripping.
#[must_use]
pub fn candidate_from_meta(meta: &PageMeta, lexicon: &Lexicon) -> Option<String> {
    meta.candidates()
        .into_iter()
        .find_map(|text| clean_title_candidate(text, lexicon))
}

/// Cuts the candidate at the first delimiter and strips title noise words.
fn clean_title_candidate(text: &str, lexicon: &Lexicon) -> Option<String> {
    let first_segment = text.split(TITLE_DELIMITERS).next().unwrap_or(text);
    let mut cleaned = first_segment.to_string();
    for word in &lexicon.title_noise_words {
        cleaned = strip_word_case_insensitive(&cleaned, word);
    }
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    (cleaned.chars().count() > 2).then_some(cleaned)
}

/// Removes every case-insensitive occurrence of `word` from `text`.
///
/// Matching walks chars, not bytes: lowercasing can change byte length
/// ('İ' becomes a two-char sequence), so offsets into a lowercased copy
/// must never be used to slice the original.
fn strip_word_case_insensitive(text: &str, word: &str) -> String {
    let needle = word.to_lowercase();
    if needle.is_empty() {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if let Some(end) = match_at(&chars, i, &needle) {
            i = end;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// If the lowercase rendering of `chars[start..]` begins with exactly
/// `needle`, returns the char index one past the match.
fn match_at(chars: &[char], start: usize, needle: &str) -> Option<usize> {
    let mut lowered = String::new();
    let mut i = start;
    while lowered.len() < needle.len() {
        let c = *chars.get(i)?;
        lowered.extend(c.to_lowercase());
        i += 1;
    }
    (lowered == needle).then_some(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_suffix_after_delimiter_is_dropped() {
        let lex = Lexicon::russian();
        let meta = PageMeta {
            title: Some("JoyMoney — Займы онлайн".to_string()),
            h1: None,
            og_title: None,
        };
        assert_eq!(candidate_from_meta(&meta, &lex).as_deref(), Some("JoyMoney"));
    }

    #[test]
    fn noise_words_are_stripped_case_insensitively() {
        let lex = Lexicon::russian();
        let meta = PageMeta {
            title: Some("Webbankir Официальный Сайт".to_string()),
            h1: None,
            og_title: None,
        };
        assert_eq!(
            candidate_from_meta(&meta, &lex).as_deref(),
            Some("Webbankir")
        );
    }

    #[test]
    fn falls_through_to_h1_when_title_is_all_noise() {
        let lex = Lexicon::russian();
        let meta = PageMeta {
            title: Some("Вход в кабинет".to_string()),
            h1: Some("Webbankir".to_string()),
            og_title: None,
        };
        assert_eq!(
            candidate_from_meta(&meta, &lex).as_deref(),
            Some("Webbankir")
        );
    }

    #[test]
    fn titles_whose_lowercase_form_grows_in_bytes_are_handled() {
        // 'İ' (U+0130) lowercases to a two-char, three-byte sequence; byte
        // offsets from the lowercased copy would land mid-character here.
        let lex = Lexicon::russian();
        let meta = PageMeta {
            title: Some("İ Кредит Сервис".to_string()),
            h1: None,
            og_title: None,
        };
        assert_eq!(
            candidate_from_meta(&meta, &lex).as_deref(),
            Some("İ Сервис")
        );
    }

    #[test]
    fn no_usable_signal_yields_none() {
        let lex = Lexicon::russian();
        let meta = PageMeta {
            title: Some("Займ онлайн".to_string()),
            h1: None,
            og_title: None,
        };
        assert_eq!(candidate_from_meta(&meta, &lex), None);
        assert_eq!(candidate_from_meta(&PageMeta::default(), &lex), None);
    }
}
