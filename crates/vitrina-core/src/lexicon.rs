//! Language-specific vocabulary used by the extraction heuristics.
//!
//! The observed showcases are Russian-language lending sites, but nothing in
//! the pipeline depends on that: every word list is injected through this
//! table so another locale is a data change, not a code change.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    /// Call-to-action phrases that mark a card's apply button or link.
    pub action_words: Vec<String>,
    /// Finance terms expected in offer card body text (amount/term/rate).
    pub fin_terms: Vec<String>,
    /// UI phrases that must never be mistaken for a brand name.
    pub stop_words: Vec<String>,
    /// CSS class tokens that suggest a card-like container.
    pub card_class_tokens: Vec<String>,
    /// Phrases stripped from page titles during redirect resolution.
    pub title_noise_words: Vec<String>,
    /// Prefixes of amount ranges ("up to", "from") that mark noise labels.
    pub amount_prefixes: Vec<String>,
}

impl Lexicon {
    /// The vocabulary for Russian-language lending showcases.
    #[must_use]
    pub fn russian() -> Self {
        let to_strings = |words: &[&str]| words.iter().map(|w| (*w).to_string()).collect();
        Self {
            action_words: to_strings(&[
                "займ",
                "деньги",
                "получить",
                "оформить",
                "взять",
                "заявку",
                "отправить",
                "кредит",
                "на карту",
                "выплата",
                "микрозайм",
                "заполнить",
                "выбрать",
                "узнать",
                "подробнее",
                "подать",
                "бесплатно",
            ]),
            fin_terms: to_strings(&["сумма", "срок", "ставка", "процент", "дней", "руб"]),
            stop_words: to_strings(&[
                "получить деньги",
                "оформить заявку",
                "взять займ",
                "подробнее",
                "подать заявку",
                "получить на карту",
                "выплата",
                "деньги на карту",
                "сумма",
                "срок",
                "ставка",
                "одобрение",
                "заявка",
            ]),
            card_class_tokens: to_strings(&["card", "offer", "item", "row", "tile"]),
            title_noise_words: to_strings(&[
                "занять",
                "займ",
                "кредит",
                "банк",
                "официальный",
                "сайт",
                "вход",
                "кабинет",
                "онлайн",
                "мфо",
                "мкк",
            ]),
            amount_prefixes: to_strings(&["до ", "от "]),
        }
    }

    /// True when the text reads like a call-to-action rather than a name.
    #[must_use]
    pub fn is_action_text(&self, text: &str) -> bool {
        let low = text.trim().to_lowercase();
        if low.is_empty() {
            return false;
        }
        self.action_words.iter().any(|w| low.contains(w.as_str()))
            // Short button labels built on approval/selection stems.
            || (low.len() > 2
                && low.chars().count() < 20
                && (low.contains("одобр") || low.contains("выбр")))
    }

    /// Counts how many distinct finance terms appear in the text.
    #[must_use]
    pub fn fin_term_hits(&self, lowercased_text: &str) -> usize {
        self.fin_terms
            .iter()
            .filter(|t| lowercased_text.contains(t.as_str()))
            .count()
    }

    /// True when any class token suggests an offer-card container.
    #[must_use]
    pub fn has_card_class(&self, lowercased_class: &str) -> bool {
        self.card_class_tokens
            .iter()
            .any(|t| lowercased_class.contains(t.as_str()))
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::russian()
    }
}
