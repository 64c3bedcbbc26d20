//! Repeating-class pattern detection: when neither a selector nor the
//! action-word walk applies, find the CSS class whose element population
//! looks like a column of offer cards.

use std::collections::HashMap;

use ego_tree::NodeId;
use scraper::ElementRef;

use crate::dom::{self, sel};
use crate::locator::{Card, PageContext};

#[derive(Debug, Clone, Copy)]
pub struct PatternConfig {
    /// Minimum elements sharing a class for it to be a candidate.
    pub min_count: usize,
    /// Maximum elements; beyond this the class is utility styling.
    pub max_count: usize,
    /// Elements sampled per candidate when checking the card signature.
    pub sample_size: usize,
    /// Share of the sample that must satisfy every signature criterion.
    pub signature_share: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_count: 5,
            max_count: 50,
            sample_size: 5,
            signature_share: 0.8,
        }
    }
}

/// Finds the first class bucket whose sampled elements carry the card
/// signature, and returns that class's full element set as the card list.
#[must_use]
pub fn detect_repeating_pattern<'a>(
    ctx: &PageContext<'a>,
    config: &PatternConfig,
) -> Vec<Card<'a>> {
    let mut buckets: HashMap<String, Vec<NodeId>> = HashMap::new();
    for node in ctx.doc.root_element().descendants() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        for class in el.value().classes() {
            // Short and underscore-prefixed classes are framework plumbing.
            if class.len() < 3 || class.starts_with('_') {
                continue;
            }
            buckets.entry(class.to_string()).or_default().push(el.id());
        }
    }

    let mut candidates: Vec<(String, Vec<NodeId>)> = buckets
        .into_iter()
        .filter(|(_, ids)| ids.len() >= config.min_count && ids.len() <= config.max_count)
        .collect();
    // Most populous first; class name breaks ties for determinism.
    candidates.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));

    tracing::debug!(candidates = candidates.len(), "pattern candidate classes");

    for (class, ids) in candidates {
        let elements: Vec<ElementRef<'a>> = ids
            .iter()
            .filter_map(|id| ctx.doc.tree.get(*id).and_then(ElementRef::wrap))
            .collect();
        if matches_card_signature(&elements, config) {
            tracing::debug!(class, count = elements.len(), "repeating card pattern found");
            return elements
                .into_iter()
                .map(|el| Card {
                    root: el,
                    trigger_href: None,
                })
                .collect();
        }
    }
    Vec::new()
}

/// Checks the card signature over a sample: image of non-trivial size, a
/// button-like element, an outbound absolute link, and non-trivial text.
fn matches_card_signature(elements: &[ElementRef<'_>], config: &PatternConfig) -> bool {
    let sample_size = config.sample_size.min(elements.len());
    if sample_size == 0 {
        return false;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let threshold = (sample_size as f64 * config.signature_share).ceil() as usize;

    let img_sel = sel("img");
    let button_sel = sel(r#"button, .btn, [class*="button"], [class*="btn"]"#);
    let link_sel = sel("a[href]");

    let mut has_img = 0_usize;
    let mut has_button = 0_usize;
    let mut has_link = 0_usize;
    let mut has_text = 0_usize;

    for el in &elements[..sample_size] {
        let img_ok = el.select(&img_sel).any(|img| {
            // No width attribute means size is unknown in a static DOM;
            // only an explicit tiny width disqualifies.
            img.value()
                .attr("width")
                .and_then(|w| w.parse::<u32>().ok())
                .is_none_or(|w| w > 30)
        });
        if img_ok {
            has_img += 1;
        }
        if el.select(&button_sel).next().is_some() {
            has_button += 1;
        }
        let link_ok = el.select(&link_sel).any(|a| {
            a.value()
                .attr("href")
                .is_some_and(|h| h.starts_with("http"))
        });
        if link_ok {
            has_link += 1;
        }
        if dom::element_text(*el).chars().count() > 20 {
            has_text += 1;
        }
    }

    has_img >= threshold && has_button >= threshold && has_link >= threshold && has_text >= threshold
}
