//! The heuristic ancestor walk: from every call-to-action element, climb
//! the ancestor chain scoring each container on card-likeness, and accept
//! the first ancestor that clears the threshold.

use std::collections::HashSet;

use ego_tree::NodeId;
use scraper::ElementRef;

use crate::dom::{self, sel};
use crate::locator::{action_selector, Card, PageContext};

/// Maximum ancestor depth climbed from an action element.
const MAX_ANCESTOR_DEPTH: usize = 12;

/// Minimum weighted score for an ancestor to be accepted as a card.
const SCORE_THRESHOLD: i32 = 2;

/// A container owning more than this share of the page's text is a layout
/// wrapper, not a card. Static-DOM stand-in for the "almost the whole
/// viewport" height guard.
const MAX_TEXT_SHARE: f64 = 0.8;

/// Containers with more descendants than this are page sections, not cards.
const MAX_DESCENDANTS: usize = 300;

/// Finds offer cards by walking up from call-to-action elements.
///
/// Cards are returned in document order of their discovering action
/// element; multiple actions inside one container yield one card.
#[must_use]
pub fn walk_from_actions<'a>(ctx: &PageContext<'a>) -> Vec<Card<'a>> {
    let action_sel = action_selector();
    let page_text_len = dom::element_text(ctx.doc.root_element()).chars().count();

    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut cards = Vec::new();

    for action in ctx.doc.select(&action_sel) {
        let text = dom::element_text(action);
        let char_count = text.chars().count();
        if char_count <= 2 || char_count >= 30 || !ctx.lexicon.is_action_text(&text) {
            continue;
        }

        let Some(card_el) = find_card_ancestor(ctx, action, page_text_len) else {
            continue;
        };

        if seen.insert(card_el.id()) {
            let trigger_href = action
                .value()
                .attr("href")
                .and_then(|h| dom::resolve_href(&ctx.base, h));
            cards.push(Card {
                root: card_el,
                trigger_href,
            });
        }
    }

    tracing::debug!(count = cards.len(), "heuristic walk located cards");
    cards
}

/// Climbs from `action` looking for the first ancestor that scores as a
/// card and passes the size guards.
fn find_card_ancestor<'a>(
    ctx: &PageContext<'a>,
    action: ElementRef<'a>,
    page_text_len: usize,
) -> Option<ElementRef<'a>> {
    for node in action.ancestors().take(MAX_ANCESTOR_DEPTH) {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        let tag = el.value().name();
        if tag == "body" || tag == "html" {
            break;
        }

        let score = score_container(ctx, el);
        if score >= SCORE_THRESHOLD && passes_size_guards(el, page_text_len) {
            return Some(el);
        }
    }
    None
}

/// Weighted card-likeness factors for a candidate container.
fn score_container(ctx: &PageContext<'_>, el: ElementRef<'_>) -> i32 {
    let class_lower = dom::classes_lower(el);
    let text_lower = dom::element_text(el).to_lowercase();

    let img_sel = sel("img");
    let has_img = el.select(&img_sel).next().is_some();
    let has_known_brand = ctx.registry.match_text(&text_lower).is_some();
    let has_fin_terms = ctx.lexicon.fin_term_hits(&text_lower) >= 1;
    let has_card_class = ctx.lexicon.has_card_class(&class_lower);
    let has_trusted_link = has_trusted_outbound_link(ctx, el);

    let mut score = 0;
    if has_img {
        score += 1;
    }
    if has_known_brand {
        score += 2;
    }
    if has_fin_terms {
        score += 1;
    }
    if has_card_class {
        score += 1;
    }
    if has_trusted_link {
        score += 2;
    }
    score
}

/// True when the container holds an outbound link to the page's dominant
/// external domain or a known affiliate network.
fn has_trusted_outbound_link(ctx: &PageContext<'_>, el: ElementRef<'_>) -> bool {
    let anchor = sel(r#"a[href^="http"]"#);
    el.select(&anchor).any(|a| {
        a.value().attr("href").is_some_and(|href| {
            let on_top_domain = ctx
                .top_domain
                .as_deref()
                .is_some_and(|d| href.contains(d));
            on_top_domain || dom::is_affiliate_link(href)
        })
    })
}

/// Structural stand-ins for the rendered-size filter: the candidate must
/// have card-sized content and must not be a page-level wrapper.
fn passes_size_guards(el: ElementRef<'_>, page_text_len: usize) -> bool {
    let text_len = dom::element_text(el).chars().count();
    let img_sel = sel("img");
    let has_substance = text_len >= 5 || el.select(&img_sel).next().is_some();
    if !has_substance {
        return false;
    }

    if el.descendants().count() > MAX_DESCENDANTS {
        return false;
    }

    if page_text_len > 0 {
        #[allow(clippy::cast_precision_loss)]
        let share = text_len as f64 / page_text_len as f64;
        if share > MAX_TEXT_SHARE {
            return false;
        }
    }
    true
}
