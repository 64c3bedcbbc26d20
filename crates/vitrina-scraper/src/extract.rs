//! Card extraction: turning a located card element into a raw offer.
//!
//! Name resolution runs an explicitly ordered tactic list, first success
//! wins. Tactics that resolve through the alias registry produce a canonical
//! brand directly; textual tactics produce a raw label candidate that still
//! has to survive normalization downstream.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use crate::dom::{self, sel};
use crate::locator::{Card, PageContext};
use crate::noise::is_trash_name;
use crate::types::RawOffer;
use vitrina_core::normalize::LABEL_DELIMITERS;

/// Final label cap, in chars, after delimiter truncation.
const LABEL_MAX_CHARS: usize = 35;

/// Minimum alias length used by attribute and deep-text scans; shorter
/// aliases produce too many accidental substring hits in markup.
const MIN_SCAN_ALIAS_CHARS: usize = 3;

/// Dimension tokens in image file names ("120x60", "64X64").
static DIMENSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{2,4}[xX]\d{2,4}\b").expect("valid regex"));

/// Year-like digit runs in asset names ("2024", "202403").
static YEAR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19|20)\d{2,4}\b").expect("valid regex"));

/// What a single tactic produced.
enum Candidate {
    /// Resolved through the registry; skips normalization entirely.
    Canonical(String),
    /// A textual candidate that downstream normalization must vet.
    Raw(String),
}

type Tactic = for<'a> fn(&PageContext<'a>, &Card<'a>) -> Option<Candidate>;

/// The ordered tactic list. Order is the contract: earlier tactics are more
/// precise, later ones trade precision for coverage.
const TACTICS: &[(&str, Tactic)] = &[
    ("semantic-markup", from_semantic_markup),
    ("technical-attributes", from_technical_attributes),
    ("image-filename", from_image_filename),
    ("image-alt", from_image_alt),
    ("headings", from_headings),
    ("deep-alias-scan", from_deep_alias_scan),
];

/// Extracts a raw offer from one located card.
///
/// Returns `None` when the card has no resolvable destination link; a card
/// without a destination carries no ranking value.
#[must_use]
pub fn extract_offer<'a>(ctx: &PageContext<'a>, card: &Card<'a>) -> Option<RawOffer> {
    let link = card
        .trigger_href
        .clone()
        .or_else(|| dom::find_card_link(card.root, &ctx.base, &ctx.page_host, ctx.top_domain.as_deref()))?;

    let mut canonical = None;
    let mut label = String::new();
    for (tactic_name, tactic) in TACTICS {
        match tactic(ctx, card) {
            Some(Candidate::Canonical(brand)) => {
                tracing::trace!(tactic = tactic_name, brand, "tactic resolved canonically");
                canonical = Some(brand);
                break;
            }
            Some(Candidate::Raw(raw)) => {
                let cleaned = finalize_label(&raw);
                if !cleaned.is_empty() && !is_trash_name(&cleaned, ctx.lexicon, ctx.registry) {
                    tracing::trace!(tactic = tactic_name, label = %cleaned, "tactic produced label");
                    label = cleaned;
                    break;
                }
            }
            None => {}
        }
    }

    let image_url = first_image_src(ctx, card.root);

    Some(RawOffer {
        label,
        canonical,
        link,
        image_url,
    })
}

/// Extracts all cards, deduplicated by destination link. Distinct offers may
/// legitimately share a placeholder name, so the link is the identity.
#[must_use]
pub fn extract_cards<'a>(ctx: &PageContext<'a>, cards: &[Card<'a>]) -> Vec<RawOffer> {
    let mut seen_links = std::collections::HashSet::new();
    let mut offers = Vec::new();
    for card in cards {
        let Some(offer) = extract_offer(ctx, card) else {
            continue;
        };
        if seen_links.insert(offer.link.clone()) {
            offers.push(offer);
        }
    }
    offers
}

/// Tactic 1: elements carrying identity-like markup.
fn from_semantic_markup<'a>(ctx: &PageContext<'a>, card: &Card<'a>) -> Option<Candidate> {
    let semantic = sel(
        r#"[itemprop="name"], [data-role="title"], [data-name="title"], [class*="name"], [class*="title"]"#,
    );
    for el in card.root.select(&semantic) {
        let text = dom::element_text(el);
        if text.chars().count() > 2 && !is_trash_name(&text, ctx.lexicon, ctx.registry) {
            return Some(Candidate::Raw(text));
        }
    }
    None
}

/// Tactic 2: `onclick` handlers and `data-*` attribute values that embed a
/// known alias. These are written by the page's own tracking code, so a hit
/// resolves canonically.
fn from_technical_attributes<'a>(ctx: &PageContext<'a>, card: &Card<'a>) -> Option<Candidate> {
    for node in card.root.descendants() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        for (attr_name, value) in el.value().attrs() {
            if attr_name != "onclick" && !attr_name.starts_with("data-") {
                continue;
            }
            let low = value.to_lowercase();
            for (brand, alias) in ctx.registry.aliases_longer_than(MIN_SCAN_ALIAS_CHARS) {
                if low.contains(alias) {
                    return Some(Candidate::Canonical(brand.to_string()));
                }
            }
        }
    }
    None
}

/// Tactic 3: the logo's file name, which frequently carries the brand slug.
fn from_image_filename<'a>(ctx: &PageContext<'a>, card: &Card<'a>) -> Option<Candidate> {
    let img = sel("img[src]");
    let src = card.root.select(&img).next()?.value().attr("src")?;
    let stem = image_filename_stem(src)?;
    if stem.chars().count() > 3 && !is_trash_name(&stem, ctx.lexicon, ctx.registry) {
        Some(Candidate::Raw(stem))
    } else {
        None
    }
}

/// Tactic 4: image `alt`/`title`.
fn from_image_alt<'a>(ctx: &PageContext<'a>, card: &Card<'a>) -> Option<Candidate> {
    let img = sel("img");
    for el in card.root.select(&img) {
        let Some(alt) = el
            .value()
            .attr("alt")
            .filter(|a| !a.trim().is_empty())
            .or_else(|| el.value().attr("title"))
        else {
            continue;
        };
        let alt = alt.trim();
        if alt.chars().count() > 2 && !is_trash_name(alt, ctx.lexicon, ctx.registry) {
            return Some(Candidate::Raw(alt.to_string()));
        }
    }
    None
}

/// Tactic 5: headings and bold text inside the card.
fn from_headings<'a>(ctx: &PageContext<'a>, card: &Card<'a>) -> Option<Candidate> {
    let heads = sel("h1, h2, h3, h4, b, strong");
    for el in card.root.select(&heads) {
        let text = dom::element_text(el);
        if !text.is_empty() && !is_trash_name(&text, ctx.lexicon, ctx.registry) {
            return Some(Candidate::Raw(text));
        }
    }
    None
}

/// Tactic 6: the card's full text scanned against every long-enough alias.
fn from_deep_alias_scan<'a>(ctx: &PageContext<'a>, card: &Card<'a>) -> Option<Candidate> {
    let text = dom::element_text(card.root).to_lowercase();
    let html = card.root.html().to_lowercase();
    for (brand, alias) in ctx.registry.aliases_longer_than(MIN_SCAN_ALIAS_CHARS) {
        if text.contains(alias) || html.contains(alias) {
            return Some(Candidate::Canonical(brand.to_string()));
        }
    }
    None
}

/// Reduces an image URL to a cleaned file-name stem: extension, dimension
/// tokens, and year-like digit runs stripped, separators spaced out.
#[must_use]
pub fn image_filename_stem(src: &str) -> Option<String> {
    let file = src.rsplit('/').next()?;
    let stem = file.split('.').next().unwrap_or(file);
    let spaced = stem.replace(['-', '_'], " ");
    let no_dims = DIMENSION_TOKEN.replace_all(&spaced, " ");
    let no_years = YEAR_RUN.replace_all(&no_dims, " ");
    let collapsed = no_years.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Final label cleanup: cut at the first delimiter, cap the length, trim.
#[must_use]
pub fn finalize_label(raw: &str) -> String {
    let first = raw.split(LABEL_DELIMITERS).next().unwrap_or(raw);
    first.chars().take(LABEL_MAX_CHARS).collect::<String>().trim().to_string()
}

/// First image source inside the card, resolved absolute.
fn first_image_src<'a>(ctx: &PageContext<'a>, card: ElementRef<'a>) -> Option<String> {
    let img = sel("img[src]");
    card.select(&img)
        .next()
        .and_then(|el| el.value().attr("src"))
        .and_then(|src| ctx.base.join(src).ok())
        .map(|u| u.to_string())
}
