//! Fallback extraction, invoked only when the primary pipeline finds zero
//! offers. Tries embedded structured data first, then the operator's custom
//! target, then a permissive fixed class list.

use serde::Deserialize;

use crate::dom::{self, sel};
use crate::locator::{build_custom_target, locate_by_custom_target, PageContext};
use crate::types::{ExtractionMethod, PipelineConfig, RawOffer};

/// Logo base applied when the embedded payload does not name one.
const DEFAULT_LOGO_BASE: &str = "https://offers.credilead.ru/";

/// Permissive class list for the last-resort DOM pass.
const SIMPLE_CARD_SELECTOR: &str = ".card, .offer-item, .item, .offer-card, .product-layout";

#[derive(Debug, Deserialize)]
struct AppData {
    #[serde(default)]
    blocks: Vec<AppBlock>,
    offers_logo_base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AppBlock {
    block_type: String,
    #[serde(default)]
    offers: Vec<AppOffer>,
}

#[derive(Debug, Deserialize)]
struct AppOffer {
    site_name: Option<String>,
    name: Option<String>,
    url: Option<String>,
    logo: Option<String>,
}

/// Runs the fallback tactics in order; first non-empty result wins.
#[must_use]
pub fn run_fallback(ctx: &PageContext<'_>, config: &PipelineConfig) -> Option<(Vec<RawOffer>, ExtractionMethod)> {
    let offers = extract_embedded_json(ctx);
    if !offers.is_empty() {
        tracing::info!(count = offers.len(), "fallback: embedded JSON payload");
        return Some((offers, ExtractionMethod::EmbeddedJson));
    }

    if let Some(target) = config.custom_selector.as_deref().and_then(build_custom_target) {
        if let Ok(cards) = locate_by_custom_target(ctx, &target) {
            let offers: Vec<RawOffer> = cards
                .iter()
                .filter_map(|c| simple_extract(ctx, c.root))
                .collect();
            if !offers.is_empty() {
                tracing::info!(count = offers.len(), "fallback: custom target");
                return Some((offers, ExtractionMethod::CustomSelector));
            }
        }
    }

    let simple = sel(SIMPLE_CARD_SELECTOR);
    let offers: Vec<RawOffer> = ctx
        .doc
        .select(&simple)
        .filter_map(|el| simple_extract(ctx, el))
        .collect();
    if offers.is_empty() {
        None
    } else {
        tracing::info!(count = offers.len(), "fallback: simple DOM classes");
        Some((offers, ExtractionMethod::SimpleDom))
    }
}

/// Parses the `#app-data` structured payload used by some showcase engines.
fn extract_embedded_json(ctx: &PageContext<'_>) -> Vec<RawOffer> {
    let app_data = sel("#app-data");
    let Some(el) = ctx.doc.select(&app_data).next() else {
        return Vec::new();
    };
    let raw: String = el.text().collect();
    let Ok(data) = serde_json::from_str::<AppData>(&raw) else {
        tracing::debug!("app-data block present but not parseable");
        return Vec::new();
    };

    let logo_base = data
        .offers_logo_base_url
        .unwrap_or_else(|| DEFAULT_LOGO_BASE.to_string());

    let mut out = Vec::new();
    for block in data.blocks.into_iter().filter(|b| b.block_type == "offers") {
        for offer in block.offers {
            let Some(url) = offer.url.filter(|u| !u.is_empty()) else {
                continue;
            };
            let Some(label) = offer.site_name.or(offer.name).filter(|n| !n.is_empty()) else {
                continue;
            };
            let image_url = offer.logo.map(|l| format!("{logo_base}{l}"));
            out.push(RawOffer {
                label,
                canonical: None,
                link: url,
                image_url,
            });
        }
    }
    out
}

/// Low-precision per-element extraction: image alt/title or the first text
/// line as the name, first resolvable link as the destination.
fn simple_extract(ctx: &PageContext<'_>, el: scraper::ElementRef<'_>) -> Option<RawOffer> {
    let link = dom::find_card_link(el, &ctx.base, &ctx.page_host, ctx.top_domain.as_deref())?;

    let img = sel("img");
    let image = el.select(&img).next();
    let label = image
        .and_then(|i| {
            i.value()
                .attr("alt")
                .filter(|a| !a.trim().is_empty())
                .or_else(|| i.value().attr("title"))
                .map(|s| s.trim().to_string())
        })
        .or_else(|| dom::first_text_line(el))?;
    if label.chars().count() <= 2 {
        return None;
    }

    let image_url = image
        .and_then(|i| i.value().attr("src"))
        .and_then(|src| ctx.base.join(src).ok())
        .map(|u| u.to_string());

    Some(RawOffer {
        label,
        canonical: None,
        link,
        image_url,
    })
}
