//! The per-page extraction pipeline: locate cards, extract raw offers, fall
//! back when empty, normalize names, deduplicate by destination.
//!
//! DOM work is synchronous on purpose: the parsed document is not `Send`,
//! so everything that touches it happens between await points. The async
//! half ([`resolve_pending`]) only sees the finished offer list.

use scraper::Html;
use vitrina_core::{BrandLabel, ExtractedOffer, Lexicon, Normalizer, Placement};

use crate::error::ScrapeError;
use crate::fallback::run_fallback;
use crate::locator::{locate, PageContext};
use crate::redirect::resolve_brand_from_redirect;
use crate::render::Renderer;
use crate::types::{ExtractionMethod, PipelineConfig, RawOffer};
use crate::{extract, noise};

/// The pipeline's output for one rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub offers: Vec<ExtractedOffer>,
    /// Which tactic produced the offers; `None` when the page yielded zero
    /// offers, which is a legitimate outcome, not an error.
    pub method: Option<ExtractionMethod>,
}

/// Runs the full synchronous extraction pass over one page's HTML.
///
/// # Errors
///
/// Returns [`ScrapeError::InvalidUrl`] for an unusable final URL and
/// [`ScrapeError::InvalidSelector`] when a selector-only showcase carries an
/// unparseable custom selector. An empty result is not an error.
pub fn extract_offers(
    html: &str,
    final_url: &str,
    lexicon: &Lexicon,
    normalizer: &Normalizer<'_>,
    config: &PipelineConfig,
) -> Result<Extraction, ScrapeError> {
    let doc = Html::parse_document(html);
    let ctx = PageContext::new(&doc, final_url, lexicon, normalizer.registry())?;

    let (cards, mut method) = locate(&ctx, config)?;
    let mut raw_offers = extract::extract_cards(&ctx, &cards);

    if raw_offers.is_empty() {
        if let Some((fallback_offers, fallback_method)) = run_fallback(&ctx, config) {
            raw_offers = fallback_offers;
            method = Some(fallback_method);
        } else {
            method = None;
        }
    }

    let mut seen_links = std::collections::HashSet::new();
    let mut offers = Vec::new();
    for raw in raw_offers {
        if !seen_links.insert(raw.link.clone()) {
            continue;
        }
        offers.push(to_extracted(raw, normalizer, lexicon));
    }

    tracing::info!(
        count = offers.len(),
        method = method.map(ExtractionMethod::as_str),
        "extraction finished"
    );
    Ok(Extraction { offers, method })
}

/// Normalizes one raw offer into its persisted form.
fn to_extracted(raw: RawOffer, normalizer: &Normalizer<'_>, lexicon: &Lexicon) -> ExtractedOffer {
    let label = match raw.canonical {
        Some(brand) => BrandLabel::Resolved(brand),
        None if raw.label.is_empty() => BrandLabel::pending_empty(),
        None => {
            // Fallback tactics skip the noise filter; apply it here so UI
            // chrome never reaches storage as a name.
            if noise::is_trash_name(&raw.label, lexicon, normalizer.registry()) {
                BrandLabel::pending_empty()
            } else {
                normalizer.normalize(&raw.label, Some(&raw.link))
            }
        }
    };
    ExtractedOffer {
        label,
        link: raw.link,
        image_url: raw.image_url,
        placement: Placement::Main,
    }
}

/// Follows destination links for offers whose brand is still unknown.
///
/// Sequential per item: one short-lived navigation at a time, as a
/// politeness bound on the destination sites. Failures leave the label
/// untouched for the second stage to triage.
pub async fn resolve_pending<R: Renderer>(
    renderer: &R,
    offers: &mut [ExtractedOffer],
    normalizer: &Normalizer<'_>,
    lexicon: &Lexicon,
) {
    for offer in offers.iter_mut() {
        let needs_resolution = matches!(&offer.label, BrandLabel::Unresolved)
            || matches!(&offer.label, BrandLabel::Pending(raw) if raw.is_empty());
        if !needs_resolution || !offer.link.starts_with("http") {
            continue;
        }

        let Some(candidate) = resolve_brand_from_redirect(renderer, &offer.link, lexicon).await
        else {
            continue;
        };
        offer.label = match normalizer.normalize(&candidate, None) {
            BrandLabel::Resolved(brand) => BrandLabel::Resolved(brand),
            _ => BrandLabel::Pending(candidate),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrina_core::{BrandEntry, BrandRegistry};

    fn registry() -> BrandRegistry {
        BrandRegistry::from_entries(vec![
            BrandEntry {
                name: "Займер".to_string(),
                aliases: vec!["zaymer".to_string(), "займер".to_string()],
            },
            BrandEntry {
                name: "ДжойМани".to_string(),
                aliases: vec!["joymoney".to_string(), "joy.money".to_string()],
            },
        ])
        .unwrap()
    }

    // ---- end-to-end extraction over synthetic pages ----

    #[test]
    fn heuristic_walk_resolves_five_positioned_cards() {
        let card = |n: u32| {
            format!(
                r#"<div class="offer-card">
                    <img src="/logos/{n}.png" alt="Zaymer">
                    <span>Сумма до 30 000 руб</span>
                    <a href="https://aff.example/go/{n}">Получить деньги</a>
                </div>"#
            )
        };
        let cards: String = (1..=5).map(card).collect();
        let html = format!(
            "<html><body><header>Витрина займов — сравнение предложений</header>{cards}</body></html>"
        );
        let lex = Lexicon::russian();
        let reg = registry();
        let norm = Normalizer::new(&reg);
        let result = extract_offers(
            &html,
            "https://showcase.example/",
            &lex,
            &norm,
            &PipelineConfig::default(),
        )
        .unwrap();

        assert_eq!(result.method, Some(ExtractionMethod::HeuristicWalk));
        assert_eq!(result.offers.len(), 5);
        for (i, offer) in result.offers.iter().enumerate() {
            assert_eq!(offer.label, BrandLabel::Resolved("Займер".to_string()));
            assert_eq!(offer.link, format!("https://aff.example/go/{}", i + 1));
            assert_eq!(offer.placement, Placement::Main);
        }
    }

    #[test]
    fn empty_page_is_a_successful_zero_offer_extraction() {
        let lex = Lexicon::russian();
        let reg = registry();
        let norm = Normalizer::new(&reg);
        let result = extract_offers(
            "<html><body><p>Скоро открытие</p></body></html>",
            "https://showcase.example/",
            &lex,
            &norm,
            &PipelineConfig::default(),
        )
        .unwrap();
        assert!(result.offers.is_empty());
        assert_eq!(result.method, None);
    }

    #[test]
    fn nameless_card_comes_out_as_empty_pending() {
        let html = r#"
            <html><body>
                <div class="offer-card">
                    <img src="/n_56cd8a16afda9.png">
                    <span>Сумма до 50 000 руб</span>
                    <a href="https://aff.example/go/1">Получить деньги</a>
                </div>
            </body></html>
        "#;
        let lex = Lexicon::russian();
        let reg = registry();
        let norm = Normalizer::new(&reg);
        let result = extract_offers(
            html,
            "https://showcase.example/",
            &lex,
            &norm,
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(result.offers.len(), 1);
        assert_eq!(result.offers[0].label, BrandLabel::pending_empty());
        assert_eq!(result.offers[0].label.display_name(), "Offer");
    }

    #[test]
    fn fallback_simple_dom_kicks_in_when_primary_finds_nothing() {
        let html = r#"
            <html><body>
                <div class="offer-item">
                    <img src="/l.png" alt="joymoney">
                    <a href="https://aff.example/1">перейти</a>
                </div>
            </body></html>
        "#;
        let lex = Lexicon::russian();
        let reg = registry();
        let norm = Normalizer::new(&reg);
        let result = extract_offers(
            html,
            "https://showcase.example/",
            &lex,
            &norm,
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(result.method, Some(ExtractionMethod::SimpleDom));
        assert_eq!(result.offers.len(), 1);
        assert_eq!(
            result.offers[0].label,
            BrandLabel::Resolved("ДжойМани".to_string())
        );
    }

    #[test]
    fn offers_sharing_a_link_collapse_to_one() {
        let html = r#"
            <html><body>
                <div class="offer-item">
                    <img src="/a.png" alt="Первый бренд">
                    <a href="https://aff.example/same">x</a>
                </div>
                <div class="offer-item">
                    <img src="/b.png" alt="Второй бренд">
                    <a href="https://aff.example/same">x</a>
                </div>
            </body></html>
        "#;
        let lex = Lexicon::russian();
        let reg = registry();
        let norm = Normalizer::new(&reg);
        let result = extract_offers(
            html,
            "https://showcase.example/",
            &lex,
            &norm,
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(result.offers.len(), 1);
    }

    // ---- redirect resolution over a stub renderer ----

    struct StubRenderer {
        meta: crate::render::PageMeta,
    }

    impl Renderer for StubRenderer {
        async fn render(&self, url: &str) -> Result<crate::render::RenderedPage, ScrapeError> {
            Ok(crate::render::RenderedPage {
                final_url: url.to_string(),
                html: String::new(),
            })
        }

        async fn page_meta(&self, _url: &str) -> Result<crate::render::PageMeta, ScrapeError> {
            Ok(self.meta.clone())
        }
    }

    #[tokio::test]
    async fn pending_offer_is_resolved_through_redirect_title() {
        let renderer = StubRenderer {
            meta: crate::render::PageMeta {
                title: Some("JoyMoney — Займы онлайн".to_string()),
                h1: None,
                og_title: None,
            },
        };
        let lex = Lexicon::russian();
        let reg = registry();
        let norm = Normalizer::new(&reg);
        let mut offers = vec![ExtractedOffer {
            label: BrandLabel::pending_empty(),
            link: "https://joy.money/promo".to_string(),
            image_url: None,
            placement: Placement::Main,
        }];
        resolve_pending(&renderer, &mut offers, &norm, &lex).await;
        assert_eq!(
            offers[0].label,
            BrandLabel::Resolved("ДжойМани".to_string())
        );
    }

    #[tokio::test]
    async fn resolved_offers_are_not_renavigated() {
        let renderer = StubRenderer {
            meta: crate::render::PageMeta {
                title: Some("Другой Бренд".to_string()),
                h1: None,
                og_title: None,
            },
        };
        let lex = Lexicon::russian();
        let reg = registry();
        let norm = Normalizer::new(&reg);
        let mut offers = vec![ExtractedOffer {
            label: BrandLabel::Resolved("Займер".to_string()),
            link: "https://anywhere.example/1".to_string(),
            image_url: None,
            placement: Placement::Main,
        }];
        resolve_pending(&renderer, &mut offers, &norm, &lex).await;
        assert_eq!(offers[0].label, BrandLabel::Resolved("Займер".to_string()));
    }
}
