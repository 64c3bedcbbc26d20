//! Card location: finding the DOM elements that represent individual offer
//! cards in an arbitrary, uncontrolled page.
//!
//! Three interchangeable strategies, tried in order, first non-empty result
//! wins: an operator-configured explicit selector, the heuristic ancestor
//! walk, and repeating-class pattern detection (only under the
//! pattern-cluster preset).

mod heuristic;
mod pattern;

pub use heuristic::walk_from_actions;
pub use pattern::{detect_repeating_pattern, PatternConfig};

use scraper::{ElementRef, Html, Selector};
use url::Url;
use vitrina_core::{BrandRegistry, Lexicon};

use crate::dom::{self, sel};
use crate::error::ScrapeError;
use crate::types::{ExtractionMethod, LocatorStrategy, PipelineConfig};

/// Everything the locator and extractor need to know about the page.
pub struct PageContext<'a> {
    pub doc: &'a Html,
    pub base: Url,
    pub page_host: String,
    /// The page's dominant external link host, if any.
    pub top_domain: Option<String>,
    pub lexicon: &'a Lexicon,
    pub registry: &'a BrandRegistry,
}

impl<'a> PageContext<'a> {
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidUrl`] if `final_url` is not an absolute
    /// URL with a host.
    pub fn new(
        doc: &'a Html,
        final_url: &str,
        lexicon: &'a Lexicon,
        registry: &'a BrandRegistry,
    ) -> Result<Self, ScrapeError> {
        let base = Url::parse(final_url).map_err(|e| ScrapeError::InvalidUrl {
            url: final_url.to_string(),
            reason: e.to_string(),
        })?;
        let page_host = base
            .host_str()
            .ok_or_else(|| ScrapeError::InvalidUrl {
                url: final_url.to_string(),
                reason: "URL has no host".to_string(),
            })?
            .to_string();
        let top_domain = dom::dominant_external_domain(doc, &page_host);
        Ok(Self {
            doc,
            base,
            page_host,
            top_domain,
            lexicon,
            registry,
        })
    }
}

/// One located offer card: the container element plus the href of the
/// action element that led to it (when discovery went through one).
pub struct Card<'a> {
    pub root: ElementRef<'a>,
    pub trigger_href: Option<String>,
}

/// An operator selector override, reduced to a queryable form.
///
/// Operators may paste either a plain CSS selector or an HTML snippet of one
/// card. Snippets are reduced to `tag.class1.class2` plus the set of classes
/// that must appear somewhere inside a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomTarget {
    pub selector: String,
    pub required_classes: Vec<String>,
}

/// Builds a [`CustomTarget`] from the raw operator input.
#[must_use]
pub fn build_custom_target(raw: &str) -> Option<CustomTarget> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if !raw.starts_with('<') {
        return Some(CustomTarget {
            selector: raw.to_string(),
            required_classes: Vec::new(),
        });
    }

    // HTML template form: take the snippet's root element as the selector
    // and every class in the snippet as a required class.
    let fragment = Html::parse_fragment(raw);
    let root = fragment
        .root_element()
        .children()
        .find_map(ElementRef::wrap)?;

    let tag = root.value().name().to_lowercase();
    let root_classes: Vec<&str> = root.value().classes().collect();
    let selector = if root_classes.is_empty() {
        tag
    } else {
        format!("{tag}.{}", root_classes.join("."))
    };

    let mut required_classes: Vec<String> = Vec::new();
    for node in fragment.root_element().descendants() {
        if let Some(el) = ElementRef::wrap(node) {
            for class in el.value().classes() {
                if !required_classes.iter().any(|c| c == class) {
                    required_classes.push(class.to_string());
                }
            }
        }
    }

    Some(CustomTarget {
        selector,
        required_classes,
    })
}

/// Queries the custom target, enforcing its required-class set.
pub(crate) fn locate_by_custom_target<'a>(
    ctx: &PageContext<'a>,
    target: &CustomTarget,
) -> Result<Vec<Card<'a>>, ScrapeError> {
    let selector =
        Selector::parse(&target.selector).map_err(|_| ScrapeError::InvalidSelector {
            selector: target.selector.clone(),
        })?;

    let matches = ctx
        .doc
        .select(&selector)
        .filter(|el| {
            target.required_classes.iter().all(|cls| {
                el.value().classes().any(|c| c == cls)
                    || Selector::parse(&format!(".{cls}"))
                        .is_ok_and(|s| el.select(&s).next().is_some())
            })
        })
        .map(|el| Card {
            root: el,
            trigger_href: None,
        })
        .collect();
    Ok(matches)
}

/// Locates offer cards using the showcase's configured strategy.
///
/// Returns the card list and the method that produced it; an empty list
/// means every applicable strategy came up dry and the caller should invoke
/// the fallback extractor.
///
/// # Errors
///
/// Returns [`ScrapeError::InvalidSelector`] if the operator's custom
/// selector cannot be parsed. Heuristic strategies do not error; they
/// return empty.
pub fn locate<'a>(
    ctx: &PageContext<'a>,
    config: &PipelineConfig,
) -> Result<(Vec<Card<'a>>, Option<ExtractionMethod>), ScrapeError> {
    if let Some(target) = config.custom_selector.as_deref().and_then(build_custom_target) {
        match locate_by_custom_target(ctx, &target) {
            Ok(cards) if !cards.is_empty() => {
                tracing::debug!(
                    selector = %target.selector,
                    count = cards.len(),
                    "custom selector matched"
                );
                return Ok((cards, Some(ExtractionMethod::CustomSelector)));
            }
            Ok(_) => {
                tracing::debug!(selector = %target.selector, "custom selector matched nothing");
            }
            Err(e) => {
                // An unparseable operator selector must not kill the run when
                // a heuristic can still try.
                if config.strategy() == LocatorStrategy::SelectorOnly {
                    return Err(e);
                }
                tracing::warn!(error = %e, "ignoring invalid custom selector");
            }
        }
    }

    match config.strategy() {
        LocatorStrategy::SelectorOnly => Ok((Vec::new(), None)),
        LocatorStrategy::Auto => {
            let cards = walk_from_actions(ctx);
            let method = (!cards.is_empty()).then_some(ExtractionMethod::HeuristicWalk);
            Ok((cards, method))
        }
        LocatorStrategy::PatternCluster => {
            let cards = detect_repeating_pattern(ctx, &PatternConfig::default());
            let method = (!cards.is_empty()).then_some(ExtractionMethod::PatternCluster);
            Ok((cards, method))
        }
    }
}

/// Selector for elements that can be a card's call to action. Containers
/// whose text merely echoes an action phrase must not match, or layout
/// wrappers start walks of their own.
pub(crate) fn action_selector() -> Selector {
    sel(r#"a, button, [role="button"], .btn, .button"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrina_core::BrandEntry;

    fn registry() -> BrandRegistry {
        BrandRegistry::from_entries(vec![BrandEntry {
            name: "Займер".to_string(),
            aliases: vec!["zaymer".to_string(), "займер".to_string()],
        }])
        .unwrap()
    }

    #[test]
    fn plain_selector_becomes_custom_target() {
        let target = build_custom_target(".offer-card").unwrap();
        assert_eq!(target.selector, ".offer-card");
        assert!(target.required_classes.is_empty());
    }

    #[test]
    fn html_snippet_is_reduced_to_tag_and_classes() {
        let target =
            build_custom_target(r#"<div class="offer wide"><span class="price"></span></div>"#)
                .unwrap();
        assert_eq!(target.selector, "div.offer.wide");
        assert!(target.required_classes.contains(&"offer".to_string()));
        assert!(target.required_classes.contains(&"price".to_string()));
    }

    #[test]
    fn blank_custom_selector_is_none() {
        assert_eq!(build_custom_target("   "), None);
    }

    #[test]
    fn custom_selector_strategy_finds_cards() {
        let html = r#"
            <html><body>
                <div class="offer-card"><a href="https://aff.example/1">Взять займ</a></div>
                <div class="offer-card"><a href="https://aff.example/2">Взять займ</a></div>
                <div class="footer">about</div>
            </body></html>
        "#;
        let doc = Html::parse_document(html);
        let lex = Lexicon::russian();
        let reg = registry();
        let ctx = PageContext::new(&doc, "https://showcase.example/", &lex, &reg).unwrap();
        let config = PipelineConfig {
            custom_selector: Some(".offer-card".to_string()),
            strategy: None,
        };
        let (cards, method) = locate(&ctx, &config).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(method, Some(ExtractionMethod::CustomSelector));
    }

    #[test]
    fn selector_only_strategy_never_falls_through_to_heuristics() {
        let html = r#"
            <html><body>
                <div class="card"><img src="/l.png"><a href="https://aff.example/1">Взять займ</a></div>
            </body></html>
        "#;
        let doc = Html::parse_document(html);
        let lex = Lexicon::russian();
        let reg = registry();
        let ctx = PageContext::new(&doc, "https://showcase.example/", &lex, &reg).unwrap();
        let config = PipelineConfig {
            custom_selector: Some(".does-not-exist".to_string()),
            strategy: Some(LocatorStrategy::SelectorOnly),
        };
        let (cards, method) = locate(&ctx, &config).unwrap();
        assert!(cards.is_empty());
        assert_eq!(method, None);
    }
}
