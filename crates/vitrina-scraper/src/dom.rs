//! Small DOM helpers shared by the locator and extractor.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use url::Url;

/// Affiliate-network hosts whose links are trusted as offer destinations
/// even when they dominate no other signal.
pub const AFFILIATE_DOMAINS: &[&str] = &[
    "leads.su",
    "leadgid.ru",
    "pdl-profit.com",
    "guruleads.ru",
    "leadsid.ru",
    "leadprofit.pro",
];

/// Parses a selector that is known-valid at compile time.
pub(crate) fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("valid selector")
}

/// Element text with whitespace collapsed to single spaces.
#[must_use]
pub fn element_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for chunk in el.text() {
        let trimmed = chunk.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(trimmed);
    }
    out
}

/// First non-empty text chunk, the static-DOM stand-in for the first
/// rendered line.
#[must_use]
pub fn first_text_line(el: ElementRef<'_>) -> Option<String> {
    el.text()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(ToString::to_string)
}

/// The element's class attribute, lowercased and space-joined.
#[must_use]
pub fn classes_lower(el: ElementRef<'_>) -> String {
    el.value()
        .classes()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves an href to an absolute URL against the page base. Rejects
/// fragments, `javascript:` pseudo-links, and self-references.
#[must_use]
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href == "#" || href.starts_with("javascript:") {
        return None;
    }
    let resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    if resolved.as_str() == base.as_str() {
        return None;
    }
    Some(resolved.to_string())
}

/// True when the absolute URL points off the showcase's own host.
#[must_use]
pub fn is_outbound(url: &str, page_host: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h != page_host))
        .unwrap_or(false)
}

/// True when the URL's host belongs to a known affiliate network.
#[must_use]
pub fn is_affiliate_link(url: &str) -> bool {
    let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(String::from)) else {
        return false;
    };
    AFFILIATE_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
}

/// The most frequent external hostname among the page's absolute links.
///
/// Showcase pages funnel every card through one tracker domain; that domain
/// is a strong signal for which links are offer destinations. Ties break
/// lexicographically so the result is deterministic.
#[must_use]
pub fn dominant_external_domain(doc: &Html, page_host: &str) -> Option<String> {
    let anchor = sel("a[href]");
    let mut counts: HashMap<String, usize> = HashMap::new();
    for el in doc.select(&anchor) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if !href.starts_with("http") {
            continue;
        }
        let Some(host) = Url::parse(href).ok().and_then(|u| u.host_str().map(String::from))
        else {
            continue;
        };
        if host == page_host {
            continue;
        }
        *counts.entry(host).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(host, _)| host)
}

/// Finds the card's destination link, preferring the dominant external
/// domain and affiliate hosts over arbitrary outbound links.
#[must_use]
pub fn find_card_link(
    card: ElementRef<'_>,
    base: &Url,
    page_host: &str,
    top_domain: Option<&str>,
) -> Option<String> {
    let anchor = sel("a[href]");
    let mut fallback: Option<String> = None;

    for link in card.select(&anchor) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(abs) = resolve_href(base, href) else {
            continue;
        };
        let preferred = top_domain.is_some_and(|d| {
            Url::parse(&abs)
                .ok()
                .and_then(|u| u.host_str().map(|h| h == d))
                .unwrap_or(false)
        }) || is_affiliate_link(&abs);
        if preferred {
            return Some(abs);
        }
        if fallback.is_none() && is_outbound(&abs, page_host) {
            fallback = Some(abs);
        }
    }

    // No outbound candidate: accept the first resolvable link of any kind,
    // the way permissive fallback extraction does.
    if fallback.is_none() {
        for link in card.select(&anchor) {
            if let Some(abs) = link.value().attr("href").and_then(|h| resolve_href(base, h)) {
                fallback = Some(abs);
                break;
            }
        }
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://showcase.example/offers").unwrap()
    }

    #[test]
    fn resolve_href_rejects_pseudo_links() {
        assert_eq!(resolve_href(&base(), "javascript:void(0)"), None);
        assert_eq!(resolve_href(&base(), "#"), None);
        assert_eq!(resolve_href(&base(), ""), None);
    }

    #[test]
    fn resolve_href_makes_relative_links_absolute() {
        assert_eq!(
            resolve_href(&base(), "/go/1").as_deref(),
            Some("https://showcase.example/go/1")
        );
        assert_eq!(
            resolve_href(&base(), "https://aff.example/go/2").as_deref(),
            Some("https://aff.example/go/2")
        );
    }

    #[test]
    fn dominant_external_domain_picks_most_frequent_host() {
        let html = r#"
            <a href="https://aff.example/go/1">x</a>
            <a href="https://aff.example/go/2">x</a>
            <a href="https://other.example/promo">x</a>
            <a href="https://showcase.example/about">self</a>
        "#;
        let doc = Html::parse_document(html);
        assert_eq!(
            dominant_external_domain(&doc, "showcase.example").as_deref(),
            Some("aff.example")
        );
    }

    #[test]
    fn affiliate_links_are_recognized_by_host_suffix() {
        assert!(is_affiliate_link("https://go.leads.su/click/1"));
        assert!(is_affiliate_link("https://pdl-profit.com/x"));
        assert!(!is_affiliate_link("https://leads.su.evil.example/x"));
    }

    #[test]
    fn find_card_link_prefers_top_domain_over_first_link() {
        let html = r#"
            <div class="card">
                <a href="/internal">inner</a>
                <a href="https://random.example/x">r</a>
                <a href="https://aff.example/go/5">go</a>
            </div>
        "#;
        let doc = Html::parse_document(html);
        let card_sel = sel(".card");
        let card = doc.select(&card_sel).next().unwrap();
        let link = find_card_link(card, &base(), "showcase.example", Some("aff.example"));
        assert_eq!(link.as_deref(), Some("https://aff.example/go/5"));
    }

    #[test]
    fn element_text_collapses_whitespace() {
        let doc = Html::parse_document("<div>  Займер \n <span>до 30 000</span></div>");
        let div_sel = sel("div");
        let div = doc.select(&div_sel).next().unwrap();
        assert_eq!(element_text(div), "Займер до 30 000");
    }
}
