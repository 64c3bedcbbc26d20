//! The render boundary: "give me a settled DOM for this URL".
//!
//! Browser automation itself is a collaborator concern. The pipeline only
//! needs the two operations below; [`HttpRenderer`] is the plain-HTTP
//! implementation used for static pages and for tests, and a JS-rendering
//! implementation can be swapped in behind the same trait.

use std::future::Future;
use std::time::Duration;

use scraper::{Html, Selector};

use crate::error::ScrapeError;

/// A navigated page after network settling.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL after redirects; the base for resolving relative links.
    pub final_url: String,
    pub html: String,
}

/// Identity signals read from a destination page during redirect resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: Option<String>,
    pub h1: Option<String>,
    pub og_title: Option<String>,
}

impl PageMeta {
    /// Candidate labels in trust order: title, h1, Open Graph title.
    #[must_use]
    pub fn candidates(&self) -> Vec<&str> {
        [self.title.as_deref(), self.h1.as_deref(), self.og_title.as_deref()]
            .into_iter()
            .flatten()
            .filter(|c| c.chars().count() > 2)
            .collect()
    }
}

pub trait Renderer: Send + Sync {
    /// Navigate to `url` and return the settled page.
    fn render(&self, url: &str) -> impl Future<Output = Result<RenderedPage, ScrapeError>> + Send;

    /// Open `url` in a fresh context and read its identity signals. Used by
    /// the redirect resolver; must respect a bounded per-item timeout.
    fn page_meta(&self, url: &str) -> impl Future<Output = Result<PageMeta, ScrapeError>> + Send;
}

/// Plain-HTTP renderer. No script execution; pages that build their offer
/// list client-side need a browser-backed implementation instead.
pub struct HttpRenderer {
    client: reqwest::Client,
    meta_client: reqwest::Client,
}

impl HttpRenderer {
    /// Creates a renderer with separate timeouts for full page navigation
    /// and for short-lived redirect-resolution fetches.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if a `reqwest::Client` cannot be built.
    pub fn new(
        nav_timeout_secs: u64,
        redirect_timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(nav_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let meta_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(redirect_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            meta_client,
        })
    }
}

impl Renderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage, ScrapeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: format!("HTTP status {status}"),
            });
        }
        let final_url = response.url().to_string();
        let html = response.text().await?;
        tracing::debug!(url, final_url, bytes = html.len(), "page rendered");
        Ok(RenderedPage { final_url, html })
    }

    async fn page_meta(&self, url: &str) -> Result<PageMeta, ScrapeError> {
        let response = self.meta_client.get(url).send().await?;
        let html = response.text().await?;
        Ok(parse_page_meta(&html))
    }
}

/// Pulls title, first h1, and `og:title` out of an HTML document.
#[must_use]
pub fn parse_page_meta(html: &str) -> PageMeta {
    let doc = Html::parse_document(html);
    let title_sel = Selector::parse("title").expect("valid selector");
    let h1_sel = Selector::parse("h1").expect("valid selector");
    let og_sel = Selector::parse(r#"meta[property="og:title"]"#).expect("valid selector");

    let text_of = |el: scraper::ElementRef<'_>| -> Option<String> {
        let text = el.text().collect::<String>().trim().to_string();
        (!text.is_empty()).then_some(text)
    };

    PageMeta {
        title: doc.select(&title_sel).next().and_then(text_of),
        h1: doc.select(&h1_sel).next().and_then(text_of),
        og_title: doc
            .select(&og_sel)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    }
}
