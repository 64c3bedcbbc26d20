use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("invalid CSS selector '{selector}'")]
    InvalidSelector { selector: String },

    #[error("invalid showcase URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ScrapeError {
    /// True for failure signatures that warrant one whole-run retry:
    /// navigation timeouts and detached-DOM style invalidations. Everything
    /// else is terminal on first occurrence.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ScrapeError::Http(e) => e.is_timeout() || e.is_connect(),
            ScrapeError::Navigation { reason, .. } => {
                let low = reason.to_lowercase();
                low.contains("timeout") || low.contains("detached")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_frame_navigation_is_transient() {
        let err = ScrapeError::Navigation {
            url: "https://example.com".to_string(),
            reason: "frame was detached during evaluation".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn timeout_navigation_is_transient() {
        let err = ScrapeError::Navigation {
            url: "https://example.com".to_string(),
            reason: "Navigation timeout of 60000ms exceeded".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn invalid_selector_is_terminal() {
        let err = ScrapeError::InvalidSelector {
            selector: "div[".to_string(),
        };
        assert!(!err.is_transient());
    }
}
