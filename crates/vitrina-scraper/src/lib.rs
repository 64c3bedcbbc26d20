pub mod dom;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod locator;
pub mod noise;
pub mod pipeline;
pub mod redirect;
pub mod render;
pub mod second_stage;
pub mod types;

pub use error::ScrapeError;
pub use pipeline::{extract_offers, resolve_pending, Extraction};
pub use redirect::resolve_brand_from_redirect;
pub use render::{HttpRenderer, PageMeta, RenderedPage, Renderer};
pub use second_stage::{refine, unknown_fingerprint};
pub use types::{ExtractionMethod, LocatorStrategy, PipelineConfig, RawOffer};
