pub mod app_config;
pub mod config;
pub mod label;
pub mod lexicon;
pub mod normalize;
pub mod offer;
pub mod registry;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use label::BrandLabel;
pub use lexicon::Lexicon;
pub use normalize::Normalizer;
pub use offer::{ExtractedOffer, Placement, RunOutcome};
pub use registry::{BrandEntry, BrandRegistry};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[from] serde_yaml::Error),

    #[error("brands file validation failed: {0}")]
    Validation(String),
}
