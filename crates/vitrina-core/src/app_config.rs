use std::path::PathBuf;

/// Application configuration resolved from the environment.
///
/// Built by [`crate::config::load_app_config`]; fields are plain values so
/// the rest of the workspace never touches `std::env` directly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// Path to the brand alias registry (YAML).
    pub brands_path: PathBuf,
    pub log_level: String,
    pub user_agent: String,
    /// Hard per-page navigation timeout; exceeding it fails the run attempt.
    pub nav_timeout_secs: u64,
    /// Per-item timeout for redirect-based brand resolution.
    pub redirect_timeout_secs: u64,
    /// Concurrency across showcases in a batch run. 1 = sequential.
    pub max_concurrent_showcases: usize,
    /// Whole-run attempts for transient failures (1 initial + retries).
    pub max_run_attempts: u32,
    /// Enables the strict second-stage refinement pass.
    pub second_stage_enabled: bool,
    pub screenshot_dir: PathBuf,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}
