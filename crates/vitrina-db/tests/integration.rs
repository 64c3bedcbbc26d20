//! Offline unit tests for vitrina-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use uuid::Uuid;
use vitrina_db::{OfferRow, ParsingRunRow, PoolConfig, ShowcaseRow};

#[test]
fn pool_config_defaults_are_sane() {
    let config = PoolConfig::default();
    assert!(config.max_connections >= config.min_connections);
    assert!(config.acquire_timeout_secs > 0);
}

/// Compile-time smoke test: confirm that the row types have all expected
/// fields with the correct types. No database required.
#[test]
fn row_types_have_expected_fields() {
    let showcase = ShowcaseRow {
        id: 1,
        url: "https://showcase.example/".to_string(),
        name: "Showcase".to_string(),
        is_active: true,
        custom_selector: None,
        strategy: "auto".to_string(),
        created_at: Utc::now(),
    };
    assert!(showcase.is_active);

    let run = ParsingRunRow {
        id: 1,
        public_id: Uuid::new_v4(),
        showcase_id: showcase.id,
        status: "success".to_string(),
        parsing_method: Some("DOM (Cluster Match)".to_string()),
        screenshot_path: None,
        error_message: None,
        run_date: Utc::now(),
    };
    assert_eq!(run.status, "success");

    let offer = OfferRow {
        id: 1,
        run_id: run.id,
        placement_type: "main".to_string(),
        position: 1,
        company_name: "Займер".to_string(),
        link: "https://aff.example/go/1".to_string(),
        image_url: None,
        captured_at: Utc::now(),
    };
    assert_eq!(offer.position, 1);
}
