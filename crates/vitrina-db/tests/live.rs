//! Live integration tests for vitrina-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/vitrina-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use vitrina_core::{BrandLabel, ExtractedOffer, Placement};
use vitrina_db::{
    append_offer, create_parsing_run, get_showcase, insert_showcase, list_active_showcases,
    list_run_offers, mark_run_failed, mark_run_succeeded, record_failed_run, seed_showcases,
    set_run_method, set_showcase_active, set_showcase_selector, update_offer_name, upsert_logo,
    upsert_unknown, DbError,
};

fn offer(name: &str, link: &str) -> ExtractedOffer {
    ExtractedOffer {
        label: BrandLabel::Resolved(name.to_string()),
        link: link.to_string(),
        image_url: None,
        placement: Placement::Main,
    }
}

// ---------------------------------------------------------------------------
// showcases
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn showcase_insert_is_idempotent_by_url(pool: sqlx::PgPool) {
    let first = insert_showcase(&pool, "Витрина", "https://a.example/")
        .await
        .unwrap();
    let second = insert_showcase(&pool, "Другое имя", "https://a.example/")
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "Витрина");
}

#[sqlx::test(migrations = "../../migrations")]
async fn inactive_showcases_are_excluded_from_the_active_list(pool: sqlx::PgPool) {
    let a = insert_showcase(&pool, "A", "https://a.example/").await.unwrap();
    let b = insert_showcase(&pool, "B", "https://b.example/").await.unwrap();
    set_showcase_active(&pool, b.id, false).await.unwrap();

    let active = list_active_showcases(&pool).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, a.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn selector_and_strategy_round_trip(pool: sqlx::PgPool) {
    let s = insert_showcase(&pool, "A", "https://a.example/").await.unwrap();
    set_showcase_selector(&pool, s.id, Some(".offer-card"), "pattern-cluster")
        .await
        .unwrap();

    let loaded = get_showcase(&pool, s.id).await.unwrap();
    assert_eq!(loaded.custom_selector.as_deref(), Some(".offer-card"));
    assert_eq!(loaded.strategy, "pattern-cluster");
}

#[sqlx::test(migrations = "../../migrations")]
async fn missing_showcase_is_not_found(pool: sqlx::PgPool) {
    assert!(matches!(
        get_showcase(&pool, 424_242).await,
        Err(DbError::NotFound)
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn seeding_skips_existing_urls(pool: sqlx::PgPool) {
    let sites = vec![
        ("A".to_string(), "https://a.example/".to_string()),
        ("B".to_string(), "https://b.example/".to_string()),
    ];
    assert_eq!(seed_showcases(&pool, &sites).await.unwrap(), 2);
    assert_eq!(seed_showcases(&pool, &sites).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// runs and offers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn run_with_positioned_offers_round_trips(pool: sqlx::PgPool) {
    let s = insert_showcase(&pool, "A", "https://a.example/").await.unwrap();
    let run = create_parsing_run(&pool, s.id, Some("/shots/a.png")).await.unwrap();
    set_run_method(&pool, run.id, "DOM (Cluster Match)").await.unwrap();

    for (i, name) in ["Займер", "МигКредит", "Offer"].iter().enumerate() {
        let position = i32::try_from(i).unwrap() + 1;
        append_offer(
            &pool,
            run.id,
            position,
            &offer(name, &format!("https://aff.example/{i}")),
        )
        .await
        .unwrap();
    }

    let rows = list_run_offers(&pool, run.id).await.unwrap();
    assert_eq!(rows.len(), 3);
    let positions: Vec<i32> = rows.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![1, 2, 3]);
    assert_eq!(rows[0].company_name, "Займер");
}

#[sqlx::test(migrations = "../../migrations")]
async fn a_run_is_pending_until_its_outcome_is_marked(pool: sqlx::PgPool) {
    let s = insert_showcase(&pool, "A", "https://a.example/").await.unwrap();
    let run = create_parsing_run(&pool, s.id, None).await.unwrap();
    assert_eq!(run.status, "pending");

    mark_run_succeeded(&pool, run.id).await.unwrap();
    let (status,): (String,) = sqlx::query_as("SELECT status FROM parsing_runs WHERE id = $1")
        .bind(run.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "success");
}

#[sqlx::test(migrations = "../../migrations")]
async fn interrupted_persistence_leaves_an_error_run(pool: sqlx::PgPool) {
    // A run whose offer writes die partway must not read as successful,
    // whatever rows made it in before the failure.
    let s = insert_showcase(&pool, "A", "https://a.example/").await.unwrap();
    let run = create_parsing_run(&pool, s.id, None).await.unwrap();
    append_offer(&pool, run.id, 1, &offer("Займер", "https://aff.example/1"))
        .await
        .unwrap();

    mark_run_failed(&pool, run.id, "offer insert failed").await.unwrap();
    let (status, message): (String, Option<String>) =
        sqlx::query_as("SELECT status, error_message FROM parsing_runs WHERE id = $1")
            .bind(run.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "error");
    assert_eq!(message.as_deref(), Some("offer insert failed"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_position_in_one_channel_is_rejected(pool: sqlx::PgPool) {
    let s = insert_showcase(&pool, "A", "https://a.example/").await.unwrap();
    let run = create_parsing_run(&pool, s.id, None).await.unwrap();

    append_offer(&pool, run.id, 1, &offer("Займер", "https://aff.example/1"))
        .await
        .unwrap();
    let dup = append_offer(&pool, run.id, 1, &offer("Другой", "https://aff.example/2")).await;
    assert!(dup.is_err());
}

#[sqlx::test(migrations = "../../migrations")]
async fn failed_run_carries_the_error_message(pool: sqlx::PgPool) {
    let s = insert_showcase(&pool, "A", "https://a.example/").await.unwrap();
    let run = record_failed_run(&pool, s.id, "navigation timeout").await.unwrap();
    assert_eq!(run.status, "error");
    assert_eq!(run.error_message.as_deref(), Some("navigation timeout"));
    assert!(list_run_offers(&pool, run.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn offer_name_can_be_rewritten(pool: sqlx::PgPool) {
    let s = insert_showcase(&pool, "A", "https://a.example/").await.unwrap();
    let run = create_parsing_run(&pool, s.id, None).await.unwrap();
    append_offer(&pool, run.id, 1, &offer("Offer", "https://aff.example/1"))
        .await
        .unwrap();

    let row = &list_run_offers(&pool, run.id).await.unwrap()[0];
    update_offer_name(&pool, row.id, "Займер").await.unwrap();
    let rows = list_run_offers(&pool, run.id).await.unwrap();
    assert_eq!(rows[0].company_name, "Займер");
}

// ---------------------------------------------------------------------------
// review queue and logos
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn repeated_unknown_sightings_bump_the_counter(pool: sqlx::PgPool) {
    let s = insert_showcase(&pool, "A", "https://a.example/").await.unwrap();
    for _ in 0..3 {
        upsert_unknown(&pool, "abc123", "странный лейбл", "https://x.example/1", s.id)
            .await
            .unwrap();
    }
    let (count, label): (i32, String) = sqlx::query_as(
        "SELECT seen_count, raw_label FROM unknown_brands WHERE dedup_key = $1",
    )
    .bind("abc123")
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 3);
    assert_eq!(label, "странный лейбл");
}

#[sqlx::test(migrations = "../../migrations")]
async fn newer_logo_replaces_the_stored_one(pool: sqlx::PgPool) {
    upsert_logo(&pool, "Займер", "https://cdn.example/v1.png", Some("a.example"))
        .await
        .unwrap();
    upsert_logo(&pool, "Займер", "https://cdn.example/v2.png", Some("b.example"))
        .await
        .unwrap();

    let (url, domain): (String, Option<String>) = sqlx::query_as(
        "SELECT image_url, source_domain FROM brand_logos WHERE brand_name = $1",
    )
    .bind("Займер")
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(url, "https://cdn.example/v2.png");
    assert_eq!(domain.as_deref(), Some("b.example"));
}
