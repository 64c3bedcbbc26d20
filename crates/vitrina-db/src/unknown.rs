//! Database operations for `unknown_brands`: the manual-review queue of
//! labels no resolution tactic could attribute.

use sqlx::PgPool;

use crate::DbError;

/// Upserts an unresolved label into the review queue.
///
/// `dedup_key` is the caller-computed fingerprint over (raw label, link);
/// repeated sightings bump the counter instead of growing the queue.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_unknown(
    pool: &PgPool,
    dedup_key: &str,
    raw_label: &str,
    link: &str,
    showcase_id: i64,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO unknown_brands (dedup_key, raw_label, link, showcase_id) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (dedup_key) DO UPDATE \
         SET seen_count = unknown_brands.seen_count + 1, last_seen_at = NOW()",
    )
    .bind(dedup_key)
    .bind(raw_label)
    .bind(link)
    .bind(showcase_id)
    .execute(pool)
    .await?;
    Ok(())
}
