//! Database operations for `brand_logos`: the best-known logo per canonical
//! brand, refreshed opportunistically from successful runs.

use sqlx::PgPool;

use crate::DbError;

/// Upserts a brand's logo, keyed by canonical name. A newer sighting always
/// replaces the stored one.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_logo(
    pool: &PgPool,
    brand_name: &str,
    image_url: &str,
    source_domain: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO brand_logos (brand_name, image_url, source_domain) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (brand_name) DO UPDATE \
         SET image_url = EXCLUDED.image_url, \
             source_domain = EXCLUDED.source_domain, \
             updated_at = NOW()",
    )
    .bind(brand_name)
    .bind(image_url)
    .bind(source_domain)
    .execute(pool)
    .await?;
    Ok(())
}
