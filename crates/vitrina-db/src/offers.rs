//! Database operations for `offer_stats`: the ranked time series of offer
//! positions, one row per (run, placement channel, position).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vitrina_core::ExtractedOffer;

use crate::DbError;

/// A row from the `offer_stats` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferRow {
    pub id: i64,
    pub run_id: i64,
    pub placement_type: String,
    pub position: i32,
    pub company_name: String,
    pub link: String,
    pub image_url: Option<String>,
    pub captured_at: DateTime<Utc>,
}

const OFFER_COLUMNS: &str =
    "id, run_id, placement_type, position, company_name, link, image_url, captured_at";

/// Appends one ranked offer observation to a run. `position` is 1-based
/// within the offer's placement channel.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a position
/// collision within the same run and channel).
pub async fn append_offer(
    pool: &PgPool,
    run_id: i64,
    position: i32,
    offer: &ExtractedOffer,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO offer_stats (run_id, placement_type, position, company_name, link, image_url) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(run_id)
    .bind(offer.placement.as_str())
    .bind(position)
    .bind(offer.label.display_name())
    .bind(&offer.link)
    .bind(&offer.image_url)
    .execute(pool)
    .await?;
    Ok(())
}

/// Lists a run's offers in channel-then-position order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_run_offers(pool: &PgPool, run_id: i64) -> Result<Vec<OfferRow>, DbError> {
    let rows = sqlx::query_as::<_, OfferRow>(&format!(
        "SELECT {OFFER_COLUMNS} FROM offer_stats \
         WHERE run_id = $1 ORDER BY placement_type, position"
    ))
    .bind(run_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Rewrites one stored offer's company name. Used by the offline refinement
/// pass when it upgrades or demotes a stored label.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the offer row does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_offer_name(pool: &PgPool, offer_id: i64, name: &str) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE offer_stats SET company_name = $2 WHERE id = $1")
        .bind(offer_id)
        .bind(name)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
