//! Database operations for the `showcases` table: the operator-maintained
//! list of monitored showcase sites and their per-site pipeline settings.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `showcases` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShowcaseRow {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub is_active: bool,
    /// Operator selector override; plain CSS or a pasted card HTML snippet.
    pub custom_selector: Option<String>,
    /// Locator strategy tag ("auto", "selector-only", "pattern-cluster").
    pub strategy: String,
    pub created_at: DateTime<Utc>,
}

const SHOWCASE_COLUMNS: &str = "id, url, name, is_active, custom_selector, strategy, created_at";

/// Fetches one showcase by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no showcase has that id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_showcase(pool: &PgPool, id: i64) -> Result<ShowcaseRow, DbError> {
    sqlx::query_as::<_, ShowcaseRow>(&format!(
        "SELECT {SHOWCASE_COLUMNS} FROM showcases WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Lists all active showcases in creation order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_showcases(pool: &PgPool) -> Result<Vec<ShowcaseRow>, DbError> {
    let rows = sqlx::query_as::<_, ShowcaseRow>(&format!(
        "SELECT {SHOWCASE_COLUMNS} FROM showcases WHERE is_active = TRUE ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Inserts a showcase, ignoring duplicates by URL. Returns the row whether it
/// was inserted now or already present.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or fetch fails.
pub async fn insert_showcase(pool: &PgPool, name: &str, url: &str) -> Result<ShowcaseRow, DbError> {
    sqlx::query(
        "INSERT INTO showcases (name, url) VALUES ($1, $2) \
         ON CONFLICT (url) DO NOTHING",
    )
    .bind(name)
    .bind(url)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, ShowcaseRow>(&format!(
        "SELECT {SHOWCASE_COLUMNS} FROM showcases WHERE url = $1"
    ))
    .bind(url)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Toggles a showcase's active flag.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no showcase has that id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_showcase_active(pool: &PgPool, id: i64, active: bool) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE showcases SET is_active = $2 WHERE id = $1")
        .bind(id)
        .bind(active)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Updates a showcase's custom selector and strategy tag.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no showcase has that id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_showcase_selector(
    pool: &PgPool,
    id: i64,
    custom_selector: Option<&str>,
    strategy: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE showcases SET custom_selector = $2, strategy = $3 WHERE id = $1",
    )
    .bind(id)
    .bind(custom_selector)
    .bind(strategy)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
