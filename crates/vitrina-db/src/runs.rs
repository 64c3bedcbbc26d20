//! Database operations for `parsing_runs`: one row per attempted showcase
//! run, successful or not.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `parsing_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParsingRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub showcase_id: i64,
    pub status: String,
    /// Human-readable provenance of the extraction ("DOM (Cluster Match)",
    /// "JSON", ...); set after the pipeline finishes.
    pub parsing_method: Option<String>,
    pub screenshot_path: Option<String>,
    pub error_message: Option<String>,
    pub run_date: DateTime<Utc>,
}

const RUN_COLUMNS: &str =
    "id, public_id, showcase_id, status, parsing_method, screenshot_path, error_message, run_date";

/// Creates a run row in the `pending` state. Offers are appended to it and
/// the outcome is marked afterwards; a run left `pending` means persistence
/// died partway and its offer list must not be trusted.
///
/// Generates a UUID in Rust and binds it to `public_id`. Returns the full
/// newly-created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_parsing_run(
    pool: &PgPool,
    showcase_id: i64,
    screenshot_path: Option<&str>,
) -> Result<ParsingRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, ParsingRunRow>(&format!(
        "INSERT INTO parsing_runs (public_id, showcase_id, status, screenshot_path) \
         VALUES ($1, $2, 'pending', $3) \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(public_id)
    .bind(showcase_id)
    .bind(screenshot_path)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as successfully completed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn mark_run_succeeded(pool: &PgPool, run_id: i64) -> Result<(), DbError> {
    sqlx::query("UPDATE parsing_runs SET status = 'success' WHERE id = $1")
        .bind(run_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Marks an already-created run as failed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn mark_run_failed(
    pool: &PgPool,
    run_id: i64,
    error_message: &str,
) -> Result<(), DbError> {
    sqlx::query("UPDATE parsing_runs SET status = 'error', error_message = $2 WHERE id = $1")
        .bind(run_id)
        .bind(error_message)
        .execute(pool)
        .await?;
    Ok(())
}

/// Records which extraction tactic produced the run's offers.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn set_run_method(pool: &PgPool, run_id: i64, method: &str) -> Result<(), DbError> {
    sqlx::query("UPDATE parsing_runs SET parsing_method = $2 WHERE id = $1")
        .bind(run_id)
        .bind(method)
        .execute(pool)
        .await?;
    Ok(())
}

/// Records a terminal run failure. No offers are written for such a run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn record_failed_run(
    pool: &PgPool,
    showcase_id: i64,
    error_message: &str,
) -> Result<ParsingRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, ParsingRunRow>(&format!(
        "INSERT INTO parsing_runs (public_id, showcase_id, status, error_message) \
         VALUES ($1, $2, 'error', $3) \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(public_id)
    .bind(showcase_id)
    .bind(error_message)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
