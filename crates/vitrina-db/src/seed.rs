//! Seeding of the operator's showcase list.

use sqlx::PgPool;

use crate::DbError;

/// Upserts showcases by URL inside a single transaction; existing rows are
/// left untouched. Returns the number of rows actually inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; the batch is rolled back.
pub async fn seed_showcases(pool: &PgPool, sites: &[(String, String)]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0usize;

    for (name, url) in sites {
        let result = sqlx::query(
            "INSERT INTO showcases (name, url) VALUES ($1, $2) \
             ON CONFLICT (url) DO NOTHING",
        )
        .bind(name)
        .bind(url)
        .execute(&mut *tx)
        .await?;
        inserted += usize::try_from(result.rows_affected()).unwrap_or(0);
    }

    tx.commit().await?;
    Ok(inserted)
}
