//! Seeding of showcases from a YAML file.

use anyhow::Context;
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
struct SeedSite {
    name: String,
    url: String,
}

/// Reads a YAML list of `{ name, url }` entries and upserts them as
/// showcases. Returns the number of newly inserted rows.
pub async fn seed_from_file(pool: &PgPool, path: &str) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {path}"))?;
    let sites: Vec<SeedSite> =
        serde_yaml::from_str(&raw).with_context(|| format!("failed to parse seed file {path}"))?;

    let pairs: Vec<(String, String)> = sites.into_iter().map(|s| (s.name, s.url)).collect();
    let inserted = vitrina_db::seed_showcases(pool, &pairs).await?;
    tracing::info!(inserted, total = pairs.len(), "seeded showcases");
    Ok(inserted)
}
