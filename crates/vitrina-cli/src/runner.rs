//! Run orchestration: one showcase end to end, and the batch entry point
//! over all active showcases.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use sqlx::PgPool;
use vitrina_core::{
    AppConfig, BrandLabel, BrandRegistry, ExtractedOffer, Lexicon, Normalizer, RunOutcome,
};
use vitrina_db::ShowcaseRow;
use vitrina_scraper::{
    extract_offers, refine, resolve_pending, unknown_fingerprint, Extraction, LocatorStrategy,
    PipelineConfig, Renderer, ScrapeError,
};

/// Runs one showcase: render, extract, resolve, refine, persist.
///
/// Always returns a structured outcome; failures are recorded as error runs
/// and never propagate as panics or errors past this boundary.
pub async fn run_showcase<R: Renderer>(
    pool: &PgPool,
    renderer: &R,
    registry: &BrandRegistry,
    lexicon: &Lexicon,
    config: &AppConfig,
    showcase_id: i64,
) -> RunOutcome {
    let showcase = match vitrina_db::get_showcase(pool, showcase_id).await {
        Ok(row) => row,
        Err(e) => {
            return RunOutcome::Failure {
                error: format!("showcase {showcase_id}: {e}"),
            };
        }
    };

    let normalizer = Normalizer::new(registry);
    let pipeline_config = PipelineConfig {
        custom_selector: showcase
            .custom_selector
            .clone()
            .filter(|s| !s.trim().is_empty()),
        strategy: Some(LocatorStrategy::parse(&showcase.strategy)),
    };

    tracing::info!(showcase_id, url = %showcase.url, "starting run");

    // Bounded retry on transient render failures; everything else is
    // terminal for the run.
    let mut attempt = 1u32;
    let mut extraction = loop {
        match attempt_extraction(renderer, &showcase.url, lexicon, &normalizer, &pipeline_config)
            .await
        {
            Ok(extraction) => break extraction,
            Err(e) if e.is_transient() && attempt < config.max_run_attempts.max(1) => {
                tracing::warn!(
                    showcase_id,
                    attempt,
                    error = %e,
                    "transient failure, retrying run"
                );
                attempt += 1;
            }
            Err(e) => {
                let error = e.to_string();
                if let Err(db_err) =
                    vitrina_db::record_failed_run(pool, showcase.id, &error).await
                {
                    tracing::error!(showcase_id, error = %db_err, "failed to record error run");
                }
                return RunOutcome::Failure { error };
            }
        }
    };

    resolve_pending(renderer, &mut extraction.offers, &normalizer, lexicon).await;

    if config.second_stage_enabled {
        refine(&mut extraction.offers, &normalizer);
    }

    match persist_run(pool, &showcase, &extraction).await {
        Ok(()) => RunOutcome::Success {
            count: extraction.offers.len(),
        },
        Err(e) => RunOutcome::Failure {
            error: format!("persistence failed: {e}"),
        },
    }
}

/// One render-plus-extract attempt. The parsed DOM never crosses an await
/// point; extraction is fully synchronous once the HTML is in hand.
async fn attempt_extraction<R: Renderer>(
    renderer: &R,
    url: &str,
    lexicon: &Lexicon,
    normalizer: &Normalizer<'_>,
    pipeline_config: &PipelineConfig,
) -> Result<Extraction, ScrapeError> {
    let page = renderer.render(url).await?;
    extract_offers(&page.html, &page.final_url, lexicon, normalizer, pipeline_config)
}

/// Writes the run row, its ranked offers, unknown-brand records, and logo
/// updates. The run is created `pending` and marked `success` only after
/// every offer row is in; a partial write leaves it marked `error`.
async fn persist_run(
    pool: &PgPool,
    showcase: &ShowcaseRow,
    extraction: &Extraction,
) -> Result<(), vitrina_db::DbError> {
    let run = vitrina_db::create_parsing_run(pool, showcase.id, None).await?;

    if let Err(e) = persist_run_contents(pool, showcase, run.id, extraction).await {
        if let Err(mark_err) = vitrina_db::mark_run_failed(pool, run.id, &e.to_string()).await {
            tracing::error!(
                showcase_id = showcase.id,
                run_id = run.id,
                error = %mark_err,
                "failed to mark partial run as error"
            );
        }
        return Err(e);
    }

    vitrina_db::mark_run_succeeded(pool, run.id).await?;
    tracing::info!(
        showcase_id = showcase.id,
        run_id = run.id,
        count = extraction.offers.len(),
        method = extraction.method.map(|m| m.as_str()),
        "run persisted"
    );
    Ok(())
}

async fn persist_run_contents(
    pool: &PgPool,
    showcase: &ShowcaseRow,
    run_id: i64,
    extraction: &Extraction,
) -> Result<(), vitrina_db::DbError> {
    if let Some(method) = extraction.method {
        vitrina_db::set_run_method(pool, run_id, method.as_str()).await?;
    }

    // Positions are 1-based and independent per placement channel.
    let mut channel_positions: HashMap<String, i32> = HashMap::new();
    for offer in &extraction.offers {
        let counter = channel_positions
            .entry(offer.placement.as_str().to_string())
            .or_insert(0);
        *counter += 1;
        vitrina_db::append_offer(pool, run_id, *counter, offer).await?;
    }

    let source_domain = reqwest::Url::parse(&showcase.url)
        .ok()
        .and_then(|u| u.host_str().map(String::from));

    for offer in &extraction.offers {
        match &offer.label {
            BrandLabel::Resolved(brand) => {
                if let Some(image_url) = &offer.image_url {
                    vitrina_db::upsert_logo(pool, brand, image_url, source_domain.as_deref())
                        .await?;
                }
            }
            label => {
                let raw = label.display_name();
                let key = unknown_fingerprint(raw, &offer.link);
                vitrina_db::upsert_unknown(pool, &key, raw, &offer.link, showcase.id).await?;
            }
        }
    }
    Ok(())
}

/// Runs every active showcase with bounded concurrency and formats the
/// summary report.
pub async fn run_all<R: Renderer>(
    pool: &PgPool,
    renderer: &R,
    registry: &BrandRegistry,
    lexicon: &Lexicon,
    config: &AppConfig,
) -> anyhow::Result<String> {
    let showcases = vitrina_db::list_active_showcases(pool).await?;
    let max_concurrent = config.max_concurrent_showcases.max(1);

    let results: Vec<(String, RunOutcome)> = stream::iter(showcases)
        .map(|showcase| async move {
            let outcome =
                run_showcase(pool, renderer, registry, lexicon, config, showcase.id).await;
            (showcase.name, outcome)
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

    Ok(format_report(&results))
}

/// The batch summary sent as a notification after `run-all`.
fn format_report(results: &[(String, RunOutcome)]) -> String {
    let date = chrono::Utc::now().format("%Y-%m-%d");
    let mut report = format!("<b>📊 Ежедневный отчет парсинга</b>\nДата: {date}\n\n");
    for (name, outcome) in results {
        match outcome {
            RunOutcome::Success { count } => {
                report.push_str(&format!("✅ {name}: Найдено {count} офферов\n"));
            }
            RunOutcome::Failure { error } => {
                report.push_str(&format!("❌ {name}: Ошибка ({error})\n"));
            }
        }
    }
    report
}

/// Re-runs the offline refinement over a stored run's offer names and
/// rewrites the rows that changed. Returns the number of rewritten rows.
pub async fn refine_stored_run(
    pool: &PgPool,
    registry: &BrandRegistry,
    run_id: i64,
) -> anyhow::Result<usize> {
    let rows = vitrina_db::list_run_offers(pool, run_id).await?;
    let normalizer = Normalizer::new(registry);

    let mut changed = 0usize;
    for row in rows {
        let mut offers = [ExtractedOffer {
            label: stored_label(registry, &row.company_name),
            link: row.link.clone(),
            image_url: row.image_url.clone(),
            placement: vitrina_core::Placement::parse(&row.placement_type),
        }];
        refine(&mut offers, &normalizer);

        let new_name = offers[0].label.display_name();
        if new_name != row.company_name {
            vitrina_db::update_offer_name(pool, row.id, new_name).await?;
            tracing::info!(
                run_id,
                offer_id = row.id,
                old = %row.company_name,
                new = %new_name,
                "offer name rewritten"
            );
            changed += 1;
        }
    }
    Ok(changed)
}

/// Reconstructs a label's state from its stored display name.
fn stored_label(registry: &BrandRegistry, name: &str) -> BrandLabel {
    if registry.is_canonical(name) {
        BrandLabel::Resolved(name.to_string())
    } else if name == vitrina_core::label::PENDING_SENTINEL {
        BrandLabel::pending_empty()
    } else if name == vitrina_core::label::UNRESOLVED_SENTINEL {
        BrandLabel::Unresolved
    } else {
        BrandLabel::Pending(name.to_string())
    }
}
