mod notify;
mod runner;
mod seed;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vitrina_core::{load_app_config, BrandRegistry, Lexicon};
use vitrina_scraper::HttpRenderer;

#[derive(Debug, Parser)]
#[command(name = "vitrina-cli")]
#[command(about = "Loan-offer showcase monitoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one showcase by id and persist the ranked offer list.
    Run {
        showcase_id: i64,
    },
    /// Run every active showcase and send the summary notification.
    RunAll,
    /// Re-run the offline refinement pass over a stored run's offer names.
    SecondStage {
        run_id: i64,
    },
    /// Insert showcases from a YAML file, skipping URLs already present.
    Seed {
        #[arg(default_value = "config/showcases.yaml")]
        file: String,
    },
    /// Apply pending database migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();

    let pool = vitrina_db::connect_pool(&config.database_url, vitrina_db::PoolConfig::from_env())
        .await?;

    match cli.command {
        Commands::Run { showcase_id } => {
            let registry = BrandRegistry::load(&config.brands_path)?;
            let lexicon = Lexicon::default();
            let renderer = HttpRenderer::new(
                config.nav_timeout_secs,
                config.redirect_timeout_secs,
                &config.user_agent,
            )?;
            let outcome =
                runner::run_showcase(&pool, &renderer, &registry, &lexicon, &config, showcase_id)
                    .await;
            match outcome {
                vitrina_core::RunOutcome::Success { count } => {
                    println!("showcase {showcase_id}: {count} offers");
                }
                vitrina_core::RunOutcome::Failure { error } => {
                    println!("showcase {showcase_id}: failed ({error})");
                    std::process::exit(1);
                }
            }
        }
        Commands::RunAll => {
            let registry = BrandRegistry::load(&config.brands_path)?;
            let lexicon = Lexicon::default();
            let renderer = HttpRenderer::new(
                config.nav_timeout_secs,
                config.redirect_timeout_secs,
                &config.user_agent,
            )?;
            let report = runner::run_all(&pool, &renderer, &registry, &lexicon, &config).await?;
            println!("{report}");
            notify::send_telegram_message(&config, &report).await;
        }
        Commands::SecondStage { run_id } => {
            let registry = BrandRegistry::load(&config.brands_path)?;
            let changed = runner::refine_stored_run(&pool, &registry, run_id).await?;
            println!("run {run_id}: {changed} names rewritten");
        }
        Commands::Seed { file } => {
            let inserted = seed::seed_from_file(&pool, &file).await?;
            println!("seeded {inserted} showcases from {file}");
        }
        Commands::Migrate => {
            vitrina_db::run_migrations(&pool).await?;
            println!("migrations applied");
        }
    }

    Ok(())
}
