use anyhow::Result;
use clap::Parser;
use pagesmith::cli::{Cli, Command};
use pagesmith::config::Config;
use pagesmith::cycle::{CycleDriver, CycleGuard, CycleOptions, RewriteMode, Target};
use pagesmith::engine::OpenAiEngine;
use pagesmith::gateway::{self, AppState};
use pagesmith::prompt::PromptBuilder;
use pagesmith::scheduler;
use pagesmith::wordpress::WpClient;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present, before config reads the environment.
    if std::path::Path::new(".env").exists() {
        dotenvy::from_path(".env")?;
    }

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let config = Config::load_or_init()?;
    config.validate()?;

    match cli.command {
        Command::Serve => serve(config).await,
        Command::Run {
            target,
            dry_run,
            mode,
            language,
        } => run_once(config, target, dry_run, mode, language).await,
    }
}

fn build_driver(config: &Config) -> Result<Arc<CycleDriver>> {
    let source = Arc::new(WpClient::new(&config.wordpress));
    let engine = Arc::new(OpenAiEngine::new(&config.engine));
    let prompts = Arc::new(PromptBuilder::new(&config.templates)?);
    Ok(Arc::new(CycleDriver::new(source, engine, prompts)))
}

async fn serve(config: Config) -> Result<()> {
    let config = Arc::new(config);
    let driver = build_driver(&config)?;
    let guard = CycleGuard::new();

    let options = CycleOptions {
        mode: config.rewrite.mode,
        language: config.rewrite.language.clone(),
        dry_run: false,
    };
    tokio::spawn(scheduler::run(
        config.schedule.clone(),
        config.targets.clone(),
        options,
        Arc::clone(&driver),
        guard.clone(),
    ));

    gateway::run_gateway(AppState {
        config,
        driver,
        guard,
    })
    .await
}

async fn run_once(
    config: Config,
    target: Option<u64>,
    dry_run: bool,
    mode: Option<RewriteMode>,
    language: Option<String>,
) -> Result<()> {
    let driver = build_driver(&config)?;

    let targets: Vec<Target> = match target {
        Some(id) => vec![
            config
                .targets
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no configured target with id {id}"))?,
        ],
        None => config.targets.clone(),
    };

    let options = CycleOptions {
        mode: mode.unwrap_or(config.rewrite.mode),
        language: language.or_else(|| config.rewrite.language.clone()),
        dry_run,
    };

    let report = driver.run_cycle(&targets, &options).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.all_succeeded() {
        anyhow::bail!(
            "{} of {} targets failed",
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(())
}
