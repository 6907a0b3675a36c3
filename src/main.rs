use anyhow::{bail, Context, Result};
use callintel_core::{AppConfig, BackendId, SidecarDirectorySource};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "callintel",
    about = "Compare language-model backends on call-intelligence extraction"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Directory of transcript sidecars (overrides [source].dir)
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Report output path (overrides [report].path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only compare these backends, e.g. `--backends fast,deep`
    #[arg(long, value_delimiter = ',')]
    backends: Vec<BackendId>,

    /// Transcript ids to compare; every sidecar in the source dir when omitted
    ids: Vec<String>,
}

fn path_table(path: &Path) -> toml::Value {
    let mut table = toml::map::Map::new();
    table.insert(
        "path".to_string(),
        toml::Value::String(path.to_string_lossy().into_owned()),
    );
    toml::Value::Table(table)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;
    if let Some(dir) = cli.source_dir {
        config.source.dir = dir;
    }
    if let Some(output) = cli.output {
        config.report.path = output;
    }

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false),
    );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!("callintel starting");

    let registry = callintel_backend::BackendRegistry::new();
    let mut invoker = callintel_backend::ModelInvoker::new();

    for backend_cfg in config.enabled_backends() {
        if !cli.backends.is_empty() && !cli.backends.contains(&backend_cfg.id) {
            tracing::debug!(backend = %backend_cfg.id, "not requested, skipping");
            continue;
        }
        invoker
            .add_backend(
                backend_cfg.id,
                &backend_cfg.plugin,
                backend_cfg.timeout(),
                backend_cfg.options.clone(),
                &registry,
            )
            .await
            .with_context(|| {
                format!(
                    "failed to add backend '{}' with plugin '{}'",
                    backend_cfg.id, backend_cfg.plugin
                )
            })?;
        tracing::info!(
            "backend '{}' → plugin '{}' (timeout {}s)",
            backend_cfg.id,
            backend_cfg.plugin,
            backend_cfg.timeout_seconds,
        );
    }

    let backend_ids = invoker.backend_ids();
    if backend_ids.is_empty() {
        bail!("no enabled backends to compare");
    }
    if backend_ids.len() < 2 {
        tracing::warn!("only one backend enabled; every comparison will have a single candidate");
    }

    invoker.load_all().await;
    let invoker = Arc::new(invoker);

    let engine = callintel_compare::ComparisonEngine::new(
        Arc::clone(&invoker),
        Arc::new(callintel_extract::StructuredExtractor::new()),
        &config.comparison,
    );
    let source = Arc::new(SidecarDirectorySource::new(&config.source.dir));
    let runner = callintel_compare::BatchRunner::new(source, engine, backend_ids);

    let entries = if cli.ids.is_empty() {
        tracing::info!("reading transcripts from {:?}", config.source.dir);
        runner
            .run_all()
            .await
            .with_context(|| format!("failed to list transcripts in {:?}", config.source.dir))?
    } else {
        runner.run(&cli.ids).await
    };

    let report = callintel_report::ReportEmitter::new().emit(&entries);

    let mut publisher = callintel_report::ReportPublisher::new();
    publisher
        .add_sink("json_file", path_table(&config.report.path))
        .await
        .context("failed to set up report file")?;
    if let Some(ref history) = config.report.history_path {
        publisher
            .add_sink("history", path_table(history))
            .await
            .context("failed to set up report history")?;
    }
    let published = publisher.publish(&report).await;

    let summary = &report.summary;
    tracing::info!(
        total = summary.total,
        ties = summary.ties,
        skipped = summary.skipped,
        "wins: {:?}",
        summary.wins,
    );
    tracing::info!("recommendation: {}", summary.recommendation_text);

    tracing::info!("shutting down");
    invoker.shutdown().await;
    publisher.shutdown().await;

    published.context("failed to write comparison report")?;
    Ok(())
}
