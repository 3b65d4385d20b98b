mod db;
mod models;
mod processor;
mod trace;
mod types;
mod writeback;

use std::collections::HashSet;
use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use db::DbPool;
use processor::Processor;
use trace::{TraceWatcher, WatcherError};
use types::config::chain::ChainConfig;
use types::config::listener::{ListenerConfig, CONFIG_PATH_ENV_VAR, DEFAULT_CONFIG_PATH};
use writeback::{run_writeback, LogSink, Sink};

/// Writeback batches are one per block, so a short queue is enough to let
/// the processor run ahead of the database.
const WRITEBACK_CHANNEL_CAPACITY: usize = 16;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");

    let config_path =
        env::var(CONFIG_PATH_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = ListenerConfig::load(Path::new(&config_path))?;

    tracing::info!("Loaded config with {} chain(s)", config.chains.len());

    // Module lists are checked for every chain before anything starts.
    let mut pipelines = Vec::with_capacity(config.chains.len());
    for chain in &config.chains {
        let processor = Processor::new(chain.name.clone(), chain.processors_enabled.as_deref())
            .with_context(|| format!("invalid module list for chain {}", chain.name))?;
        pipelines.push((chain.clone(), processor));
    }

    let sink: Arc<dyn Sink> = if dry_run {
        tracing::info!("Running in dry-run mode (writeback is logged, not executed)");
        Arc::new(LogSink)
    } else {
        load_required_env_vars(&config)?;
        let db = &config.database;
        let database_url = env::var(&db.database_url_env_var)
            .with_context(|| format!("env var {} not set", db.database_url_env_var))?;

        let pool = DbPool::new(&database_url, db.pool_size)
            .await
            .context("failed to create database pool")?;

        let mut seen = HashSet::new();
        let schemas: Vec<String> = pipelines
            .iter()
            .flat_map(|(_, processor)| processor.migrations())
            .filter(|schema| seen.insert(schema.clone()))
            .collect();
        pool.run_migrations(&schemas)
            .await
            .context("failed to run database migrations")?;

        tracing::info!("Database pool initialized and migrations complete");
        Arc::new(pool)
    };

    let mut tasks: JoinSet<anyhow::Result<()>> = JoinSet::new();
    for (chain, processor) in pipelines {
        spawn_chain(
            &mut tasks,
            chain,
            processor,
            sink.clone(),
            config.database.max_params,
        );
    }

    while let Some(result) = tasks.join_next().await {
        result.context("pipeline task panicked")??;
    }

    tracing::info!("All chains stopped");
    Ok(())
}

/// Ensures the database URL env var is set, loading .env if needed.
fn load_required_env_vars(config: &ListenerConfig) -> anyhow::Result<()> {
    let var = config.database.database_url_env_var.as_str();
    if env::var(var).is_ok() {
        return Ok(());
    }

    dotenvy::dotenv()
        .with_context(|| format!("Missing env var {} and failed to load .env file", var))?;

    anyhow::ensure!(
        env::var(var).is_ok(),
        "Missing required env var after loading .env: {}",
        var
    );

    Ok(())
}

/// Spawn the watcher, error supervisor, processor and writer of one chain.
fn spawn_chain(
    tasks: &mut JoinSet<anyhow::Result<()>>,
    chain: ChainConfig,
    processor: Processor,
    sink: Arc<dyn Sink>,
    max_params: usize,
) {
    tracing::info!(
        "Starting chain {} on {} with modules {:?}",
        chain.name,
        chain.trace_path.display(),
        processor.module_names()
    );

    let (ops_tx, ops_rx) = mpsc::channel(chain.channel_capacity);
    let (error_tx, mut error_rx) = mpsc::channel::<WatcherError>(1);
    let (writeback_tx, writeback_rx) = mpsc::channel(WRITEBACK_CHANNEL_CAPACITY);

    let watcher = TraceWatcher::new(chain.trace_path.clone(), chain.watched_ops(), ops_tx, error_tx)
        .with_poll_interval(chain.poll_interval());

    tasks.spawn(async move {
        watcher.watch().await;
        Ok(())
    });

    tasks.spawn({
        let name = chain.name.clone();
        async move {
            match error_rx.recv().await {
                Some(e) => Err(anyhow::Error::new(e)
                    .context(format!("trace watcher failed for chain {}", name))),
                None => Ok(()),
            }
        }
    });

    tasks.spawn({
        let name = chain.name.clone();
        async move {
            processor
                .run(ops_rx, writeback_tx)
                .await
                .with_context(|| format!("processor failed for chain {}", name))
        }
    });

    tasks.spawn({
        let name = chain.name;
        async move {
            run_writeback(sink, writeback_rx, max_params)
                .await
                .with_context(|| format!("writeback failed for chain {}", name))
        }
    });
}
