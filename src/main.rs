//! filemon: watch directories and feed changes to a search index.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use filemon::config::Settings;
use filemon::plugin::PluginRegistry;
use filemon::watcher::FileMonitor;
use filemon::{log_event, logging};

#[derive(Parser)]
#[command(name = "filemon", version)]
#[command(about = "Watch directories and notify the indexing API about changed files")]
struct Cli {
    /// Files or directories to watch
    paths: Vec<PathBuf>,

    /// Config file (default: /etc/filemon/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File listing additional paths to watch, one per line
    #[arg(short = 'f', long = "from-file")]
    from_file: Option<PathBuf>,

    /// Print debug messages
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings =
        Settings::load(cli.config.as_deref()).context("failed to load configuration")?;
    if cli.verbose {
        settings.logging.default = "debug".to_string();
    }
    logging::init_with_config(&settings.logging);

    for name in &settings.plugins {
        tracing::debug!("configured plugin: {name}");
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log_event!("main", "shutdown requested");
                cancel.cancel();
            }
        });
    }

    let mut monitor = FileMonitor::builder()
        .settings(settings)
        .registry(PluginRegistry::with_builtins())
        .cancel(cancel)
        .build()
        .context("failed to initialize the file monitor")?;

    let mut watched = 0;
    for path in &cli.paths {
        match monitor.watch_path(path) {
            Ok(()) => watched += 1,
            Err(e) => tracing::warn!("{e}"),
        }
    }
    if let Some(list) = &cli.from_file {
        watched += monitor
            .watch_paths_from_file(list)
            .context("failed to read the watch list")?;
    }

    if watched == 0 {
        anyhow::bail!("nothing to watch: pass paths on the command line or via --from-file");
    }

    monitor.watch().await.context("monitor stopped")?;
    Ok(())
}
