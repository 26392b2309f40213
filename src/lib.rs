// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{CliArgs, Command};
use crate::config::{Settings, load_settings};
use crate::engine::{Observer, Orchestrator, TracingObserver};
use crate::exec::{CommandSpec, Commander};
use crate::fs::RealFileSystem;
use crate::watch::{TreeWatcher, WatchOptions, WatchedTree};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI flags)
/// - the command chain and the reload loop
/// - the file watcher (unless `--once`)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    if let Some(Command::Version) = args.command {
        print_version();
        return Ok(());
    }

    let base_dir = std::env::current_dir().context("cannot determine working directory")?;
    let settings = load_settings(&args.config_source(), args.overrides(), &base_dir, &RealFileSystem)?;

    if args.dry_run {
        print_dry_run(&settings)?;
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    let ctrl_c = spawn_ctrl_c(shutdown.clone());

    let result = serve(&settings, shutdown.clone()).await;

    shutdown.cancel();
    if let Err(e) = ctrl_c.await {
        warn!(error = %e, "interrupt listener did not finish cleanly");
    }
    result
}

/// Run the chain once or drive the reload loop until `shutdown` fires.
async fn serve(settings: &Settings, shutdown: CancellationToken) -> Result<()> {
    let observer: Arc<dyn Observer> = Arc::new(TracingObserver);
    let commander = Commander::new(settings.exec.clone(), settings.exit_on_err, observer.clone())
        .with_parse_error_policy(settings.on_parse_error);
    let orchestrator = Orchestrator::new(commander, settings.delay, observer);

    if settings.once {
        orchestrator.run_once(shutdown).await;
        return Ok(());
    }

    let watcher = TreeWatcher::new(&watch_options(settings))?;
    let (events, handle) = watcher.watch(shutdown.clone());

    orchestrator.run(events, shutdown).await;
    handle.close().await?;
    Ok(())
}

fn watch_options(settings: &Settings) -> WatchOptions {
    WatchOptions {
        root: settings.root.clone(),
        exclude: settings.exclude.clone(),
        filters: settings.filters.clone(),
        base_dir: settings.base_dir.clone(),
    }
}

/// Ctrl-C → cancel everything.
///
/// The task ends on its own once `shutdown` is cancelled, so the caller
/// cancels and then awaits the handle.
fn spawn_ctrl_c(shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            res = tokio::signal::ctrl_c() => match res {
                Ok(()) => info!("interrupt received; shutting down"),
                Err(e) => warn!(error = %e, "failed to listen for Ctrl+C"),
            },
            _ = shutdown.cancelled() => return,
        }
        shutdown.cancel();
    })
}

fn print_version() {
    println!(
        "{} {}\n{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_DESCRIPTION")
    );
}

/// Print the resolved settings and what would be watched and run.
fn print_dry_run(settings: &Settings) -> Result<()> {
    println!("leaf dry-run");
    println!("  root = {}", settings.root.display());
    println!("  delay = {:?}", settings.delay);
    println!("  exit_on_err = {}", settings.exit_on_err);
    println!("  once = {}", settings.once);
    println!("  on_parse_error = {:?}", settings.on_parse_error);
    if !settings.exclude.is_empty() {
        println!("  exclude: {:?}", settings.exclude);
    }
    if !settings.filters.is_empty() {
        println!("  filters: {:?}", settings.filters);
    }
    println!();

    println!("commands ({}):", settings.exec.len());
    for line in &settings.exec {
        match CommandSpec::parse(line) {
            Ok(spec) => println!("  - {spec}"),
            Err(e) => println!("  - {line}  (error: {e})"),
        }
    }

    if !settings.once {
        let tree = WatchedTree::scan(&RealFileSystem, &settings.root, &settings.exclude, &settings.base_dir)?;
        println!();
        println!("watching {} directories under {}", tree.dirs().len(), tree.root().display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn interrupt_listener_ends_with_shutdown() {
        let shutdown = CancellationToken::new();
        let listener = spawn_ctrl_c(shutdown.clone());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!listener.is_finished());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), listener)
            .await
            .expect("listener should stop after shutdown")
            .unwrap();
    }
}
