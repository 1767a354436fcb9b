//! CLI command implementations
//!
//! `push` and `pull` share everything except the direction; the wiring
//! and result display live here.

pub mod pull;
pub mod push;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use cumulus_core::config::Config;
use cumulus_core::domain::newtypes::NodePath;
use cumulus_sync::{
    DirMirrorStore, Direction, LocalTreeAdapter, SyncEngine, SyncOutcome,
};

use crate::output::{get_formatter, ConsolePresenter, OutputFormat};

/// Shared handler behind the push and pull commands
pub(crate) async fn run_sync(
    direction: Direction,
    path: Option<&str>,
    yes: bool,
    dry_run: bool,
    format: OutputFormat,
    config_path: Option<&Path>,
) -> Result<()> {
    let formatter = get_formatter(matches!(format, OutputFormat::Json));

    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);
    info!(config_path = %config_path.display(), "Loaded configuration");

    let scope = match path {
        Some(raw) => NodePath::new(raw.to_string()).context("Invalid sync path")?,
        None => NodePath::root(),
    };

    let local = Arc::new(LocalTreeAdapter::new(
        config.sync.root.clone(),
        config.sync.hidden_prefix.clone(),
    ));
    let remote = Arc::new(
        DirMirrorStore::open(config.sync.remote_root.clone())
            .await
            .context("Cannot open mirror store")?,
    );
    let engine = SyncEngine::new(local, remote, Arc::new(ConsolePresenter), &config);

    if dry_run {
        let resolution = engine.plan(direction, &scope).await?;
        for warning in &resolution.warnings {
            formatter.warn(warning);
        }
        if resolution.is_empty() {
            formatter.success("Everything is up-to-date");
            return Ok(());
        }
        if matches!(format, OutputFormat::Json) {
            let changes: Vec<serde_json::Value> = resolution
                .changes
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "op": c.op().to_string(),
                        "path": c.path().to_string(),
                    })
                })
                .collect();
            formatter.print_json(&serde_json::json!({ "changes": changes }));
        } else {
            for change in &resolution.changes {
                println!("{}", change);
            }
            formatter.info(&format!("{} change(s), none applied", resolution.changes.len()));
        }
        return Ok(());
    }

    let outcome = match direction {
        Direction::Push => engine.push(&scope, yes).await?,
        Direction::Pull => engine.pull(&scope, yes).await?,
    };

    match outcome {
        SyncOutcome::UpToDate => formatter.success("Everything is up-to-date"),
        SyncOutcome::Declined => formatter.info("Aborted, nothing changed"),
        SyncOutcome::Applied(report) => {
            if matches!(format, OutputFormat::Json) {
                let failed: Vec<serde_json::Value> = report
                    .failed
                    .iter()
                    .map(|f| {
                        serde_json::json!({
                            "op": f.op.to_string(),
                            "path": f.path.to_string(),
                            "error": f.error,
                        })
                    })
                    .collect();
                formatter.print_json(&serde_json::json!({
                    "applied": report.applied,
                    "failed": failed,
                    "duration_ms": report.duration_ms,
                }));
            } else {
                let duration_display = if report.duration_ms >= 1000 {
                    format!("{:.1}s", report.duration_ms as f64 / 1000.0)
                } else {
                    format!("{}ms", report.duration_ms)
                };
                if report.is_clean() {
                    formatter.success(&format!(
                        "Applied {} change{} in {}",
                        report.applied,
                        if report.applied == 1 { "" } else { "s" },
                        duration_display
                    ));
                } else {
                    formatter.error(&format!(
                        "{} of {} change(s) failed:",
                        report.failed.len(),
                        report.applied as usize + report.failed.len()
                    ));
                    for failure in &report.failed {
                        formatter.info(&format!(
                            "{} {}: {}",
                            failure.op, failure.path, failure.error
                        ));
                    }
                }
            }
        }
    }

    Ok(())
}
