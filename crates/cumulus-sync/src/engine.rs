//! Sync engine facade
//!
//! [`SyncEngine`] wires the resolver, presenter and orchestrator into the
//! resolve / present / apply sequence that both directions share. Until
//! the presenter accepts, nothing on either side has been mutated;
//! resolution is strictly read-only.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, instrument, warn};

use cumulus_core::config::Config;
use cumulus_core::domain::newtypes::NodePath;
use cumulus_core::ports::local_tree::ILocalTree;
use cumulus_core::ports::presenter::IChangePresenter;
use cumulus_core::ports::remote_store::IRemoteStore;

use crate::applier::{IChangeApplier, PullApplier, PushApplier};
use crate::orchestrator::{ApplyReport, TaskOrchestrator};
use crate::resolver::{ChangeResolver, Direction, Resolution};

/// Terminal outcome of a sync invocation
#[derive(Debug)]
pub enum SyncOutcome {
    /// Both trees already agree; nothing was presented or applied
    UpToDate,
    /// The user declined the change list; nothing was mutated
    Declined,
    /// The change list was applied; the report carries the tally
    Applied(ApplyReport),
}

/// Resolve / present / apply facade over the two sync directions
pub struct SyncEngine {
    local: Arc<dyn ILocalTree>,
    remote: Arc<dyn IRemoteStore>,
    presenter: Arc<dyn IChangePresenter>,
    max_concurrent: usize,
}

impl SyncEngine {
    /// Creates an engine over the given adapters
    pub fn new(
        local: Arc<dyn ILocalTree>,
        remote: Arc<dyn IRemoteStore>,
        presenter: Arc<dyn IChangePresenter>,
        config: &Config,
    ) -> Self {
        Self {
            local,
            remote,
            presenter,
            max_concurrent: config.apply.max_concurrent,
        }
    }

    /// Resolves the change list for a direction without applying anything
    ///
    /// This is the read-only half of a sync, usable on its own for
    /// dry runs.
    pub async fn plan(&self, direction: Direction, path: &NodePath) -> Result<Resolution> {
        let resolver = ChangeResolver::new(
            Arc::clone(&self.local),
            Arc::clone(&self.remote),
            direction,
        );
        resolver.resolve(path).await
    }

    /// Pushes the subtree at `path`: local is authoritative
    #[instrument(skip(self), fields(path = %path))]
    pub async fn push(&self, path: &NodePath, no_prompt: bool) -> Result<SyncOutcome> {
        let applier = Arc::new(PushApplier::new(
            Arc::clone(&self.local),
            Arc::clone(&self.remote),
        ));
        self.run(Direction::Push, path, no_prompt, applier).await
    }

    /// Pulls the subtree at `path`: remote is authoritative
    #[instrument(skip(self), fields(path = %path))]
    pub async fn pull(&self, path: &NodePath, no_prompt: bool) -> Result<SyncOutcome> {
        let applier = Arc::new(PullApplier::new(
            Arc::clone(&self.local),
            Arc::clone(&self.remote),
        ));
        self.run(Direction::Pull, path, no_prompt, applier).await
    }

    async fn run(
        &self,
        direction: Direction,
        path: &NodePath,
        no_prompt: bool,
        applier: Arc<dyn IChangeApplier>,
    ) -> Result<SyncOutcome> {
        let resolution = self.plan(direction, path).await?;

        for warning in &resolution.warnings {
            warn!(warning = %warning, "Resolution warning");
        }

        if resolution.is_empty() {
            info!(path = %path, "Everything is up-to-date");
            return Ok(SyncOutcome::UpToDate);
        }

        info!(
            path = %path,
            changes = resolution.changes.len(),
            "Resolved change list"
        );

        if !self.presenter.present(&resolution.changes, no_prompt) {
            info!("Change list declined; aborting with no mutations");
            return Ok(SyncOutcome::Declined);
        }

        let orchestrator = TaskOrchestrator::new(applier, self.max_concurrent);
        let report = orchestrator.apply_all(resolution.changes).await;
        Ok(SyncOutcome::Applied(report))
    }
}
