//! Task orchestration and progress tracking
//!
//! The [`TaskOrchestrator`] consumes a resolved change list exactly once:
//! it normalizes Modify identities, dispatches each change to an applier,
//! and records per-change outcomes without ever halting siblings on a
//! failure. The shared [`ProgressTracker`] is the only state touched from
//! multiple tasks and is atomic throughout.
//!
//! ## Dispatch phases
//!
//! 1. Deletes, sequentially in list order - a type-conflict Delete must
//!    land before the Add that replaces it at the same path.
//! 2. Directory Adds, sequentially in list order - parents before children.
//! 3. Everything else (file Adds, Modifies) on a bounded task set.
//!
//! Phases only encode the two structural dependencies above; changes
//! within phase 3 are independent and may complete in any order.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use cumulus_core::domain::change::{Change, ChangeOp};
use cumulus_core::domain::newtypes::NodePath;

use crate::applier::IChangeApplier;

// ============================================================================
// ProgressTracker
// ============================================================================

/// Point-in-time view of a tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Changes not yet completed
    pub pending: u32,
    /// Changes completed successfully
    pub succeeded: u32,
    /// Changes completed with a failure
    pub failed: u32,
}

/// Synchronized pending/succeeded/failed counters for one invocation
///
/// Completion may be reported from any task concurrently; every counter
/// is atomic, so snapshots are always internally consistent enough for
/// progress display (never for control flow beyond `is_finished`).
#[derive(Debug, Default)]
pub struct ProgressTracker {
    pending: AtomicU32,
    succeeded: AtomicU32,
    failed: AtomicU32,
}

impl ProgressTracker {
    /// Creates an idle tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `n` outstanding changes
    pub fn start(&self, n: u32) {
        self.pending.fetch_add(n, Ordering::SeqCst);
    }

    /// Records one completed change
    pub fn done(&self, success: bool) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
        if success {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Current counter values
    #[must_use]
    pub fn snapshot(&self) -> Progress {
        Progress {
            pending: self.pending.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }

    /// True once every registered change has completed
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.pending.load(Ordering::SeqCst) == 0
    }
}

// ============================================================================
// ApplyReport
// ============================================================================

/// One change that completed with a failure
#[derive(Debug, Clone)]
pub struct ChangeFailure {
    /// Path the failed change was reconciling
    pub path: NodePath,
    /// Operation that failed
    pub op: ChangeOp,
    /// Rendered error chain
    pub error: String,
}

/// Terminal summary of one application run
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Changes applied successfully
    pub applied: u32,
    /// Changes that failed, with path and reason
    pub failed: Vec<ChangeFailure>,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl ApplyReport {
    /// True when every change applied successfully
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

// ============================================================================
// TaskOrchestrator
// ============================================================================

/// Applies a finished change list with progress tracking and per-change
/// failure isolation
pub struct TaskOrchestrator {
    applier: Arc<dyn IChangeApplier>,
    max_concurrent: usize,
}

impl TaskOrchestrator {
    /// Creates an orchestrator dispatching to `applier`
    pub fn new(applier: Arc<dyn IChangeApplier>, max_concurrent: usize) -> Self {
        Self {
            applier,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Applies every change, recording outcomes independently
    ///
    /// A failing change never halts or rolls back its siblings; the
    /// report carries the full success/failure tally.
    pub async fn apply_all(&self, changes: Vec<Change>) -> ApplyReport {
        let started = Instant::now();
        let tracker = Arc::new(ProgressTracker::new());
        tracker.start(changes.len() as u32);

        info!(changes = changes.len(), "Applying change list");

        // Identity carry-over happens here, strictly before dispatch.
        let changes: Vec<Change> = changes
            .into_iter()
            .map(Change::with_merged_identity)
            .collect();

        let mut report = ApplyReport::default();

        let mut deletes = Vec::new();
        let mut dir_adds = Vec::new();
        let mut parallel = Vec::new();
        for change in changes {
            match &change {
                Change::Delete { .. } => deletes.push(change),
                Change::Add { src } if src.is_dir() => dir_adds.push(change),
                _ => parallel.push(change),
            }
        }

        // Phases 1 and 2: order-sensitive changes, in list order.
        for change in deletes.into_iter().chain(dir_adds) {
            self.apply_one(&change, &tracker, &mut report).await;
        }

        // Phase 3: independent changes, bounded concurrency.
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();
        for change in parallel {
            let applier = Arc::clone(&self.applier);
            let tracker = Arc::clone(&tracker);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // Holds a permit for the duration of the apply call; the
                // semaphore is never closed, so acquisition only fails if
                // the runtime is tearing down.
                let _permit = semaphore.acquire_owned().await.ok();
                let result = applier.apply(&change).await;
                tracker.done(result.is_ok());
                (change, result.err().map(|e| format!("{e:#}")))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((change, None)) => {
                    debug!(change = %change, "Change applied");
                    report.applied += 1;
                }
                Ok((change, Some(err))) => {
                    warn!(change = %change, error = %err, "Change failed");
                    report.failed.push(ChangeFailure {
                        path: change.path().clone(),
                        op: change.op(),
                        error: err,
                    });
                }
                Err(join_err) => {
                    // A panicked apply task; the change it carried is lost
                    // with it, so only the log can name it.
                    error!(error = %join_err, "Apply task aborted");
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;

        let progress = tracker.snapshot();
        info!(
            applied = report.applied,
            failed = report.failed.len(),
            pending = progress.pending,
            duration_ms = report.duration_ms,
            "Change list application finished"
        );

        report
    }

    /// Applies one change inline, updating tracker and report
    async fn apply_one(
        &self,
        change: &Change,
        tracker: &ProgressTracker,
        report: &mut ApplyReport,
    ) {
        match self.applier.apply(change).await {
            Ok(()) => {
                debug!(change = %change, "Change applied");
                tracker.done(true);
                report.applied += 1;
            }
            Err(err) => {
                let rendered = format!("{err:#}");
                warn!(change = %change, error = %rendered, "Change failed");
                tracker.done(false);
                report.failed.push(ChangeFailure {
                    path: change.path().clone(),
                    op: change.op(),
                    error: rendered,
                });
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
