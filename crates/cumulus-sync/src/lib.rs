//! Cumulus Sync - change-list resolution and application engine
//!
//! Provides:
//! - Recursive local/remote tree diffing into an ordered change list
//! - Confirmation-gated application with per-change failure isolation
//! - Push (local authoritative) and pull (remote authoritative) directions
//!
//! ## Modules
//!
//! - [`resolver`] - Tree walker + change resolver
//! - [`orchestrator`] - Progress tracking and change dispatch
//! - [`applier`] - Per-change mutation (push and pull variants)
//! - [`engine`] - Resolve / present / apply facade
//! - [`filesystem`] - Local tree adapter over `tokio::fs`
//! - [`mirror`] - Directory-backed remote store adapter

pub mod applier;
pub mod engine;
pub mod filesystem;
pub mod mirror;
pub mod orchestrator;
pub mod resolver;

pub use applier::{IChangeApplier, PullApplier, PushApplier};
pub use engine::{SyncEngine, SyncOutcome};
pub use filesystem::LocalTreeAdapter;
pub use mirror::DirMirrorStore;
pub use orchestrator::{ApplyReport, ChangeFailure, ProgressTracker, TaskOrchestrator};
pub use resolver::{ChangeResolver, Direction, Resolution};
