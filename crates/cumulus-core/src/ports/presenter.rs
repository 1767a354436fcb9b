//! Change presenter port (driving/primary side collaborator)
//!
//! The presenter is the confirmation gate between resolution and
//! application: the full change list is shown to the user before any
//! mutation, and a declined presentation makes the whole run a no-op.

use crate::domain::change::Change;

/// Port trait for presenting a resolved change list for confirmation
///
/// Implementations render the list and return whether the user accepted
/// it. With `no_prompt` set, the list is still rendered but acceptance
/// is implied.
pub trait IChangePresenter: Send + Sync {
    /// Presents the change list; returns true if application may proceed
    fn present(&self, changes: &[Change], no_prompt: bool) -> bool;
}
