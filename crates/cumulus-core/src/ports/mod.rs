//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the engine depends
//! on, but whose implementations live in adapter code.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Remote hierarchical store operations
//! - [`ILocalTree`] - Local filesystem access under the sync root
//! - [`IChangePresenter`] - Change-list confirmation gate

pub mod local_tree;
pub mod presenter;
pub mod remote_store;

pub use local_tree::ILocalTree;
pub use presenter::IChangePresenter;
pub use remote_store::IRemoteStore;
