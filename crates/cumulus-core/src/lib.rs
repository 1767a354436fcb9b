//! Cumulus Core - Domain logic and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Node`, `Change`
//! - **Newtypes** - `RemoteId`, `NodePath` with validation at construction
//! - **Port definitions** - Traits for adapters: `IRemoteStore`, `ILocalTree`,
//!   `IChangePresenter`
//! - **Configuration** - Typed YAML configuration with defaults
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure data and rules with no I/O. Ports define
//! trait interfaces that adapter code in `cumulus-sync` implements. The
//! engine in `cumulus-sync` drives the domain through those ports.

pub mod config;
pub mod domain;
pub mod ports;
