//! Shared test utilities for the drift reconciliation workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`factory`]: [`RecordingFactory`], a factory that remembers what it built
//! - [`fixtures`]: builders for the resources scenarios are made of

pub mod factory;
pub mod fixtures;

pub use factory::RecordingFactory;
