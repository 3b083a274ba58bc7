//! Resource model for drift reconciliation
//!
//! Both inventories of a scan, the one enumerated from provider APIs and the
//! one parsed from IaC state, are expressed with the same generic
//! [`Resource`]: a type tag, an id and an [`Attributes`] bag.
//!
//! This crate provides:
//!
//! - **Resource model**: [`Resource`] and [`Attributes`] with total, typed
//!   accessors and path-based mutation
//! - **Resource factory**: [`ResourceFactory`], the sanctioned way to
//!   synthesize resources, with schema-aware normalization
//! - **Deterministic ids**: [`hash`] utilities for ids that stay stable
//!   across runs

pub mod attributes;
pub mod error;
pub mod factory;
pub mod hash;
pub mod path;
pub mod resource;
pub mod schema;

pub use attributes::Attributes;
pub use error::{Error, Result};
pub use factory::{PassthroughFactory, ResourceFactory, SchemaResourceFactory};
pub use resource::{Resource, parse_resources};
pub use schema::{NormalizeFn, SchemaRepository};
