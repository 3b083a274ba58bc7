//! Reconciliation layer of the drift detector
//!
//! Before the diff engine compares what is deployed (`remote`) with what is
//! declared (`state`), both inventories go through an ordered chain of
//! stages that bring them to a comparable shape:
//!
//! - **Alias unification**: legacy type names are relabelled
//! - **Default filtering**: provider-created defaults nobody manages are dropped
//! - **Expansion**: embedded blocks become standalone resources
//! - **Version dedup**: v1/v2 twins of the same object collapse into one
//! - **Fan-out**: multi-target rules split into one rule per target
//! - **Id reconciliation**: remote ids are rewritten to the state convention
//!
//! # Architecture
//!
//! ```text
//!             ReconcileConfig
//!                   |
//!               assembler ---- aws / google / azurerm stages
//!                   |
//!                 Chain  ---> Middleware::execute(remote, state)
//!                   |
//!     patterns + drift-resource (Resource, Attributes, ResourceFactory)
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use drift_middleware::{Alerter, ReconcileConfig, aws_factory, build_chain};
//!
//! let config = ReconcileConfig::parse("strict = true").unwrap();
//! let alerter = Arc::new(Alerter::new());
//! let chain = build_chain(&config, aws_factory(), alerter.clone()).unwrap();
//!
//! let (mut remote, mut state) = (Vec::new(), Vec::new());
//! chain.execute(&mut remote, &mut state).unwrap();
//! assert!(alerter.drain().is_empty());
//! ```

pub mod alert;
pub mod assembler;
pub mod aws;
pub mod azurerm;
pub mod chain;
pub mod config;
pub mod error;
pub mod google;
pub mod logging;
pub mod middleware;
pub mod openapi;
pub mod patterns;

pub use alert::{Alert, AlertLevel, Alerter};
pub use assembler::{CANONICAL_ORDER, STRICT_EXCLUDED, aws_factory, build_chain};
pub use chain::Chain;
pub use config::{Provider, ReconcileConfig};
pub use error::{Error, Result};
pub use middleware::Middleware;
