//! Azure reconciliation stages

mod network;
pub mod types;

pub use network::{AzurermRouteExpander, AzurermSubnetExpander};
