//! The contract every reconciliation stage implements

use drift_resource::Resource;

use crate::error::Result;

/// One reconciliation stage.
///
/// A stage receives both inventories and may filter, rewrite or expand
/// either of them. Resources whose type the stage does not handle must pass
/// through untouched and keep their relative order.
pub trait Middleware: Send + Sync {
    /// Stable name used in logs, configuration and the chain order.
    fn name(&self) -> &'static str;

    /// Apply the stage to the remote and state inventories.
    ///
    /// # Errors
    ///
    /// Returns an error when an embedded document cannot be interpreted.
    /// Mutations already applied are not undone.
    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()>;
}
