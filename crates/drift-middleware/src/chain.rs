//! Ordered, fail-fast execution of stages

use drift_resource::Resource;
use tracing::{debug, debug_span};

use crate::error::Result;
use crate::middleware::Middleware;

/// An ordered sequence of stages.
///
/// Stages run strictly one after another. The first error stops the run and
/// is returned as is; mutations made by stages that already ran are kept.
#[derive(Default)]
pub struct Chain {
    stages: Vec<Box<dyn Middleware>>,
}

impl Chain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage at the end of the chain
    pub fn push(&mut self, stage: Box<dyn Middleware>) {
        self.stages.push(stage);
    }

    /// Builder-style variant of [`Chain::push`]
    pub fn with(mut self, stage: impl Middleware + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Stage names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the chain has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order over both inventories.
    pub fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        for stage in &self.stages {
            let _span = debug_span!("middleware", name = stage.name()).entered();
            stage.execute(remote, state)?;
            debug!(
                remote = remote.len(),
                state = state.len(),
                "Middleware completed"
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("stages", &self.names()).finish()
    }
}

impl FromIterator<Box<dyn Middleware>> for Chain {
    fn from_iter<I: IntoIterator<Item = Box<dyn Middleware>>>(iter: I) -> Self {
        Self {
            stages: iter.into_iter().collect(),
        }
    }
}
