//! [`RecordingFactory`]: a resource factory that logs every call.

use std::sync::{Arc, Mutex};

use drift_resource::{Attributes, PassthroughFactory, Resource, ResourceFactory};

/// Wraps another factory and records the `(type, id)` of every resource it
/// synthesizes, in call order.
///
/// # Example
///
/// ```rust
/// use drift_resource::{Attributes, ResourceFactory};
/// use drift_test_utils::RecordingFactory;
///
/// let factory = RecordingFactory::new();
/// factory.create_abstract_resource("aws_route", "r-1", Attributes::new());
/// assert_eq!(factory.created(), vec![("aws_route".to_string(), "r-1".to_string())]);
/// ```
pub struct RecordingFactory {
    inner: Arc<dyn ResourceFactory>,
    created: Mutex<Vec<(String, String)>>,
}

impl Default for RecordingFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingFactory {
    /// Record calls made to a [`PassthroughFactory`].
    pub fn new() -> Self {
        Self::wrapping(Arc::new(PassthroughFactory))
    }

    /// Record calls made to `inner`.
    pub fn wrapping(inner: Arc<dyn ResourceFactory>) -> Self {
        Self {
            inner,
            created: Mutex::new(Vec::new()),
        }
    }

    /// Every `(type, id)` created so far.
    pub fn created(&self) -> Vec<(String, String)> {
        self.created.lock().unwrap().clone()
    }

    /// Number of resources created of `resource_type`.
    pub fn count(&self, resource_type: &str) -> usize {
        self.created
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == resource_type)
            .count()
    }
}

impl ResourceFactory for RecordingFactory {
    fn create_abstract_resource(&self, resource_type: &str, id: &str, attrs: Attributes) -> Resource {
        self.created
            .lock()
            .unwrap()
            .push((resource_type.to_string(), id.to_string()));
        self.inner.create_abstract_resource(resource_type, id, attrs)
    }
}
