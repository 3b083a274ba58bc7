//! Resource fabrication
//!
//! Stages never build [`Resource`] values by hand. They go through a
//! [`ResourceFactory`], the single place where resources that no API
//! returned directly enter an inventory.

use tracing::trace;

use crate::attributes::Attributes;
use crate::resource::Resource;
use crate::schema::SchemaRepository;

/// Builds synthesized resources.
///
/// Implementations must be deterministic and free of side effects visible
/// to the pipeline: the same arguments always produce an equal resource.
pub trait ResourceFactory: Send + Sync {
    /// Build a resource of `resource_type` with `id` from raw attributes.
    fn create_abstract_resource(&self, resource_type: &str, id: &str, attrs: Attributes)
    -> Resource;
}

/// Factory applying default sanitization and per-type schema normalization.
#[derive(Debug, Clone, Default)]
pub struct SchemaResourceFactory {
    schemas: SchemaRepository,
}

impl SchemaResourceFactory {
    /// Create a factory backed by `schemas`
    pub fn new(schemas: SchemaRepository) -> Self {
        Self { schemas }
    }

    /// Borrow the schema repository
    pub fn schemas(&self) -> &SchemaRepository {
        &self.schemas
    }
}

impl ResourceFactory for SchemaResourceFactory {
    fn create_abstract_resource(
        &self,
        resource_type: &str,
        id: &str,
        mut attrs: Attributes,
    ) -> Resource {
        attrs.sanitize_defaults();
        let mut resource = Resource::new(resource_type, id, attrs);
        self.schemas.normalize(&mut resource);
        trace!(id = %resource.id, resource_type = %resource.resource_type, "Synthesized resource");
        resource
    }
}

/// Factory that builds resources verbatim.
///
/// Suitable when attributes were already normalized upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFactory;

impl ResourceFactory for PassthroughFactory {
    fn create_abstract_resource(&self, resource_type: &str, id: &str, attrs: Attributes) -> Resource {
        Resource::new(resource_type, id, attrs)
    }
}
