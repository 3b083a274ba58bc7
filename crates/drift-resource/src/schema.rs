//! Per-type attribute normalization
//!
//! Providers register a normalizer per resource type. The factory runs it on
//! every synthesized resource so that a fabricated resource compares equal
//! to a discovered one carrying the same content.

use std::collections::HashMap;

use crate::resource::Resource;

/// Normalization hook for one resource type
pub type NormalizeFn = fn(&mut Resource);

/// Registry of normalizers keyed by resource type
#[derive(Debug, Clone, Default)]
pub struct SchemaRepository {
    normalizers: HashMap<String, NormalizeFn>,
}

impl SchemaRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the normalizer for `resource_type`, replacing any previous one
    pub fn set_normalize_func(&mut self, resource_type: impl Into<String>, func: NormalizeFn) {
        self.normalizers.insert(resource_type.into(), func);
    }

    /// Whether a normalizer is registered for `resource_type`
    pub fn has_normalizer(&self, resource_type: &str) -> bool {
        self.normalizers.contains_key(resource_type)
    }

    /// Run the registered normalizer, if any
    pub fn normalize(&self, resource: &mut Resource) {
        if let Some(func) = self.normalizers.get(resource.resource_type()) {
            func(resource);
        }
    }
}
