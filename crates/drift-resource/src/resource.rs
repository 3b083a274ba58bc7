//! The generic, type-tagged resource shared by both inventories

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::error::{Error, Result};

/// One cloud object, as enumerated remotely or declared in IaC state.
///
/// A resource is identified by `(resource_type, id)`; everything else lives
/// in the attribute bag. Per-type structure belongs to the provider schema,
/// not to this representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Stable identifier within its type
    pub id: String,
    /// Type discriminant, e.g. `aws_security_group_rule`
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Attribute bag
    #[serde(default)]
    pub attrs: Attributes,
}

impl Resource {
    /// Create a resource from its parts
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        attrs: impl Into<Attributes>,
    ) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            attrs: attrs.into(),
        }
    }

    /// Resource id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Type discriminant
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Whether this resource carries the given type
    pub fn is(&self, resource_type: &str) -> bool {
        self.resource_type == resource_type
    }

    /// Whether this resource carries any of the given types
    pub fn is_any(&self, types: &[&str]) -> bool {
        types.contains(&self.resource_type.as_str())
    }

    /// Same type and same id
    pub fn is_same_resource(&self, other: &Resource) -> bool {
        self.resource_type == other.resource_type && self.id == other.id
    }

    /// Structural equality of type, id and attributes
    pub fn equal(&self, other: &Resource) -> bool {
        self == other
    }
}

/// Decode a JSON array of `{"id", "type", "attrs"}` entries.
///
/// ```
/// let inventory = drift_resource::parse_resources(
///     r#"[{"id": "vpc-1", "type": "aws_vpc", "attrs": {"cidr_block": "10.0.0.0/16"}}]"#,
/// ).unwrap();
/// assert_eq!(inventory[0].attrs.get_str("cidr_block"), Some("10.0.0.0/16"));
/// ```
pub fn parse_resources(content: &str) -> Result<Vec<Resource>> {
    let resources: Vec<Resource> = serde_json::from_str(content)?;
    if let Some(bad) = resources.iter().find(|r| r.resource_type.is_empty()) {
        return Err(Error::MissingType { id: bad.id.clone() });
    }
    Ok(resources)
}
