use std::collections::HashSet;
use std::sync::Arc;

use drift_resource::{Attributes, Resource, ResourceFactory};
use serde_json::Value;
use tracing::debug;

use super::types;
use crate::error::Result;
use crate::middleware::Middleware;

/// Describes one nested block expanded into standalone child resources.
struct NestedBlock {
    parent: &'static str,
    child: &'static str,
    key: &'static str,
    child_id: fn(&Resource, &serde_json::Map<String, Value>) -> Option<String>,
}

const ROUTES: NestedBlock = NestedBlock {
    parent: types::ROUTE_TABLE,
    child: types::ROUTE,
    key: "route",
    child_id: |table, entry| {
        let name = entry.get("name")?.as_str()?;
        Some(format!("{}/routes/{}", table.id, name))
    },
};

const SUBNETS: NestedBlock = NestedBlock {
    parent: types::VIRTUAL_NETWORK,
    child: types::SUBNET,
    key: "subnet",
    child_id: |_, entry| entry.get("id")?.as_str().map(str::to_string),
};

impl NestedBlock {
    /// Children are placed right after their parent. A null block is left
    /// as is; any list, even empty, is removed from the parent.
    fn expand(&self, factory: &dyn ResourceFactory, state: &mut Vec<Resource>) {
        let mut known: HashSet<String> = state
            .iter()
            .filter(|r| r.is(self.child))
            .map(|r| r.id.clone())
            .collect();

        let mut out = Vec::with_capacity(state.len());
        for mut res in std::mem::take(state) {
            if !res.is(self.parent) || res.attrs.get_slice(self.key).is_none() {
                out.push(res);
                continue;
            }

            let mut children = Vec::new();
            if let Some(Value::Array(entries)) = res.attrs.remove(self.key) {
                for entry in entries.iter().filter_map(Value::as_object) {
                    let Some(id) = (self.child_id)(&res, entry) else {
                        continue;
                    };
                    if !known.insert(id.clone()) {
                        debug!(id = %id, parent = %res.id, "Nested resource already declared, skipping");
                        continue;
                    }
                    debug!(id = %id, parent = %res.id, resource_type = self.child, "Created resource from nested block");
                    children.push(factory.create_abstract_resource(self.child, &id, Attributes::new()));
                }
            }
            out.push(res);
            out.extend(children);
        }
        *state = out;
    }
}

/// Explodes the `route` blocks of route tables into `azurerm_route`
/// resources identified as `<table>/routes/<name>`.
pub struct AzurermRouteExpander {
    factory: Arc<dyn ResourceFactory>,
}

impl AzurermRouteExpander {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }
}

impl Middleware for AzurermRouteExpander {
    fn name(&self) -> &'static str {
        "azurerm_route_expander"
    }

    fn execute(&self, _remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        ROUTES.expand(self.factory.as_ref(), state);
        Ok(())
    }
}

/// Explodes the `subnet` blocks of virtual networks into `azurerm_subnet`
/// resources keyed by the subnet id.
pub struct AzurermSubnetExpander {
    factory: Arc<dyn ResourceFactory>,
}

impl AzurermSubnetExpander {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }
}

impl Middleware for AzurermSubnetExpander {
    fn name(&self) -> &'static str {
        "azurerm_subnet_expander"
    }

    fn execute(&self, _remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        SUBNETS.expand(self.factory.as_ref(), state);
        Ok(())
    }
}
