use std::collections::HashSet;
use std::sync::Arc;

use drift_resource::{Attributes, Resource, ResourceFactory};
use serde_json::Value;
use tracing::debug;

use super::{ids, types};
use crate::error::Result;
use crate::middleware::Middleware;

/// Explodes the `ingress` and `egress` blocks of network ACLs into
/// `aws_network_acl_rule` resources.
///
/// Block keys follow the rule resource naming: `rule_no` becomes
/// `rule_number` and `action` becomes `rule_action`.
pub struct AwsNetworkAclExpander {
    factory: Arc<dyn ResourceFactory>,
}

impl AwsNetworkAclExpander {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }

    fn expand_block(
        &self,
        acl: &Resource,
        egress: bool,
        known: &mut HashSet<String>,
    ) -> Vec<Resource> {
        let key = if egress { "egress" } else { "ingress" };
        let Some(entries) = acl.attrs.get_slice(key) else {
            return Vec::new();
        };

        let mut rules = Vec::with_capacity(entries.len());
        for entry in entries.iter().filter_map(Value::as_object) {
            let mut attrs: Attributes = entry.clone().into();
            if let Some(number) = attrs.remove("rule_no") {
                attrs.insert("rule_number", number);
            }
            if let Some(action) = attrs.remove("action") {
                attrs.insert("rule_action", action);
            }
            attrs.insert("egress", egress);
            attrs.insert("network_acl_id", acl.id.as_str());

            let id = ids::network_acl_rule_id(
                &acl.id,
                attrs.get_i64("rule_number").unwrap_or_default(),
                egress,
                attrs.get_str("protocol").unwrap_or_default(),
            );
            if !known.insert(id.clone()) {
                debug!(id = %id, acl = %acl.id, "Network ACL rule already declared, skipping");
                continue;
            }

            debug!(id = %id, acl = %acl.id, egress, "Created network ACL rule from block");
            rules.push(
                self.factory
                    .create_abstract_resource(types::NETWORK_ACL_RULE, &id, attrs),
            );
        }
        rules
    }
}

fn is_acl(res: &Resource) -> bool {
    res.is_any(&[types::NETWORK_ACL, types::DEFAULT_NETWORK_ACL])
}

impl Middleware for AwsNetworkAclExpander {
    fn name(&self) -> &'static str {
        "aws_network_acl_expander"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let mut known: HashSet<String> = state
            .iter()
            .filter(|r| r.is(types::NETWORK_ACL_RULE))
            .map(|r| r.id.clone())
            .collect();

        let mut out = Vec::with_capacity(state.len());
        for mut res in std::mem::take(state) {
            if is_acl(&res) {
                out.extend(self.expand_block(&res, false, &mut known));
                out.extend(self.expand_block(&res, true, &mut known));
                res.attrs.remove("ingress");
                res.attrs.remove("egress");
            }
            out.push(res);
        }
        *state = out;

        for acl in remote.iter_mut().filter(|r| is_acl(r)) {
            acl.attrs.remove("ingress");
            acl.attrs.remove("egress");
        }
        Ok(())
    }
}
