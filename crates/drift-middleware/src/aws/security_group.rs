//! Security groups and their rules

use std::sync::Arc;

use drift_resource::{Attributes, Resource, ResourceFactory};
use serde_json::{Value, json};

use super::{ids, types};
use crate::error::Result;
use crate::middleware::Middleware;
use crate::patterns::{self, Managed};

const TARGET_LISTS: [&str; 3] = ["cidr_blocks", "ipv6_cidr_blocks", "prefix_list_ids"];

const RULE_FIELDS: &[&str] = &[
    "cidr_blocks",
    "description",
    "from_port",
    "ipv6_cidr_blocks",
    "prefix_list_ids",
    "protocol",
    "security_group_id",
    "self",
    "source_security_group_id",
    "to_port",
    "type",
];

/// Drops the unmanaged default security group of each VPC.
#[derive(Debug, Default, Clone, Copy)]
pub struct VpcDefaultSecurityGroupSanitizer;

impl Middleware for VpcDefaultSecurityGroupSanitizer {
    fn name(&self) -> &'static str {
        "vpc_default_security_group_sanitizer"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::SameResource, |r, _| {
            r.is(types::DEFAULT_SECURITY_GROUP)
        });
        Ok(())
    }
}

/// Drops the two rules every default security group starts with: ingress
/// from itself and egress to anywhere, all traffic.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsDefaultSecurityGroupRule;

fn has_targets(attrs: &Attributes, key: &str) -> bool {
    attrs.get_slice(key).is_some_and(|l| !l.is_empty())
}

fn is_all_traffic(attrs: &Attributes) -> bool {
    attrs.get_i64("from_port") == Some(0)
        && attrs.get_i64("to_port") == Some(0)
        && attrs.get_str("protocol") == Some("-1")
}

fn is_default_rule(rule: &Resource, remote: &[Resource]) -> bool {
    if !rule.is(types::SECURITY_GROUP_RULE) {
        return false;
    }
    let attrs = &rule.attrs;
    if !is_all_traffic(attrs)
        || has_targets(attrs, "ipv6_cidr_blocks")
        || has_targets(attrs, "prefix_list_ids")
    {
        return false;
    }

    let shape = match attrs.get_str("type") {
        Some("ingress") => {
            !has_targets(attrs, "cidr_blocks") && attrs.get_bool("self") == Some(true)
        }
        Some("egress") => {
            attrs.get_strings("cidr_blocks") == ["0.0.0.0/0"]
                && attrs.get_bool("self") == Some(false)
        }
        _ => false,
    };

    shape
        && attrs
            .get_str("security_group_id")
            .is_some_and(|sg| patterns::contains(remote, types::DEFAULT_SECURITY_GROUP, sg))
}

impl Middleware for AwsDefaultSecurityGroupRule {
    fn name(&self) -> &'static str {
        "aws_default_security_group_rule"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::Equal, is_default_rule);
        Ok(())
    }
}

/// Splits state rules listing several targets into one rule per target,
/// which is how AWS reports them.
///
/// A rule counts one target per CIDR block, IPv6 block and prefix list,
/// plus one when it references itself or a peer group. Rules with at most
/// one target are left alone.
pub struct VpcSecurityGroupRuleSanitizer {
    factory: Arc<dyn ResourceFactory>,
}

impl VpcSecurityGroupRuleSanitizer {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }

    fn split(&self, rule: &Resource) -> Option<Vec<Resource>> {
        if !rule.is(types::SECURITY_GROUP_RULE) || target_count(&rule.attrs) <= 1 {
            return None;
        }

        let mut parts = Vec::new();
        for (index, key) in TARGET_LISTS.iter().enumerate() {
            for target in rule.attrs.get_strings(key) {
                let mut attrs = rule.attrs.clone();
                for (other, list) in TARGET_LISTS.iter().enumerate() {
                    let value = if other == index { json!([target]) } else { json!([]) };
                    attrs.insert(*list, value);
                }
                parts.push(self.create_rule(&attrs));
            }
        }

        if references_group(&rule.attrs) {
            let mut attrs = rule.attrs.clone();
            for list in TARGET_LISTS {
                attrs.insert(list, json!([]));
            }
            parts.push(self.create_rule(&attrs));
        }

        Some(parts)
    }

    fn create_rule(&self, attrs: &Attributes) -> Resource {
        let id = ids::security_group_rule_id(attrs);
        let mut data = Attributes::new();
        data.insert("id", id.clone());
        for field in RULE_FIELDS {
            data.insert(*field, attrs.get(field).cloned().unwrap_or(Value::Null));
        }
        self.factory
            .create_abstract_resource(types::SECURITY_GROUP_RULE, &id, data)
    }
}

fn references_group(attrs: &Attributes) -> bool {
    attrs.get_bool("self").unwrap_or(false)
        || attrs.get_non_empty_str("source_security_group_id").is_some()
}

/// Number of independent remote rules `attrs` stands for
pub fn target_count(attrs: &Attributes) -> usize {
    let lists: usize = TARGET_LISTS
        .iter()
        .map(|key| attrs.get_slice(key).map_or(0, Vec::len))
        .sum();
    lists + usize::from(references_group(attrs))
}

impl Middleware for VpcSecurityGroupRuleSanitizer {
    fn name(&self) -> &'static str {
        "vpc_security_group_rule_sanitizer"
    }

    fn execute(&self, _: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::fan_out(state, |r| self.split(r));
        Ok(())
    }
}
