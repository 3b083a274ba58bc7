//! Deterministic identifiers for resources AWS does not name itself
//!
//! Every function serializes the identifying attributes in a fixed order
//! and hashes them with [`drift_resource::hash::stable_hash`], so the same
//! logical object gets the same id on every scan.

use drift_resource::Attributes;
use drift_resource::hash::{hashed_id, stable_hash};

/// Id of a security group rule: `sgrule-<hash>`.
///
/// Serialized as group id, non-zero ports, protocol and direction, each
/// target, then the self or peer group when set.
pub fn security_group_rule_id(attrs: &Attributes) -> String {
    let group = attrs.get_str("security_group_id").unwrap_or_default();
    let mut buf = format!("{group}-");

    for port in ["from_port", "to_port"] {
        if let Some(p) = attrs.get_i64(port).filter(|p| *p > 0) {
            buf.push_str(&format!("{p}-"));
        }
    }
    buf.push_str(&format!(
        "{}-{}-",
        attrs.get_str("protocol").unwrap_or_default(),
        attrs.get_str("type").unwrap_or_default()
    ));

    for key in ["cidr_blocks", "ipv6_cidr_blocks", "prefix_list_ids"] {
        for target in attrs.get_strings(key) {
            buf.push_str(&format!("{target}-"));
        }
    }

    let is_self = attrs.get_bool("self").unwrap_or(false);
    let peer = attrs.get_non_empty_str("source_security_group_id");
    if is_self || peer.is_some() {
        let reference = if is_self { group } else { peer.unwrap_or_default() };
        buf.push_str(&format!("{reference}--"));
    }

    format!("sgrule-{}", stable_hash(&buf))
}

/// Id of a network ACL entry: `nacl-<hash>` over acl, rule number,
/// direction and protocol.
pub fn network_acl_rule_id(acl_id: &str, rule_number: i64, egress: bool, protocol: &str) -> String {
    hashed_id(
        "nacl",
        &[
            acl_id.to_string(),
            rule_number.to_string(),
            egress.to_string(),
            protocol.to_string(),
        ],
    )
}

/// Id of a route: `r-<table><hash of destination>`.
///
/// The destination is the first non-empty of the IPv4 block, the IPv6 block
/// and the prefix list. Returns `None` when the route has no destination.
pub fn route_id(
    table_id: &str,
    cidr_block: Option<&str>,
    ipv6_cidr_block: Option<&str>,
    prefix_list_id: Option<&str>,
) -> Option<String> {
    [cidr_block, ipv6_cidr_block, prefix_list_id]
        .into_iter()
        .flatten()
        .find(|d| !d.is_empty())
        .map(|destination| format!("r-{table_id}{}", stable_hash(destination)))
}
