//! AWS normalizers applied to every resource the factory synthesizes

use drift_resource::{Resource, SchemaRepository};

use super::{ids, types};

const FULLY_SPECIFIED_PROTOCOLS: &[&str] = &["-1", "tcp", "udp", "icmp", "icmpv6"];

// IANA numbers of the protocols commonly spelled out in configurations.
const PROTOCOL_NUMBERS: &[(&str, i64)] = &[
    ("all", -1),
    ("hopopt", 0),
    ("icmp", 1),
    ("igmp", 2),
    ("ggp", 3),
    ("ipv4", 4),
    ("st", 5),
    ("tcp", 6),
    ("cbt", 7),
    ("egp", 8),
    ("igp", 9),
    ("udp", 17),
    ("rdp", 27),
    ("dccp", 33),
    ("ipv6", 41),
    ("ipv6-route", 43),
    ("ipv6-frag", 44),
    ("rsvp", 46),
    ("gre", 47),
    ("esp", 50),
    ("ah", 51),
    ("ipv6-icmp", 58),
    ("icmpv6", 58),
    ("ipv6-nonxt", 59),
    ("ipv6-opts", 60),
    ("eigrp", 88),
    ("ospfigp", 89),
    ("pim", 103),
    ("vrrp", 112),
    ("l2tp", 115),
    ("sctp", 132),
    ("udplite", 136),
];

const ROUTE_OPTIONAL_TARGETS: &[&str] = &[
    "vpc_endpoint_id",
    "local_gateway_id",
    "destination_cidr_block",
    "destination_ipv6_cidr_block",
    "destination_prefix_list_id",
    "egress_only_gateway_id",
    "nat_gateway_id",
    "instance_id",
    "network_interface_id",
    "transit_gateway_id",
    "vpc_peering_connection_id",
    "instance_owner_id",
    "carrier_gateway_id",
];

/// Register every AWS normalizer into `repo`
pub fn register(repo: &mut SchemaRepository) {
    repo.set_normalize_func(types::SECURITY_GROUP_RULE, normalize_security_group_rule);
    repo.set_normalize_func(types::NETWORK_ACL_RULE, normalize_network_acl_rule);
    repo.set_normalize_func(types::ROUTE, normalize_route);
}

/// Empty group references and descriptions are dropped. Rules on protocols
/// without ports lose their port range, which changes their id.
pub fn normalize_security_group_rule(res: &mut Resource) {
    let attrs = &mut res.attrs;
    attrs.delete_if_default("security_group_id");
    attrs.delete_if_default("source_security_group_id");
    attrs.delete_if_default("description");

    let protocol = attrs.get_str("protocol").unwrap_or_default();
    if FULLY_SPECIFIED_PROTOCOLS.contains(&protocol) {
        return;
    }

    attrs.remove("from_port");
    attrs.remove("to_port");
    let id = ids::security_group_rule_id(attrs);
    attrs.insert("id", id.clone());
    res.id = id;
}

/// Protocol names become IANA numbers and the id is recomputed from the
/// numeric form.
pub fn normalize_network_acl_rule(res: &mut Resource) {
    let attrs = &mut res.attrs;
    attrs.delete_if_default("icmp_code");
    attrs.delete_if_default("icmp_type");

    if let Some(number) = attrs
        .get_str("protocol")
        .and_then(|p| PROTOCOL_NUMBERS.iter().find(|(name, _)| *name == p))
        .map(|(_, n)| *n)
    {
        attrs.insert("protocol", number.to_string());
    }

    if let Some(rule_number) = attrs.get_i64("rule_number") {
        attrs.insert("rule_number", rule_number);

        if let Some(acl_id) = attrs.get_non_empty_str("network_acl_id") {
            let id = ids::network_acl_rule_id(
                acl_id,
                rule_number,
                attrs.get_bool("egress").unwrap_or(false),
                attrs.get_str("protocol").unwrap_or_default(),
            );
            attrs.insert("id", id.clone());
            res.id = id;
        }
    }

    attrs.delete_if_default("cidr_block");
    attrs.delete_if_default("ipv6_cidr_block");
}

pub fn normalize_route(res: &mut Resource) {
    res.attrs.remove("timeouts");
    for key in ROUTE_OPTIONAL_TARGETS {
        res.attrs.delete_if_default(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_resource::Attributes;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn rule_with_port_protocol_only_loses_empty_fields() {
        let mut res = Resource::new(
            types::SECURITY_GROUP_RULE,
            "sgrule-1",
            json!({
                "protocol": "tcp",
                "from_port": 22,
                "to_port": 22,
                "security_group_id": "sg-1",
                "source_security_group_id": "",
                "description": "",
            }),
        );
        normalize_security_group_rule(&mut res);

        assert_eq!(res.id, "sgrule-1");
        assert_eq!(res.attrs.get_i64("from_port"), Some(22));
        assert!(!res.attrs.contains_key("description"));
        assert!(!res.attrs.contains_key("source_security_group_id"));
    }

    #[test]
    fn rule_with_portless_protocol_gets_new_id() {
        let mut res = Resource::new(
            types::SECURITY_GROUP_RULE,
            "sgrule-old",
            json!({
                "protocol": "50",
                "type": "ingress",
                "from_port": 0,
                "to_port": 65535,
                "security_group_id": "sg-1",
                "cidr_blocks": ["10.0.0.0/8"],
            }),
        );
        normalize_security_group_rule(&mut res);

        assert!(!res.attrs.contains_key("from_port"));
        assert!(!res.attrs.contains_key("to_port"));
        assert_eq!(res.id, ids::security_group_rule_id(&res.attrs));
        assert_eq!(res.attrs.get_str("id"), Some(res.id.as_str()));
        assert_ne!(res.id, "sgrule-old");
    }

    #[test]
    fn acl_rule_protocol_names_become_numbers() {
        let mut spelled = Resource::new(
            types::NETWORK_ACL_RULE,
            "whatever",
            json!({"network_acl_id": "acl-1", "rule_number": 100.0, "egress": false, "protocol": "tcp", "icmp_code": 0}),
        );
        let mut numeric = Resource::new(
            types::NETWORK_ACL_RULE,
            "other",
            json!({"network_acl_id": "acl-1", "rule_number": 100, "egress": false, "protocol": "6"}),
        );
        normalize_network_acl_rule(&mut spelled);
        normalize_network_acl_rule(&mut numeric);

        assert_eq!(spelled.attrs.get_str("protocol"), Some("6"));
        assert!(!spelled.attrs.contains_key("icmp_code"));
        assert_eq!(spelled, numeric);
        assert_eq!(spelled.id, ids::network_acl_rule_id("acl-1", 100, false, "6"));
    }

    #[test]
    fn route_drops_empty_targets_and_timeouts() {
        let mut res = Resource::new(
            types::ROUTE,
            "r-1",
            json!({"gateway_id": "igw-1", "nat_gateway_id": "", "timeouts": {"create": "5m"}}),
        );
        normalize_route(&mut res);
        assert_eq!(res.attrs, Attributes::from(json!({"gateway_id": "igw-1"})));
    }

    #[test]
    fn register_covers_aws_types() {
        let mut repo = SchemaRepository::new();
        register(&mut repo);
        assert!(repo.has_normalizer(types::SECURITY_GROUP_RULE));
        assert!(repo.has_normalizer(types::NETWORK_ACL_RULE));
        assert!(repo.has_normalizer(types::ROUTE));
    }
}
