use std::collections::HashSet;
use std::sync::Arc;

use drift_resource::{Attributes, Resource, ResourceFactory};
use serde_json::{Map, Value};
use tracing::debug;

use super::{ids, types};
use crate::alert::Alerter;
use crate::error::Result;
use crate::middleware::Middleware;

// Route block key -> aws_route attribute
const COPIED_FIELDS: &[(&str, &str)] = &[
    ("cidr_block", "destination_cidr_block"),
    ("ipv6_cidr_block", "destination_ipv6_cidr_block"),
    ("destination_prefix_list_id", "destination_prefix_list_id"),
    ("egress_only_gateway_id", "egress_only_gateway_id"),
    ("gateway_id", "gateway_id"),
    ("instance_id", "instance_id"),
    ("local_gateway_id", "local_gateway_id"),
    ("nat_gateway_id", "nat_gateway_id"),
    ("network_interface_id", "network_interface_id"),
    ("transit_gateway_id", "transit_gateway_id"),
    ("vpc_endpoint_id", "vpc_endpoint_id"),
    ("vpc_peering_connection_id", "vpc_peering_connection_id"),
];

/// Explodes the inline `route` blocks of route tables into `aws_route`
/// resources placed right after their table.
///
/// A block without any destination cannot be identified; it is skipped and
/// reported through the alerter.
pub struct AwsRouteTableExpander {
    alerter: Arc<Alerter>,
    factory: Arc<dyn ResourceFactory>,
}

impl AwsRouteTableExpander {
    pub fn new(alerter: Arc<Alerter>, factory: Arc<dyn ResourceFactory>) -> Self {
        Self { alerter, factory }
    }

    /// Routes for `table`, skipping ids already in `known` and recording the
    /// new ones there.
    fn expand(&self, table: &Resource, known: &mut HashSet<String>) -> Vec<Resource> {
        let mut created = Vec::new();
        let Some(routes) = table.attrs.get_slice("route") else {
            return created;
        };
        let is_default = table.is(types::DEFAULT_ROUTE_TABLE);

        for route in routes.iter().filter_map(Value::as_object) {
            let destination = |key: &str| route.get(key).and_then(Value::as_str);
            let Some(route_id) = ids::route_id(
                &table.id,
                destination("cidr_block"),
                destination("ipv6_cidr_block"),
                destination("destination_prefix_list_id"),
            ) else {
                self.alerter.warn(
                    format!("{}.{}", table.resource_type, table.id),
                    format!(
                        "Skipped invalid route found in state for {}.{}",
                        table.resource_type, table.id
                    ),
                );
                continue;
            };

            if !known.insert(route_id.clone()) {
                debug!(route = %route_id, "Route already declared, skipping");
                continue;
            }

            let data = route_data(route, &table.id, &route_id, is_default);
            debug!(route = %route_id, table = %table.id, "Created new route from route table");
            created.push(
                self.factory
                    .create_abstract_resource(types::ROUTE, &route_id, data),
            );
        }
        created
    }
}

fn route_data(route: &Map<String, Value>, table_id: &str, route_id: &str, is_default: bool) -> Attributes {
    let mut data = Attributes::new();
    for (from, to) in COPIED_FIELDS {
        data.insert(*to, route.get(*from).cloned().unwrap_or(Value::Null));
    }
    data.insert("id", route_id);
    data.insert("origin", "CreateRoute");
    data.insert("route_table_id", table_id);
    data.insert("state", "active");
    if !is_default {
        data.insert("instance_owner_id", "");
    }
    data
}

fn is_table(res: &Resource) -> bool {
    res.is_any(&[types::ROUTE_TABLE, types::DEFAULT_ROUTE_TABLE])
}

impl Middleware for AwsRouteTableExpander {
    fn name(&self) -> &'static str {
        "aws_route_table_expander"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let mut known: HashSet<String> = state
            .iter()
            .filter(|r| r.is(types::ROUTE))
            .map(|r| r.id.clone())
            .collect();

        let mut out = Vec::with_capacity(state.len());
        for mut res in std::mem::take(state) {
            if !is_table(&res) {
                out.push(res);
                continue;
            }
            let created = self.expand(&res, &mut known);
            res.attrs.remove("route");
            out.push(res);
            out.extend(created);
        }
        *state = out;

        for table in remote.iter_mut().filter(|r| is_table(r)) {
            table.attrs.remove("route");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_resource::PassthroughFactory;
    use drift_resource::hash::stable_hash;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn expander(alerter: Arc<Alerter>) -> AwsRouteTableExpander {
        AwsRouteTableExpander::new(alerter, Arc::new(PassthroughFactory))
    }

    #[test]
    fn routes_become_resources_after_their_table() {
        let alerter = Arc::new(Alerter::new());
        let mut remote = vec![Resource::new(
            types::ROUTE_TABLE,
            "rtb-1",
            json!({"route": [{"cidr_block": "0.0.0.0/0"}]}),
        )];
        let mut state = vec![
            Resource::new(
                types::ROUTE_TABLE,
                "rtb-1",
                json!({"vpc_id": "vpc-1", "route": [
                    {"cidr_block": "0.0.0.0/0", "gateway_id": "igw-1"},
                    {"ipv6_cidr_block": "::/0", "egress_only_gateway_id": "eigw-1"},
                ]}),
            ),
            Resource::new(types::DEFAULT_VPC, "vpc-1", json!({})),
        ];

        expander(alerter.clone())
            .execute(&mut remote, &mut state)
            .unwrap();

        assert!(!remote[0].attrs.contains_key("route"));
        assert!(!state[0].attrs.contains_key("route"));

        let kinds: Vec<&str> = state.iter().map(Resource::resource_type).collect();
        assert_eq!(
            kinds,
            vec![types::ROUTE_TABLE, types::ROUTE, types::ROUTE, types::DEFAULT_VPC]
        );

        let ipv4 = &state[1];
        assert_eq!(ipv4.id, format!("r-rtb-1{}", stable_hash("0.0.0.0/0")));
        assert_eq!(ipv4.attrs.get_str("destination_cidr_block"), Some("0.0.0.0/0"));
        assert_eq!(ipv4.attrs.get_str("gateway_id"), Some("igw-1"));
        assert_eq!(ipv4.attrs.get_str("origin"), Some("CreateRoute"));
        assert_eq!(ipv4.attrs.get_str("state"), Some("active"));
        assert_eq!(ipv4.attrs.get_str("instance_owner_id"), Some(""));
        assert!(alerter.is_empty());
    }

    #[test]
    fn default_table_routes_have_no_owner() {
        let mut state = vec![Resource::new(
            types::DEFAULT_ROUTE_TABLE,
            "rtb-default",
            json!({"route": [{"cidr_block": "10.0.0.0/8"}]}),
        )];
        expander(Arc::new(Alerter::new()))
            .execute(&mut vec![], &mut state)
            .unwrap();
        assert!(!state[1].attrs.contains_key("instance_owner_id"));
    }

    #[test]
    fn declared_routes_are_not_duplicated() {
        let route_id = format!("r-rtb-1{}", stable_hash("10.0.0.0/8"));
        let mut state = vec![
            Resource::new(types::ROUTE, &route_id, json!({"gateway_id": "igw-1"})),
            Resource::new(types::ROUTE_TABLE, "rtb-1", json!({"route": [{"cidr_block": "10.0.0.0/8"}]})),
        ];
        expander(Arc::new(Alerter::new()))
            .execute(&mut vec![], &mut state)
            .unwrap();
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn invalid_route_raises_alert_and_continues() {
        let alerter = Arc::new(Alerter::new());
        let mut state = vec![Resource::new(
            types::ROUTE_TABLE,
            "rtb-1",
            json!({"route": [{"gateway_id": "igw-1"}, {"cidr_block": "10.0.0.0/8"}]}),
        )];
        expander(alerter.clone())
            .execute(&mut vec![], &mut state)
            .unwrap();

        assert_eq!(state.len(), 2);
        let alerts = alerter.drain();
        assert_eq!(alerts.len(), 1);
        assert_eq!(
            alerts[0].message,
            "Skipped invalid route found in state for aws_route_table.rtb-1"
        );
    }
}
