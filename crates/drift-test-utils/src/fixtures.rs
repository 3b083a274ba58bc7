//! Resource builders shared by scenario tests.
//!
//! Attribute shapes follow what providers and IaC state report, reduced to
//! the fields reconciliation looks at.

use drift_resource::Resource;
use serde_json::{Value, json};

/// Any resource from a JSON attribute object.
pub fn resource(resource_type: &str, id: &str, attrs: Value) -> Resource {
    Resource::new(resource_type, id, attrs)
}

/// `aws_api_gateway_rest_api` defined by an OpenAPI `body`.
pub fn rest_api(id: &str, body: &str) -> Resource {
    resource("aws_api_gateway_rest_api", id, json!({"body": body}))
}

/// `aws_apigatewayv2_api` defined by an OpenAPI `body`.
pub fn routed_api(id: &str, body: &str) -> Resource {
    resource("aws_apigatewayv2_api", id, json!({"body": body}))
}

/// Remote `aws_api_gateway_resource` at `path` under `rest_api_id`.
pub fn api_resource(id: &str, rest_api_id: &str, path: &str) -> Resource {
    resource(
        "aws_api_gateway_resource",
        id,
        json!({"rest_api_id": rest_api_id, "path": path}),
    )
}

/// Remote `aws_apigatewayv2_route` with `route_key` under `api_id`.
pub fn route(id: &str, api_id: &str, route_key: &str) -> Resource {
    resource(
        "aws_apigatewayv2_route",
        id,
        json!({"api_id": api_id, "route_key": route_key}),
    )
}

/// Ingress `aws_security_group_rule` on port 443 listing `cidrs`.
pub fn ingress_rule(id: &str, group: &str, cidrs: &[&str]) -> Resource {
    resource(
        "aws_security_group_rule",
        id,
        json!({
            "type": "ingress",
            "security_group_id": group,
            "protocol": "tcp",
            "from_port": 443,
            "to_port": 443,
            "cidr_blocks": cidrs,
        }),
    )
}

/// The default VPC with its default network objects, as enumerated in a
/// fresh region.
pub fn default_network(vpc: &str) -> Vec<Resource> {
    vec![
        resource("aws_default_vpc", vpc, json!({"cidr_block": "172.31.0.0/16"})),
        resource("aws_default_subnet", &format!("subnet-{vpc}"), json!({"vpc_id": vpc})),
        resource(
            "aws_internet_gateway",
            &format!("igw-{vpc}"),
            json!({"vpc_id": vpc}),
        ),
        resource("aws_default_route_table", &format!("rtb-{vpc}"), json!({"vpc_id": vpc})),
        resource("aws_default_network_acl", &format!("acl-{vpc}"), json!({"vpc_id": vpc})),
        resource("aws_default_security_group", &format!("sg-{vpc}"), json!({"vpc_id": vpc})),
    ]
}
