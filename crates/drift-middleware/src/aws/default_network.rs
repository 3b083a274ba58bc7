//! Network objects AWS provisions in every region of a new account
//!
//! Each stage drops one kind of provider-created default from the remote
//! inventory unless state manages it.

use drift_resource::Resource;

use super::types;
use crate::error::Result;
use crate::middleware::Middleware;
use crate::patterns::{self, Managed};

const IPV4_ANY: &str = "0.0.0.0/0";
const IPV6_ANY: &str = "::/0";

/// Declares a stage that drops every unmanaged remote resource of one type.
macro_rules! default_type_filter {
    ($(#[$doc:meta])* $stage:ident, $name:literal, $resource_type:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $stage;

        impl Middleware for $stage {
            fn name(&self) -> &'static str {
                $name
            }

            fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
                patterns::filter_defaults(remote, state, Managed::SameResource, |r, _| {
                    r.is($resource_type)
                });
                Ok(())
            }
        }
    };
}

default_type_filter!(
    /// Drops the unmanaged default VPC.
    AwsDefaultVpc,
    "aws_default_vpc",
    types::DEFAULT_VPC
);

default_type_filter!(
    /// Drops unmanaged default subnets.
    AwsDefaultSubnet,
    "aws_default_subnet",
    types::DEFAULT_SUBNET
);

default_type_filter!(
    /// Drops unmanaged default route tables.
    AwsDefaultRouteTable,
    "aws_default_route_table",
    types::DEFAULT_ROUTE_TABLE
);

default_type_filter!(
    /// Drops unmanaged default network ACLs.
    AwsDefaultNetworkAcl,
    "aws_default_network_acl",
    types::DEFAULT_NETWORK_ACL
);

/// Drops the internet gateway attached to a default VPC.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsDefaultInternetGateway;

pub(crate) fn is_default_internet_gateway(igw: &Resource, remote: &[Resource]) -> bool {
    igw.is(types::INTERNET_GATEWAY)
        && igw
            .attrs
            .get_str("vpc_id")
            .is_some_and(|vpc| patterns::contains(remote, types::DEFAULT_VPC, vpc))
}

impl Middleware for AwsDefaultInternetGateway {
    fn name(&self) -> &'static str {
        "aws_default_internet_gateway"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::SameResource, is_default_internet_gateway);
        Ok(())
    }
}

/// Drops the `0.0.0.0/0` route through the default VPC's internet gateway.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsDefaultInternetGatewayRoute;

impl Middleware for AwsDefaultInternetGatewayRoute {
    fn name(&self) -> &'static str {
        "aws_default_internet_gateway_route"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::SameResource, |r, all| {
            r.is(types::ROUTE)
                && r.attrs.get_str("destination_cidr_block") == Some(IPV4_ANY)
                && r.attrs.get_str("gateway_id").is_some_and(|gw| {
                    patterns::find(all, types::INTERNET_GATEWAY, gw)
                        .is_some_and(|igw| is_default_internet_gateway(igw, all))
                })
        });
        Ok(())
    }
}

/// Drops the local routes AWS adds when a route table is created.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsDefaultRoute;

impl Middleware for AwsDefaultRoute {
    fn name(&self) -> &'static str {
        "aws_default_route"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::SameResource, |r, _| {
            r.is(types::ROUTE) && r.attrs.get_str("origin") == Some("CreateRouteTable")
        });
        Ok(())
    }
}

/// Drops the catch-all deny rules (32767 for IPv4, 32768 for IPv6) every
/// network ACL carries.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsDefaultNetworkAclRule;

fn is_default_acl_rule(rule: &Resource) -> bool {
    if !rule.is(types::NETWORK_ACL_RULE) {
        return false;
    }
    let attrs = &rule.attrs;
    let differs = |key: &str, expected: &str| attrs.get_str(key).is_some_and(|v| v != expected);

    let (number, cidr_key, any) = if attrs.contains_key("cidr_block") {
        (32767, "cidr_block", IPV4_ANY)
    } else {
        (32768, "ipv6_cidr_block", IPV6_ANY)
    };

    if attrs.get_i64("rule_number").is_some_and(|n| n != number) || differs(cidr_key, any) {
        return false;
    }
    !differs("rule_action", "deny") && !differs("protocol", "-1")
}

impl Middleware for AwsDefaultNetworkAclRule {
    fn name(&self) -> &'static str {
        "aws_default_network_acl_rule"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::Equal, |r, _| is_default_acl_rule(r));
        Ok(())
    }
}
