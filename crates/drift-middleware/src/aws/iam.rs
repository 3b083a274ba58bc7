//! IAM policy attachments and service-linked role defaults
//!
//! AWS reports policy attachments as one object per principal. IaC offers
//! three spellings (user, role and multi-principal attachments) plus the
//! `managed_policy_arns` shortcut on roles; everything is brought down to
//! single-principal `aws_iam_policy_attachment` resources.

use std::sync::Arc;

use drift_resource::{Attributes, Resource, ResourceFactory};
use serde_json::{Value, json};
use tracing::debug;

use super::types;
use crate::error::Result;
use crate::middleware::Middleware;
use crate::patterns::{self, Managed};

const SERVICE_ROLE_PATH_PREFIX: &str = "/aws-service-role/";

/// Rewrites user and role policy attachments as `aws_iam_policy_attachment`.
pub struct IamPolicyAttachmentTransformer {
    factory: Arc<dyn ResourceFactory>,
}

impl IamPolicyAttachmentTransformer {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }

    fn transform(&self, collection: &mut [Resource]) {
        for res in collection.iter_mut() {
            let (users, roles) = if res.is(types::IAM_USER_POLICY_ATTACHMENT) {
                (principal(res, "user"), json!([]))
            } else if res.is(types::IAM_ROLE_POLICY_ATTACHMENT) {
                (json!([]), principal(res, "role"))
            } else {
                continue;
            };

            let attrs: Attributes = json!({
                "id": res.id,
                "policy_arn": res.attrs.get("policy_arn").cloned().unwrap_or(Value::Null),
                "users": users,
                "groups": [],
                "roles": roles,
            })
            .into();

            debug!(id = %res.id, from = %res.resource_type, "Transforming policy attachment");
            *res = self.factory.create_abstract_resource(
                types::IAM_POLICY_ATTACHMENT,
                &res.id,
                attrs,
            );
        }
    }
}

fn principal(res: &Resource, key: &str) -> Value {
    json!([res.attrs.get(key).cloned().unwrap_or(Value::Null)])
}

impl Middleware for IamPolicyAttachmentTransformer {
    fn name(&self) -> &'static str {
        "iam_policy_attachment_transformer"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        self.transform(remote);
        self.transform(state);
        Ok(())
    }
}

/// Splits multi-principal attachments into one attachment per user and per
/// role, with id `{principal}-{policy_arn}`.
///
/// Group-only attachments have no single-principal counterpart and are kept
/// unchanged.
pub struct IamPolicyAttachmentExpander {
    factory: Arc<dyn ResourceFactory>,
}

impl IamPolicyAttachmentExpander {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }

    fn expand(&self, attachment: &Resource) -> Option<Vec<Resource>> {
        let policy_arn = attachment.attrs.get_str("policy_arn").unwrap_or_default();
        let users = attachment.attrs.get_strings("users");
        let roles = attachment.attrs.get_strings("roles");
        if users.is_empty() && roles.is_empty() {
            return None;
        }

        let single = |kind: &str, principal: &str| {
            let mut attrs = Attributes::new();
            attrs.insert("policy_arn", policy_arn);
            attrs.insert(kind, json!([principal]));
            self.factory.create_abstract_resource(
                types::IAM_POLICY_ATTACHMENT,
                &format!("{principal}-{policy_arn}"),
                attrs,
            )
        };

        Some(
            users
                .iter()
                .map(|u| single("users", u))
                .chain(roles.iter().map(|r| single("roles", r)))
                .collect(),
        )
    }

    fn expand_all(&self, collection: &mut Vec<Resource>) {
        let mut out = Vec::with_capacity(collection.len());
        for res in collection.drain(..) {
            if !res.is(types::IAM_POLICY_ATTACHMENT) {
                out.push(res);
                continue;
            }
            match self.expand(&res) {
                Some(parts) => {
                    for part in parts {
                        patterns::insert_unless_present(&mut out, part);
                    }
                }
                None => out.push(res),
            }
        }
        *collection = out;
    }
}

impl Middleware for IamPolicyAttachmentExpander {
    fn name(&self) -> &'static str {
        "iam_policy_attachment_expander"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        self.expand_all(state);
        self.expand_all(remote);
        Ok(())
    }
}

/// Turns the `managed_policy_arns` shortcut of state roles into
/// `aws_iam_policy_attachment` resources with id `{role_name}-{policy_arn}`.
pub struct AwsRoleManagedPolicyExpander {
    factory: Arc<dyn ResourceFactory>,
}

impl AwsRoleManagedPolicyExpander {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }
}

impl Middleware for AwsRoleManagedPolicyExpander {
    fn name(&self) -> &'static str {
        "aws_role_managed_policy_expander"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::strip(remote, types::IAM_ROLE, &["managed_policy_arns"]);

        let mut children = Vec::new();
        for role in state.iter_mut().filter(|r| r.is(types::IAM_ROLE)) {
            let arns = role.attrs.get_strings("managed_policy_arns");
            role.attrs.remove("managed_policy_arns");

            let Some(role_name) = role.attrs.get_non_empty_str("name") else {
                continue;
            };
            for arn in arns {
                debug!(role = %role_name, policy_arn = %arn, "Expanding managed policy from role");
                children.push(self.factory.create_abstract_resource(
                    types::IAM_POLICY_ATTACHMENT,
                    &format!("{role_name}-{arn}"),
                    json!({
                        "policy_arn": arn,
                        "users": [],
                        "groups": [],
                        "roles": [role_name],
                    })
                    .into(),
                ));
            }
        }

        for child in children {
            patterns::insert_unless_present(state, child);
        }
        Ok(())
    }
}

/// Ignores service-linked roles AWS creates on its own, along with their
/// inline policies and attachments, unless state manages them.
///
/// Role lookups use the remote inventory as it was before filtering. A
/// policy or attachment whose role cannot be found is kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsDefaults;

fn is_service_role(role: &Resource) -> bool {
    role.attrs
        .get_str("path")
        .is_some_and(|p| p.starts_with(SERVICE_ROLE_PATH_PREFIX))
}

fn role_is_service_linked(remote: &[Resource], role_id: &str) -> bool {
    patterns::find(remote, types::IAM_ROLE, role_id).is_some_and(is_service_role)
}

impl Middleware for AwsDefaults {
    fn name(&self) -> &'static str {
        "aws_defaults"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::SameResource, |r, all| {
            if r.is(types::IAM_ROLE) {
                is_service_role(r)
            } else if r.is(types::IAM_ROLE_POLICY) {
                r.attrs
                    .get_str("role")
                    .is_some_and(|role| role_is_service_linked(all, role))
            } else if r.is(types::IAM_POLICY_ATTACHMENT) {
                let roles = r.attrs.get_strings("roles");
                !roles.is_empty() && roles.iter().all(|role| role_is_service_linked(all, role))
            } else {
                false
            }
        });
        Ok(())
    }
}
