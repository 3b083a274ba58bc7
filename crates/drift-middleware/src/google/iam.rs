//! IAM bindings, policies and members
//!
//! Google reports IAM as one member resource per `(scope, role, member)`.
//! Bindings and authoritative policies written in configuration are turned
//! into those members so both sides compare one grant at a time.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use drift_resource::{Attributes, Resource, ResourceFactory};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::types;
use crate::error::{Error, Result};
use crate::middleware::Middleware;
use crate::patterns::{self, Managed};

/// How a grouping resource maps onto member resources
#[derive(Debug, Clone, Copy)]
struct MemberScope {
    /// Binding or policy type carrying several grants
    source: &'static str,
    member: &'static str,
    /// Attribute naming the scope the grant applies to
    scope_key: &'static str,
}

const BINDING_SCOPES: [MemberScope; 2] = [
    MemberScope {
        source: types::STORAGE_BUCKET_IAM_BINDING,
        member: types::STORAGE_BUCKET_IAM_MEMBER,
        scope_key: "bucket",
    },
    MemberScope {
        source: types::PROJECT_IAM_BINDING,
        member: types::PROJECT_IAM_MEMBER,
        scope_key: "project",
    },
];

const POLICY_SCOPES: [MemberScope; 2] = [
    MemberScope {
        source: types::STORAGE_BUCKET_IAM_POLICY,
        member: types::STORAGE_BUCKET_IAM_MEMBER,
        scope_key: "bucket",
    },
    MemberScope {
        source: types::PROJECT_IAM_POLICY,
        member: types::PROJECT_IAM_MEMBER,
        scope_key: "project",
    },
];

fn scope_of<'a>(scopes: &'a [MemberScope], res: &Resource) -> Option<&'a MemberScope> {
    scopes.iter().find(|s| res.is(s.source))
}

/// Builds member resources, skipping those state already holds
struct MemberBuilder<'a> {
    factory: &'a dyn ResourceFactory,
    known: HashSet<(String, String)>,
}

impl<'a> MemberBuilder<'a> {
    fn new(factory: &'a dyn ResourceFactory, state: &[Resource]) -> Self {
        let known = state
            .iter()
            .map(|r| (r.resource_type.clone(), r.id.clone()))
            .collect();
        Self { factory, known }
    }

    fn member(&mut self, scope: &MemberScope, target: &str, role: &str, member: &str) -> Option<Resource> {
        let id = format!("{target}/{role}/{member}");
        if !self.known.insert((scope.member.to_string(), id.clone())) {
            debug!(id = %id, "IAM member already declared, skipping");
            return None;
        }
        let mut data = Attributes::new();
        data.insert("id", id.as_str());
        data.insert(scope.scope_key, target);
        data.insert("role", role);
        data.insert("member", member);
        Some(self.factory.create_abstract_resource(scope.member, &id, data))
    }
}

/// Replaces state IAM bindings by one member per bound principal.
pub struct GoogleIamBindingTransformer {
    factory: Arc<dyn ResourceFactory>,
}

impl GoogleIamBindingTransformer {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }
}

impl Middleware for GoogleIamBindingTransformer {
    fn name(&self) -> &'static str {
        "google_iam_binding_transformer"
    }

    fn execute(&self, _: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let mut builder = MemberBuilder::new(self.factory.as_ref(), state);
        let mut out = Vec::with_capacity(state.len());
        for res in std::mem::take(state) {
            let Some(scope) = scope_of(&BINDING_SCOPES, &res) else {
                out.push(res);
                continue;
            };
            let target = res.attrs.get_str(scope.scope_key).unwrap_or_default();
            let role = res.attrs.get_str("role").unwrap_or_default();
            for member in res.attrs.get_strings("members") {
                out.extend(builder.member(scope, target, role, &member));
            }
            debug!(id = %res.id, resource_type = %res.resource_type, "Replaced IAM binding by its members");
        }
        *state = out;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct PolicyData {
    #[serde(default)]
    bindings: Vec<PolicyBinding>,
}

#[derive(Debug, Deserialize)]
struct PolicyBinding {
    role: String,
    #[serde(default)]
    members: Vec<String>,
}

fn parse_policy(res: &Resource) -> Result<PolicyData> {
    match res.attrs.get_non_empty_str("policy_data") {
        None => Ok(PolicyData::default()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            Error::malformed("policy", &res.resource_type, &res.id, e.to_string())
        }),
    }
}

/// Replaces authoritative state IAM policies by one member per grant of
/// their `policy_data` document.
pub struct GoogleIamPolicyTransformer {
    factory: Arc<dyn ResourceFactory>,
}

impl GoogleIamPolicyTransformer {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }
}

impl Middleware for GoogleIamPolicyTransformer {
    fn name(&self) -> &'static str {
        "google_iam_policy_transformer"
    }

    fn execute(&self, _: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        // Parse everything first so a bad document leaves state untouched
        let mut documents = Vec::new();
        for res in state.iter() {
            if scope_of(&POLICY_SCOPES, res).is_some() {
                documents.push(parse_policy(res)?);
            }
        }

        let mut builder = MemberBuilder::new(self.factory.as_ref(), state);
        let mut documents = documents.into_iter();
        let mut out = Vec::with_capacity(state.len());
        for res in std::mem::take(state) {
            let Some(scope) = scope_of(&POLICY_SCOPES, &res) else {
                out.push(res);
                continue;
            };
            let policy = documents.next().unwrap_or_default();
            let target = res.attrs.get_str(scope.scope_key).unwrap_or_default();
            for binding in &policy.bindings {
                for member in &binding.members {
                    out.extend(builder.member(scope, target, &binding.role, member));
                }
            }
            debug!(id = %res.id, resource_type = %res.resource_type, "Replaced IAM policy by its members");
        }
        *state = out;
        Ok(())
    }
}

/// Drops unmanaged bucket members holding a legacy role, which Google
/// grants to project owners, editors and viewers on every bucket.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleLegacyBucketIamMember;

fn is_legacy_member(res: &Resource, _: &[Resource]) -> bool {
    res.is(types::STORAGE_BUCKET_IAM_MEMBER)
        && res.attrs.get_str("role").is_some_and(|role| {
            role.trim_start_matches("roles/")
                .starts_with("storage.legacy")
        })
}

impl Middleware for GoogleLegacyBucketIamMember {
    fn name(&self) -> &'static str {
        "google_legacy_bucket_iam_member"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::SameResource, is_legacy_member);
        Ok(())
    }
}

/// Drops unmanaged project members bound to service accounts Google
/// creates and manages itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleDefaultIamMember;

static DEFAULT_SERVICE_ACCOUNTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^serviceAccount:[^@]+@appspot\.gserviceaccount\.com$",
        r"^serviceAccount:\d+@cloudservices\.gserviceaccount\.com$",
        r"^serviceAccount:\d+@cloudbuild\.gserviceaccount\.com$",
        r"^serviceAccount:\d+-compute@developer\.gserviceaccount\.com$",
        r"^serviceAccount:service-\d+@[a-z0-9-]+\.iam\.gserviceaccount\.com$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

fn is_default_member(res: &Resource, _: &[Resource]) -> bool {
    if !res.is(types::PROJECT_IAM_MEMBER) {
        return false;
    }
    let member = res.attrs.get_str("member").unwrap_or_default().trim();
    DEFAULT_SERVICE_ACCOUNTS.iter().any(|re| re.is_match(member))
}

impl Middleware for GoogleDefaultIamMember {
    fn name(&self) -> &'static str {
        "google_default_iam_member"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::SameResource, is_default_member);
        Ok(())
    }
}
