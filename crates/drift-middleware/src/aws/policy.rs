//! Inline resource policies
//!
//! Buckets, queues, topics and REST APIs accept their access policy either
//! inline or as a dedicated policy resource. Remote always reports the
//! dedicated form, so inline state policies are moved into one.

use std::sync::Arc;

use drift_resource::{Attributes, Resource, ResourceFactory};
use serde_json::json;
use tracing::debug;

use super::types;
use crate::error::Result;
use crate::middleware::Middleware;
use crate::patterns::{self, Managed};

/// How a parent type maps to its dedicated policy resource
#[derive(Debug, Clone, Copy)]
struct PolicyKind {
    stage: &'static str,
    parent: &'static str,
    child: &'static str,
    /// Child attributes from the parent id and the policy document
    data: fn(&str, &str) -> Attributes,
}

const BUCKET: PolicyKind = PolicyKind {
    stage: "aws_bucket_policy_expander",
    parent: types::S3_BUCKET,
    child: types::S3_BUCKET_POLICY,
    data: |id, policy| json!({"id": id, "bucket": id, "policy": policy}).into(),
};

const SQS_QUEUE: PolicyKind = PolicyKind {
    stage: "aws_sqs_queue_policy_expander",
    parent: types::SQS_QUEUE,
    child: types::SQS_QUEUE_POLICY,
    data: |id, policy| json!({"id": id, "queue_url": id, "policy": policy}).into(),
};

const SNS_TOPIC: PolicyKind = PolicyKind {
    stage: "aws_sns_topic_policy_expander",
    parent: types::SNS_TOPIC,
    child: types::SNS_TOPIC_POLICY,
    data: |id, policy| json!({"id": id, "arn": id, "policy": policy}).into(),
};

const REST_API: PolicyKind = PolicyKind {
    stage: "aws_api_gateway_rest_api_policy_expander",
    parent: types::API_GATEWAY_REST_API,
    child: types::API_GATEWAY_REST_API_POLICY,
    data: |id, policy| json!({"id": id, "rest_api_id": id, "policy": policy}).into(),
};

/// Moves the inline `policy` of a parent resource into its dedicated
/// policy resource, keyed by the parent id.
///
/// When state already declares the dedicated resource, it wins and the
/// inline copy is discarded.
pub struct InlinePolicyExpander {
    kind: PolicyKind,
    factory: Arc<dyn ResourceFactory>,
}

impl InlinePolicyExpander {
    /// `aws_s3_bucket.policy` -> `aws_s3_bucket_policy`
    pub fn bucket(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { kind: BUCKET, factory }
    }

    /// `aws_sqs_queue.policy` -> `aws_sqs_queue_policy`
    pub fn sqs_queue(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { kind: SQS_QUEUE, factory }
    }

    /// `aws_sns_topic.policy` -> `aws_sns_topic_policy`
    pub fn sns_topic(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { kind: SNS_TOPIC, factory }
    }

    /// `aws_api_gateway_rest_api.policy` -> `aws_api_gateway_rest_api_policy`
    pub fn rest_api(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { kind: REST_API, factory }
    }
}

impl Middleware for InlinePolicyExpander {
    fn name(&self) -> &'static str {
        self.kind.stage
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let kind = self.kind;
        patterns::strip(remote, kind.parent, &["policy"]);

        let mut children = Vec::new();
        for parent in state.iter().filter(|r| r.is(kind.parent)) {
            let Some(policy) = parent.attrs.get_non_empty_str("policy") else {
                continue;
            };
            if patterns::contains(state, kind.child, &parent.id) {
                debug!(id = %parent.id, child = kind.child, "Dedicated policy already declared");
                continue;
            }
            children.push(self.factory.create_abstract_resource(
                kind.child,
                &parent.id,
                (kind.data)(&parent.id, policy),
            ));
        }

        patterns::strip(state, kind.parent, &["policy"]);
        for child in children {
            patterns::insert_unless_present(state, child);
        }
        Ok(())
    }
}

/// Drops queue policies holding an empty document, which AWS reports for
/// every queue without a policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsDefaultSqsQueuePolicy;

impl Middleware for AwsDefaultSqsQueuePolicy {
    fn name(&self) -> &'static str {
        "aws_default_sqs_queue_policy"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::SameResource, |r, _| {
            r.is(types::SQS_QUEUE_POLICY) && r.attrs.get_non_empty_str("policy").is_none()
        });
        Ok(())
    }
}
