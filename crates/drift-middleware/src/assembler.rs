//! Builds the reconciliation chain in its canonical order
//!
//! Stage order is part of the contract: later stages rely on the rewrites
//! of earlier ones (type aliases unified, ids reconciled, children expanded).
//! [`CANONICAL_ORDER`] is the single source of that order.

use std::sync::Arc;

use drift_resource::{ResourceFactory, SchemaRepository, SchemaResourceFactory};
use tracing::{debug, info};

use crate::alert::Alerter;
use crate::chain::Chain;
use crate::config::{Provider, ReconcileConfig};
use crate::error::{Error, Result};
use crate::middleware::Middleware;
use crate::{aws, azurerm, google};

/// Every stage name, in execution order.
pub const CANONICAL_ORDER: &[&str] = &[
    "route53_record_id_reconciler",
    "route53_default_zone_record_sanitizer",
    "s3_bucket_acl",
    "aws_instance_block_device_resource_mapper",
    "aws_default_security_group_rule",
    "vpc_default_security_group_sanitizer",
    "vpc_security_group_rule_sanitizer",
    "iam_policy_attachment_transformer",
    "iam_policy_attachment_expander",
    "aws_instance_eip",
    "aws_default_internet_gateway_route",
    "aws_default_internet_gateway",
    "aws_default_vpc",
    "aws_default_subnet",
    "aws_route_table_expander",
    "aws_default_route_table",
    "aws_default_route",
    "aws_default_network_acl",
    "aws_default_network_acl_rule",
    "aws_network_acl_expander",
    "aws_bucket_policy_expander",
    "aws_sqs_queue_policy_expander",
    "aws_default_sqs_queue_policy",
    "aws_sns_topic_policy_expander",
    "aws_role_managed_policy_expander",
    "tags_all_manager",
    "aws_nat_gateway_eip_assoc",
    "rds_cluster_instance_expander",
    "aws_api_gateway_deployment_expander",
    "aws_api_gateway_resource_expander",
    "aws_api_gateway_api_expander",
    "aws_api_gateway_rest_api_policy_expander",
    "aws_console_api_gateway_gateway_response",
    "aws_api_gateway_domain_names_reconciler",
    "aws_api_gateway_base_path_mapping_reconciler",
    "aws_ebs_encryption_by_default_reconciler",
    "aws_alb_transformer",
    "aws_alb_listener_transformer",
    "google_iam_binding_transformer",
    "google_iam_policy_transformer",
    "google_compute_instance_group_manager_reconciler",
    "azurerm_route_expander",
    "azurerm_subnet_expander",
    "aws_s3_bucket_public_access_block_reconciler",
    "aws_defaults",
    "google_legacy_bucket_iam_member",
    "google_default_iam_member",
    "aws_default_api_gateway_account",
];

/// Stages that hide provider-created defaults. Strict mode leaves them out
/// so those defaults surface as unmanaged drift.
pub const STRICT_EXCLUDED: &[&str] = &[
    "aws_defaults",
    "google_legacy_bucket_iam_member",
    "google_default_iam_member",
    "aws_default_api_gateway_account",
];

/// Factory with every AWS normalizer registered.
pub fn aws_factory() -> Arc<dyn ResourceFactory> {
    let mut schemas = SchemaRepository::new();
    aws::schema::register(&mut schemas);
    Arc::new(SchemaResourceFactory::new(schemas))
}

/// Instantiate a single stage by name.
///
/// # Errors
///
/// Returns [`Error::UnknownMiddleware`] for a name outside
/// [`CANONICAL_ORDER`].
pub fn stage(
    name: &str,
    factory: &Arc<dyn ResourceFactory>,
    alerter: &Arc<Alerter>,
) -> Result<Box<dyn Middleware>> {
    let f = Arc::clone(factory);
    let stage: Box<dyn Middleware> = match name {
        "route53_record_id_reconciler" => Box::new(aws::Route53RecordIdReconciler),
        "route53_default_zone_record_sanitizer" => Box::new(aws::Route53DefaultZoneRecordSanitizer),
        "s3_bucket_acl" => Box::new(aws::S3BucketAcl),
        "aws_instance_block_device_resource_mapper" => {
            Box::new(aws::AwsInstanceBlockDeviceResourceMapper::new(f))
        }
        "aws_default_security_group_rule" => Box::new(aws::AwsDefaultSecurityGroupRule),
        "vpc_default_security_group_sanitizer" => Box::new(aws::VpcDefaultSecurityGroupSanitizer),
        "vpc_security_group_rule_sanitizer" => Box::new(aws::VpcSecurityGroupRuleSanitizer::new(f)),
        "iam_policy_attachment_transformer" => Box::new(aws::IamPolicyAttachmentTransformer::new(f)),
        "iam_policy_attachment_expander" => Box::new(aws::IamPolicyAttachmentExpander::new(f)),
        "aws_instance_eip" => Box::new(aws::AwsInstanceEip),
        "aws_default_internet_gateway_route" => Box::new(aws::AwsDefaultInternetGatewayRoute),
        "aws_default_internet_gateway" => Box::new(aws::AwsDefaultInternetGateway),
        "aws_default_vpc" => Box::new(aws::AwsDefaultVpc),
        "aws_default_subnet" => Box::new(aws::AwsDefaultSubnet),
        "aws_route_table_expander" => {
            Box::new(aws::AwsRouteTableExpander::new(Arc::clone(alerter), f))
        }
        "aws_default_route_table" => Box::new(aws::AwsDefaultRouteTable),
        "aws_default_route" => Box::new(aws::AwsDefaultRoute),
        "aws_default_network_acl" => Box::new(aws::AwsDefaultNetworkAcl),
        "aws_default_network_acl_rule" => Box::new(aws::AwsDefaultNetworkAclRule),
        "aws_network_acl_expander" => Box::new(aws::AwsNetworkAclExpander::new(f)),
        "aws_bucket_policy_expander" => Box::new(aws::InlinePolicyExpander::bucket(f)),
        "aws_sqs_queue_policy_expander" => Box::new(aws::InlinePolicyExpander::sqs_queue(f)),
        "aws_default_sqs_queue_policy" => Box::new(aws::AwsDefaultSqsQueuePolicy),
        "aws_sns_topic_policy_expander" => Box::new(aws::InlinePolicyExpander::sns_topic(f)),
        "aws_role_managed_policy_expander" => Box::new(aws::AwsRoleManagedPolicyExpander::new(f)),
        "tags_all_manager" => Box::new(aws::TagsAllManager),
        "aws_nat_gateway_eip_assoc" => Box::new(aws::AwsNatGatewayEipAssoc),
        "rds_cluster_instance_expander" => Box::new(aws::RdsClusterInstanceExpander),
        "aws_api_gateway_deployment_expander" => {
            Box::new(aws::AwsApiGatewayDeploymentExpander::new(f))
        }
        "aws_api_gateway_resource_expander" => Box::new(aws::AwsApiGatewayResourceExpander::new(f)),
        "aws_api_gateway_api_expander" => Box::new(aws::AwsApiGatewayApiExpander::new(f)),
        "aws_api_gateway_rest_api_policy_expander" => {
            Box::new(aws::InlinePolicyExpander::rest_api(f))
        }
        "aws_console_api_gateway_gateway_response" => {
            Box::new(aws::AwsConsoleApiGatewayGatewayResponse)
        }
        "aws_api_gateway_domain_names_reconciler" => {
            Box::new(aws::AwsApiGatewayDomainNamesReconciler)
        }
        "aws_api_gateway_base_path_mapping_reconciler" => {
            Box::new(aws::AwsApiGatewayBasePathMappingReconciler)
        }
        "aws_ebs_encryption_by_default_reconciler" => {
            Box::new(aws::AwsEbsEncryptionByDefaultReconciler::new(f))
        }
        "aws_alb_transformer" => Box::new(aws::AwsAlbTransformer),
        "aws_alb_listener_transformer" => Box::new(aws::AwsAlbListenerTransformer),
        "google_iam_binding_transformer" => Box::new(google::GoogleIamBindingTransformer::new(f)),
        "google_iam_policy_transformer" => Box::new(google::GoogleIamPolicyTransformer::new(f)),
        "google_compute_instance_group_manager_reconciler" => {
            Box::new(google::GoogleComputeInstanceGroupManagerReconciler)
        }
        "azurerm_route_expander" => Box::new(azurerm::AzurermRouteExpander::new(f)),
        "azurerm_subnet_expander" => Box::new(azurerm::AzurermSubnetExpander::new(f)),
        "aws_s3_bucket_public_access_block_reconciler" => {
            Box::new(aws::AwsS3BucketPublicAccessBlockReconciler)
        }
        "aws_defaults" => Box::new(aws::AwsDefaults),
        "google_legacy_bucket_iam_member" => Box::new(google::GoogleLegacyBucketIamMember),
        "google_default_iam_member" => Box::new(google::GoogleDefaultIamMember),
        "aws_default_api_gateway_account" => Box::new(aws::AwsDefaultApiGatewayAccount),
        other => return Err(Error::UnknownMiddleware(other.to_string())),
    };
    Ok(stage)
}

/// Assemble the chain described by `config`.
///
/// Stages keep their canonical relative order. A stage is left out when
/// its provider is not selected, when it is listed in `disabled`, or when
/// strict mode excludes it.
pub fn build_chain(
    config: &ReconcileConfig,
    factory: Arc<dyn ResourceFactory>,
    alerter: Arc<Alerter>,
) -> Result<Chain> {
    config.validate()?;

    let mut chain = Chain::new();
    for &name in CANONICAL_ORDER {
        if config.strict && STRICT_EXCLUDED.contains(&name) {
            debug!(stage = name, "Strict mode, stage left out");
            continue;
        }
        if !config.provider_enabled(Provider::of_stage(name)) || config.is_disabled(name) {
            debug!(stage = name, "Stage disabled");
            continue;
        }
        chain.push(stage(name, &factory, &alerter)?);
    }

    info!(stages = chain.len(), strict = config.strict, "Assembled reconciliation chain");
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_resource::PassthroughFactory;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn build(config: &ReconcileConfig) -> Chain {
        build_chain(config, Arc::new(PassthroughFactory), Arc::new(Alerter::new())).unwrap()
    }

    #[test]
    fn every_stage_reports_its_canonical_name() {
        let factory: Arc<dyn ResourceFactory> = Arc::new(PassthroughFactory);
        let alerter = Arc::new(Alerter::new());
        for &name in CANONICAL_ORDER {
            assert_eq!(stage(name, &factory, &alerter).unwrap().name(), name);
        }
    }

    #[test]
    fn canonical_order_has_no_duplicates() {
        let unique: HashSet<_> = CANONICAL_ORDER.iter().collect();
        assert_eq!(unique.len(), CANONICAL_ORDER.len());
    }

    #[test]
    fn default_config_runs_every_stage() {
        let chain = build(&ReconcileConfig::default());
        assert_eq!(chain.names(), CANONICAL_ORDER.to_vec());
    }

    #[test]
    fn strict_mode_drops_default_suppression() {
        let chain = build(&ReconcileConfig {
            strict: true,
            ..Default::default()
        });
        let names = chain.names();
        assert_eq!(names.len(), CANONICAL_ORDER.len() - STRICT_EXCLUDED.len());
        assert!(STRICT_EXCLUDED.iter().all(|name| !names.contains(name)));
        // Unrelated default filters stay
        assert!(names.contains(&"aws_default_vpc"));
    }

    #[test]
    fn provider_selection_filters_stages() {
        let chain = build(&ReconcileConfig {
            providers: vec![Provider::Azurerm],
            ..Default::default()
        });
        insta::assert_yaml_snapshot!(chain.names(), @r"
        - azurerm_route_expander
        - azurerm_subnet_expander
        ");
    }

    #[test]
    fn disabled_stage_is_skipped() {
        let chain = build(&ReconcileConfig {
            disabled: vec!["tags_all_manager".to_string()],
            ..Default::default()
        });
        assert!(!chain.names().contains(&"tags_all_manager"));
        assert_eq!(chain.len(), CANONICAL_ORDER.len() - 1);
    }

    #[test]
    fn unknown_stage_name_is_an_error() {
        let factory: Arc<dyn ResourceFactory> = Arc::new(PassthroughFactory);
        let err = stage("nope", &factory, &Arc::new(Alerter::new())).err().unwrap();
        assert!(matches!(err, Error::UnknownMiddleware(name) if name == "nope"));
    }

    #[test]
    fn canonical_order_snapshot() {
        insta::assert_yaml_snapshot!(CANONICAL_ORDER, @r"
        - route53_record_id_reconciler
        - route53_default_zone_record_sanitizer
        - s3_bucket_acl
        - aws_instance_block_device_resource_mapper
        - aws_default_security_group_rule
        - vpc_default_security_group_sanitizer
        - vpc_security_group_rule_sanitizer
        - iam_policy_attachment_transformer
        - iam_policy_attachment_expander
        - aws_instance_eip
        - aws_default_internet_gateway_route
        - aws_default_internet_gateway
        - aws_default_vpc
        - aws_default_subnet
        - aws_route_table_expander
        - aws_default_route_table
        - aws_default_route
        - aws_default_network_acl
        - aws_default_network_acl_rule
        - aws_network_acl_expander
        - aws_bucket_policy_expander
        - aws_sqs_queue_policy_expander
        - aws_default_sqs_queue_policy
        - aws_sns_topic_policy_expander
        - aws_role_managed_policy_expander
        - tags_all_manager
        - aws_nat_gateway_eip_assoc
        - rds_cluster_instance_expander
        - aws_api_gateway_deployment_expander
        - aws_api_gateway_resource_expander
        - aws_api_gateway_api_expander
        - aws_api_gateway_rest_api_policy_expander
        - aws_console_api_gateway_gateway_response
        - aws_api_gateway_domain_names_reconciler
        - aws_api_gateway_base_path_mapping_reconciler
        - aws_ebs_encryption_by_default_reconciler
        - aws_alb_transformer
        - aws_alb_listener_transformer
        - google_iam_binding_transformer
        - google_iam_policy_transformer
        - google_compute_instance_group_manager_reconciler
        - azurerm_route_expander
        - azurerm_subnet_expander
        - aws_s3_bucket_public_access_block_reconciler
        - aws_defaults
        - google_legacy_bucket_iam_member
        - google_default_iam_member
        - aws_default_api_gateway_account
        ");
    }
}
