//! AWS reconciliation stages

mod aliases;
mod api_gateway;
mod api_gateway_openapi;
mod default_network;
mod ebs;
mod iam;
pub mod ids;
mod instance;
mod network_acl;
mod policy;
mod route53;
mod route_table;
mod s3;
pub mod schema;
mod security_group;
mod tags;
pub mod types;

pub use aliases::{AwsAlbListenerTransformer, AwsAlbTransformer, RdsClusterInstanceExpander};
pub use api_gateway::{
    AwsApiGatewayBasePathMappingReconciler, AwsApiGatewayDeploymentExpander,
    AwsApiGatewayDomainNamesReconciler, AwsApiGatewayResourceExpander,
    AwsConsoleApiGatewayGatewayResponse, AwsDefaultApiGatewayAccount,
};
pub use api_gateway_openapi::AwsApiGatewayApiExpander;
pub use default_network::{
    AwsDefaultInternetGateway, AwsDefaultInternetGatewayRoute, AwsDefaultNetworkAcl,
    AwsDefaultNetworkAclRule, AwsDefaultRoute, AwsDefaultRouteTable, AwsDefaultSubnet,
    AwsDefaultVpc,
};
pub use ebs::AwsEbsEncryptionByDefaultReconciler;
pub use iam::{
    AwsDefaults, AwsRoleManagedPolicyExpander, IamPolicyAttachmentExpander,
    IamPolicyAttachmentTransformer,
};
pub use instance::{AwsInstanceBlockDeviceResourceMapper, AwsInstanceEip, AwsNatGatewayEipAssoc};
pub use network_acl::AwsNetworkAclExpander;
pub use policy::{AwsDefaultSqsQueuePolicy, InlinePolicyExpander};
pub use route53::{Route53DefaultZoneRecordSanitizer, Route53RecordIdReconciler};
pub use route_table::AwsRouteTableExpander;
pub use s3::{AwsS3BucketPublicAccessBlockReconciler, S3BucketAcl};
pub use security_group::{
    AwsDefaultSecurityGroupRule, VpcDefaultSecurityGroupSanitizer, VpcSecurityGroupRuleSanitizer,
    target_count,
};
pub use tags::TagsAllManager;
