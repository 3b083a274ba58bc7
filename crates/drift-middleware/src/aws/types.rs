//! AWS resource type names

pub const ALB: &str = "aws_alb";
pub const ALB_LISTENER: &str = "aws_alb_listener";
pub const LB: &str = "aws_lb";
pub const LB_LISTENER: &str = "aws_lb_listener";

pub const INSTANCE: &str = "aws_instance";
pub const EBS_VOLUME: &str = "aws_ebs_volume";
pub const EBS_ENCRYPTION_BY_DEFAULT: &str = "aws_ebs_encryption_by_default";
pub const EIP: &str = "aws_eip";
pub const EIP_ASSOCIATION: &str = "aws_eip_association";
pub const NAT_GATEWAY: &str = "aws_nat_gateway";

pub const DEFAULT_VPC: &str = "aws_default_vpc";
pub const DEFAULT_SUBNET: &str = "aws_default_subnet";
pub const INTERNET_GATEWAY: &str = "aws_internet_gateway";
pub const ROUTE: &str = "aws_route";
pub const ROUTE_TABLE: &str = "aws_route_table";
pub const DEFAULT_ROUTE_TABLE: &str = "aws_default_route_table";
pub const NETWORK_ACL: &str = "aws_network_acl";
pub const DEFAULT_NETWORK_ACL: &str = "aws_default_network_acl";
pub const NETWORK_ACL_RULE: &str = "aws_network_acl_rule";

pub const SECURITY_GROUP_RULE: &str = "aws_security_group_rule";
pub const DEFAULT_SECURITY_GROUP: &str = "aws_default_security_group";

pub const IAM_ROLE: &str = "aws_iam_role";
pub const IAM_ROLE_POLICY: &str = "aws_iam_role_policy";
pub const IAM_POLICY_ATTACHMENT: &str = "aws_iam_policy_attachment";
pub const IAM_USER_POLICY_ATTACHMENT: &str = "aws_iam_user_policy_attachment";
pub const IAM_ROLE_POLICY_ATTACHMENT: &str = "aws_iam_role_policy_attachment";

pub const S3_BUCKET: &str = "aws_s3_bucket";
pub const S3_BUCKET_POLICY: &str = "aws_s3_bucket_policy";
pub const S3_BUCKET_PUBLIC_ACCESS_BLOCK: &str = "aws_s3_bucket_public_access_block";
pub const SQS_QUEUE: &str = "aws_sqs_queue";
pub const SQS_QUEUE_POLICY: &str = "aws_sqs_queue_policy";
pub const SNS_TOPIC: &str = "aws_sns_topic";
pub const SNS_TOPIC_POLICY: &str = "aws_sns_topic_policy";

pub const ROUTE53_RECORD: &str = "aws_route53_record";

pub const RDS_CLUSTER_INSTANCE: &str = "aws_rds_cluster_instance";
pub const DB_INSTANCE: &str = "aws_db_instance";

pub const API_GATEWAY_ACCOUNT: &str = "aws_api_gateway_account";
pub const API_GATEWAY_REST_API: &str = "aws_api_gateway_rest_api";
pub const API_GATEWAY_REST_API_POLICY: &str = "aws_api_gateway_rest_api_policy";
pub const API_GATEWAY_RESOURCE: &str = "aws_api_gateway_resource";
pub const API_GATEWAY_METHOD: &str = "aws_api_gateway_method";
pub const API_GATEWAY_METHOD_RESPONSE: &str = "aws_api_gateway_method_response";
pub const API_GATEWAY_INTEGRATION: &str = "aws_api_gateway_integration";
pub const API_GATEWAY_INTEGRATION_RESPONSE: &str = "aws_api_gateway_integration_response";
pub const API_GATEWAY_GATEWAY_RESPONSE: &str = "aws_api_gateway_gateway_response";
pub const API_GATEWAY_DEPLOYMENT: &str = "aws_api_gateway_deployment";
pub const API_GATEWAY_STAGE: &str = "aws_api_gateway_stage";
pub const API_GATEWAY_DOMAIN_NAME: &str = "aws_api_gateway_domain_name";
pub const API_GATEWAY_BASE_PATH_MAPPING: &str = "aws_api_gateway_base_path_mapping";

pub const APIGATEWAYV2_API: &str = "aws_apigatewayv2_api";
pub const APIGATEWAYV2_ROUTE: &str = "aws_apigatewayv2_route";
pub const APIGATEWAYV2_INTEGRATION: &str = "aws_apigatewayv2_integration";
pub const APIGATEWAYV2_DOMAIN_NAME: &str = "aws_apigatewayv2_domain_name";
pub const APIGATEWAYV2_API_MAPPING: &str = "aws_apigatewayv2_api_mapping";
