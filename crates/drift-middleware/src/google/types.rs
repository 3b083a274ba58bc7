//! Google resource type names

pub const STORAGE_BUCKET: &str = "google_storage_bucket";
pub const STORAGE_BUCKET_IAM_BINDING: &str = "google_storage_bucket_iam_binding";
pub const STORAGE_BUCKET_IAM_MEMBER: &str = "google_storage_bucket_iam_member";
pub const STORAGE_BUCKET_IAM_POLICY: &str = "google_storage_bucket_iam_policy";

pub const PROJECT_IAM_BINDING: &str = "google_project_iam_binding";
pub const PROJECT_IAM_MEMBER: &str = "google_project_iam_member";
pub const PROJECT_IAM_POLICY: &str = "google_project_iam_policy";

pub const COMPUTE_INSTANCE: &str = "google_compute_instance";
pub const COMPUTE_INSTANCE_GROUP: &str = "google_compute_instance_group";
pub const COMPUTE_INSTANCE_GROUP_MANAGER: &str = "google_compute_instance_group_manager";
