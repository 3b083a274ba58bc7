//! Google Cloud reconciliation stages

mod compute;
mod iam;
pub mod types;

pub use compute::GoogleComputeInstanceGroupManagerReconciler;
pub use iam::{
    GoogleDefaultIamMember, GoogleIamBindingTransformer, GoogleIamPolicyTransformer,
    GoogleLegacyBucketIamMember,
};
