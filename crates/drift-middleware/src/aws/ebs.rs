use std::sync::Arc;

use drift_resource::{Attributes, Resource, ResourceFactory};
use tracing::debug;

use super::types;
use crate::error::Result;
use crate::middleware::Middleware;

/// Reconciles the per-region EBS encryption-by-default setting.
///
/// AWS exposes the setting as a singleton without a stable id while
/// configuration gives it a generated one. When state declares it, the
/// remote singleton takes the state id. When nothing manages it, a disabled
/// setting is the account default and is dropped.
pub struct AwsEbsEncryptionByDefaultReconciler {
    factory: Arc<dyn ResourceFactory>,
}

impl AwsEbsEncryptionByDefaultReconciler {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }
}

impl Middleware for AwsEbsEncryptionByDefaultReconciler {
    fn name(&self) -> &'static str {
        "aws_ebs_encryption_by_default_reconciler"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let Some(index) = remote
            .iter()
            .position(|r| r.is(types::EBS_ENCRYPTION_BY_DEFAULT))
        else {
            return Ok(());
        };
        let enabled = remote[index].attrs.get_bool("enabled").unwrap_or(false);

        match state.iter().find(|r| r.is(types::EBS_ENCRYPTION_BY_DEFAULT)) {
            Some(managed) => {
                let mut data = Attributes::new();
                data.insert("id", managed.id.as_str());
                data.insert("enabled", enabled);
                debug!(id = %managed.id, "Using state id for EBS encryption by default");
                remote[index] = self.factory.create_abstract_resource(
                    types::EBS_ENCRYPTION_BY_DEFAULT,
                    &managed.id,
                    data,
                );
            }
            None if !enabled => {
                debug!(id = %remote[index].id, "Ignoring disabled EBS encryption by default");
                remote.remove(index);
            }
            None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_resource::PassthroughFactory;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const STATE_ID: &str = "terraform-20220328091515068500000001";

    fn reconciler() -> AwsEbsEncryptionByDefaultReconciler {
        AwsEbsEncryptionByDefaultReconciler::new(Arc::new(PassthroughFactory))
    }

    fn bucket() -> Resource {
        Resource::new(types::S3_BUCKET, "bucket-1", json!({}))
    }

    #[test]
    fn managed_setting_takes_state_id() {
        let managed = Resource::new(
            types::EBS_ENCRYPTION_BY_DEFAULT,
            STATE_ID,
            json!({"id": STATE_ID, "enabled": true}),
        );
        let mut remote = vec![
            bucket(),
            Resource::new(types::EBS_ENCRYPTION_BY_DEFAULT, "test-encryption", json!({"enabled": true})),
        ];
        let mut state = vec![bucket(), managed.clone()];

        reconciler().execute(&mut remote, &mut state).unwrap();

        assert_eq!(remote, vec![bucket(), managed.clone()]);
        assert_eq!(state, vec![bucket(), managed]);
    }

    #[test]
    fn unmanaged_setting_is_kept_only_when_enabled() {
        let enabled = Resource::new(types::EBS_ENCRYPTION_BY_DEFAULT, "test-encryption", json!({"enabled": true}));
        let mut remote = vec![bucket(), enabled.clone()];
        reconciler().execute(&mut remote, &mut vec![bucket()]).unwrap();
        assert_eq!(remote, vec![bucket(), enabled]);

        let mut remote = vec![
            Resource::new(types::EBS_ENCRYPTION_BY_DEFAULT, "test-encryption", json!({"enabled": false})),
            bucket(),
        ];
        reconciler().execute(&mut remote, &mut vec![bucket()]).unwrap();
        assert_eq!(remote, vec![bucket()]);
    }

    #[test]
    fn missing_remote_setting_leaves_state_alone() {
        let declared = Resource::new(types::EBS_ENCRYPTION_BY_DEFAULT, "test-encryption", json!({"enabled": true}));
        let mut remote = vec![bucket()];
        let mut state = vec![bucket(), declared.clone()];
        reconciler().execute(&mut remote, &mut state).unwrap();
        assert_eq!(remote, vec![bucket()]);
        assert_eq!(state, vec![bucket(), declared]);
    }
}
