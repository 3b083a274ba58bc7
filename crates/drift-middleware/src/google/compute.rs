use drift_resource::Resource;
use tracing::debug;

use super::types;
use crate::error::Result;
use crate::middleware::Middleware;

/// Imports into state the instance group each managed group manager
/// creates, found remotely under the manager's name.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleComputeInstanceGroupManagerReconciler;

impl Middleware for GoogleComputeInstanceGroupManagerReconciler {
    fn name(&self) -> &'static str {
        "google_compute_instance_group_manager_reconciler"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let mut out = Vec::with_capacity(state.len());
        let mut imported = Vec::new();
        for manager in state.iter().filter(|r| r.is(types::COMPUTE_INSTANCE_GROUP_MANAGER)) {
            let Some(name) = manager.attrs.get_non_empty_str("name") else {
                continue;
            };
            let group = remote.iter().find(|r| {
                r.is(types::COMPUTE_INSTANCE_GROUP) && r.attrs.get_str("name") == Some(name)
            });
            let already_declared = state.iter().any(|r| {
                r.is(types::COMPUTE_INSTANCE_GROUP) && r.attrs.get_str("name") == Some(name)
            });
            if let (Some(group), false) = (group, already_declared) {
                debug!(id = %group.id, manager = %manager.id, "Importing instance group of group manager");
                imported.push((manager.id.clone(), group.clone()));
            }
        }

        for res in std::mem::take(state) {
            let group = res
                .is(types::COMPUTE_INSTANCE_GROUP_MANAGER)
                .then(|| imported.iter().position(|(manager, _)| *manager == res.id))
                .flatten()
                .map(|index| imported.swap_remove(index).1);
            out.push(res);
            out.extend(group);
        }
        *state = out;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn managed_instance_group_is_imported_after_its_manager() {
        let manager = Resource::new(types::COMPUTE_INSTANCE_GROUP_MANAGER, "appserver-igm", json!({"name": "appserver-igm"}));
        let group = Resource::new(types::COMPUTE_INSTANCE_GROUP, "appserver-igm", json!({"name": "appserver-igm"}));
        let instance = Resource::new(types::COMPUTE_INSTANCE, "fake", json!({}));

        let mut remote = vec![manager.clone(), group.clone()];
        let mut state = vec![manager.clone(), instance.clone()];
        GoogleComputeInstanceGroupManagerReconciler
            .execute(&mut remote, &mut state)
            .unwrap();
        assert_eq!(state, vec![manager.clone(), group.clone(), instance.clone()]);

        // Running again changes nothing
        GoogleComputeInstanceGroupManagerReconciler
            .execute(&mut remote, &mut state)
            .unwrap();
        assert_eq!(state, vec![manager, group, instance]);
    }
}
