//! Legacy type names relabelled to their canonical form

use drift_resource::Resource;
use tracing::debug;

use super::types;
use crate::error::Result;
use crate::middleware::Middleware;
use crate::patterns;

/// `aws_alb` is an alias of `aws_lb`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsAlbTransformer;

impl Middleware for AwsAlbTransformer {
    fn name(&self) -> &'static str {
        "aws_alb_transformer"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::retype(remote, types::ALB, types::LB);
        patterns::retype(state, types::ALB, types::LB);
        Ok(())
    }
}

/// `aws_alb_listener` is an alias of `aws_lb_listener`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsAlbListenerTransformer;

impl Middleware for AwsAlbListenerTransformer {
    fn name(&self) -> &'static str {
        "aws_alb_listener_transformer"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::retype(remote, types::ALB_LISTENER, types::LB_LISTENER);
        patterns::retype(state, types::ALB_LISTENER, types::LB_LISTENER);
        Ok(())
    }
}

/// Standalone cluster members are enumerated as `aws_db_instance`; their
/// `aws_rds_cluster_instance` state entries are relabelled to match.
#[derive(Debug, Default, Clone, Copy)]
pub struct RdsClusterInstanceExpander;

impl Middleware for RdsClusterInstanceExpander {
    fn name(&self) -> &'static str {
        "rds_cluster_instance_expander"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        for res in state
            .iter_mut()
            .filter(|r| r.is(types::RDS_CLUSTER_INSTANCE))
        {
            if patterns::contains(remote, types::DB_INSTANCE, &res.id) {
                debug!(id = %res.id, "Relabelling cluster instance as db instance");
                res.resource_type = types::DB_INSTANCE.to_string();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn alb_is_relabelled_on_both_sides() {
        let mut remote = vec![Resource::new(types::ALB, "arn:lb/1", json!({"name": "web"}))];
        let mut state = vec![
            Resource::new(types::ALB, "arn:lb/1", json!({"name": "web"})),
            Resource::new(types::LB, "arn:lb/2", json!({})),
        ];
        AwsAlbTransformer.execute(&mut remote, &mut state).unwrap();

        assert_eq!(remote[0].resource_type, types::LB);
        assert_eq!(remote[0].attrs.get_str("name"), Some("web"));
        assert!(state.iter().all(|r| r.is(types::LB)));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn alb_listener_is_relabelled() {
        let mut remote = vec![Resource::new(types::ALB_LISTENER, "l1", json!({}))];
        let mut state = vec![Resource::new(types::ALB_LISTENER, "l1", json!({}))];
        AwsAlbListenerTransformer
            .execute(&mut remote, &mut state)
            .unwrap();
        assert!(remote[0].is(types::LB_LISTENER));
        assert!(state[0].is(types::LB_LISTENER));
    }

    #[test]
    fn cluster_instance_relabelled_only_when_enumerated_as_db_instance() {
        let mut remote = vec![Resource::new(types::DB_INSTANCE, "db-1", json!({}))];
        let mut state = vec![
            Resource::new(types::RDS_CLUSTER_INSTANCE, "db-1", json!({})),
            Resource::new(types::RDS_CLUSTER_INSTANCE, "db-2", json!({})),
        ];
        RdsClusterInstanceExpander
            .execute(&mut remote, &mut state)
            .unwrap();

        assert!(state[0].is(types::DB_INSTANCE));
        assert!(state[1].is(types::RDS_CLUSTER_INSTANCE));
    }
}
