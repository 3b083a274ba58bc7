//! API Gateway resources outside of OpenAPI bodies

use std::sync::Arc;

use drift_resource::{Attributes, Resource, ResourceFactory};
use tracing::debug;

use super::types;
use crate::error::Result;
use crate::middleware::Middleware;
use crate::patterns::{self, Managed};

/// Replaces state deployments by the stage they implicitly create.
///
/// A deployment with a `stage_name` creates stage `ags-{rest_api_id}-{stage}`.
/// Deployments themselves are never enumerated and leave state.
pub struct AwsApiGatewayDeploymentExpander {
    factory: Arc<dyn ResourceFactory>,
}

impl AwsApiGatewayDeploymentExpander {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }
}

fn stage_id(deployment: &Resource) -> Option<String> {
    let stage = deployment.attrs.get_non_empty_str("stage_name")?;
    let api = deployment.attrs.get_non_empty_str("rest_api_id")?;
    Some(format!("ags-{api}-{stage}"))
}

impl Middleware for AwsApiGatewayDeploymentExpander {
    fn name(&self) -> &'static str {
        "aws_api_gateway_deployment_expander"
    }

    fn execute(&self, _: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let (deployments, kept): (Vec<Resource>, Vec<Resource>) = std::mem::take(state)
            .into_iter()
            .partition(|r| r.is(types::API_GATEWAY_DEPLOYMENT));
        *state = kept;

        for deployment in &deployments {
            let Some(id) = stage_id(deployment) else {
                debug!(id = %deployment.id, "Deployment without stage, dropping");
                continue;
            };
            let stage = self.factory.create_abstract_resource(
                types::API_GATEWAY_STAGE,
                &id,
                Attributes::new(),
            );
            patterns::insert_unless_present(state, stage);
        }
        Ok(())
    }
}

/// Imports the root resource every REST API owns, `/`, into state.
pub struct AwsApiGatewayResourceExpander {
    factory: Arc<dyn ResourceFactory>,
}

impl AwsApiGatewayResourceExpander {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }
}

impl Middleware for AwsApiGatewayResourceExpander {
    fn name(&self) -> &'static str {
        "aws_api_gateway_resource_expander"
    }

    fn execute(&self, _: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let roots: Vec<Resource> = state
            .iter()
            .filter(|r| r.is(types::API_GATEWAY_REST_API))
            .filter_map(|api| {
                let root = api.attrs.get_non_empty_str("root_resource_id")?;
                let mut data = Attributes::new();
                data.insert("rest_api_id", api.id.as_str());
                data.insert("path", "/");
                Some(
                    self.factory
                        .create_abstract_resource(types::API_GATEWAY_RESOURCE, root, data),
                )
            })
            .collect();

        for root in roots {
            patterns::insert_unless_present(state, root);
        }
        Ok(())
    }
}

/// Drops unmanaged gateway responses, which the console creates on its
/// own whenever a REST API is edited there.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsConsoleApiGatewayGatewayResponse;

impl Middleware for AwsConsoleApiGatewayGatewayResponse {
    fn name(&self) -> &'static str {
        "aws_console_api_gateway_gateway_response"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::SameResource, |r, _| {
            r.is(types::API_GATEWAY_GATEWAY_RESPONSE)
        });
        Ok(())
    }
}

/// Drops the API Gateway account settings singleton every region has,
/// unless state manages it.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsDefaultApiGatewayAccount;

impl Middleware for AwsDefaultApiGatewayAccount {
    fn name(&self) -> &'static str {
        "aws_default_api_gateway_account"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::SameResource, |r, _| {
            r.is(types::API_GATEWAY_ACCOUNT)
        });
        Ok(())
    }
}

/// Domain names are listed by both API versions without distinction.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsApiGatewayDomainNamesReconciler;

impl Middleware for AwsApiGatewayDomainNamesReconciler {
    fn name(&self) -> &'static str {
        "aws_api_gateway_domain_names_reconciler"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::reconcile_versions(
            remote,
            state,
            types::API_GATEWAY_DOMAIN_NAME,
            types::APIGATEWAYV2_DOMAIN_NAME,
        );
        Ok(())
    }
}

/// Base path mappings and API mappings are listed by both API versions
/// without distinction.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsApiGatewayBasePathMappingReconciler;

impl Middleware for AwsApiGatewayBasePathMappingReconciler {
    fn name(&self) -> &'static str {
        "aws_api_gateway_base_path_mapping_reconciler"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::reconcile_versions(
            remote,
            state,
            types::API_GATEWAY_BASE_PATH_MAPPING,
            types::APIGATEWAYV2_API_MAPPING,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_resource::PassthroughFactory;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn factory() -> Arc<dyn ResourceFactory> {
        Arc::new(PassthroughFactory)
    }

    #[test]
    fn deployments_become_stages() {
        let existing = Resource::new(types::API_GATEWAY_STAGE, "ags-api-baz", json!({"stage_name": "baz"}));
        let mut state = vec![
            Resource::new(types::API_GATEWAY_DEPLOYMENT, "foo", json!({"stage_name": "foo", "rest_api_id": "api"})),
            Resource::new(types::API_GATEWAY_DEPLOYMENT, "bar", json!({"stage_name": "", "rest_api_id": "api"})),
            Resource::new(types::API_GATEWAY_DEPLOYMENT, "baz", json!({"stage_name": "baz", "rest_api_id": "api"})),
            existing.clone(),
        ];

        AwsApiGatewayDeploymentExpander::new(factory())
            .execute(&mut vec![], &mut state)
            .unwrap();

        assert_eq!(
            state,
            vec![
                existing,
                Resource::new(types::API_GATEWAY_STAGE, "ags-api-foo", json!({})),
            ]
        );
    }

    #[test]
    fn root_resource_is_imported() {
        let mut state = vec![
            Resource::new(types::API_GATEWAY_REST_API, "foo", json!({"root_resource_id": "bar"})),
            Resource::new(types::API_GATEWAY_REST_API, "empty", json!({"root_resource_id": ""})),
            Resource::new(types::API_GATEWAY_REST_API, "unknown", json!({})),
        ];
        let expander = AwsApiGatewayResourceExpander::new(factory());
        expander.execute(&mut vec![], &mut state).unwrap();

        assert_eq!(state.len(), 4);
        assert_eq!(
            state[3],
            Resource::new(types::API_GATEWAY_RESOURCE, "bar", json!({"rest_api_id": "foo", "path": "/"}))
        );

        expander.execute(&mut vec![], &mut state).unwrap();
        assert_eq!(state.len(), 4);
    }

    #[test]
    fn console_gateway_responses_are_dropped_unless_managed() {
        let api = Resource::new(types::API_GATEWAY_REST_API, "rest-api", json!({}));
        let response = Resource::new(types::API_GATEWAY_GATEWAY_RESPONSE, "gtw-response", json!({}));

        let mut remote = vec![api.clone(), response.clone()];
        AwsConsoleApiGatewayGatewayResponse
            .execute(&mut remote, &mut vec![api.clone()])
            .unwrap();
        assert_eq!(remote, vec![api.clone()]);

        let mut remote = vec![api.clone(), response.clone()];
        AwsConsoleApiGatewayGatewayResponse
            .execute(&mut remote, &mut vec![api.clone(), response.clone()])
            .unwrap();
        assert_eq!(remote, vec![api, response]);
    }

    #[test]
    fn account_singleton_is_dropped_unless_managed() {
        let account = Resource::new(types::API_GATEWAY_ACCOUNT, "api-gateway-account", json!({}));
        let mut remote = vec![account.clone()];
        AwsDefaultApiGatewayAccount
            .execute(&mut remote, &mut vec![])
            .unwrap();
        assert!(remote.is_empty());

        let mut remote = vec![account.clone()];
        AwsDefaultApiGatewayAccount
            .execute(&mut remote, &mut vec![account])
            .unwrap();
        assert_eq!(remote.len(), 1);
    }

    #[test]
    fn domain_names_keep_managed_and_unmanaged_v1() {
        let managed_v2 = Resource::new(types::APIGATEWAYV2_DOMAIN_NAME, "example.com", json!({}));
        let mut remote = vec![
            Resource::new(types::API_GATEWAY_DOMAIN_NAME, "example.com", json!({})),
            managed_v2.clone(),
            Resource::new(types::API_GATEWAY_DOMAIN_NAME, "other.com", json!({})),
            Resource::new(types::APIGATEWAYV2_DOMAIN_NAME, "other.com", json!({})),
        ];
        let mut state = vec![managed_v2.clone()];

        AwsApiGatewayDomainNamesReconciler
            .execute(&mut remote, &mut state)
            .unwrap();

        assert_eq!(
            remote,
            vec![
                managed_v2,
                Resource::new(types::API_GATEWAY_DOMAIN_NAME, "other.com", json!({})),
            ]
        );
    }

    #[test]
    fn mappings_keep_managed_and_unmanaged_v1() {
        let mut remote = vec![
            Resource::new(types::APIGATEWAYV2_API_MAPPING, "m-1", json!({})),
            Resource::new(types::API_GATEWAY_BASE_PATH_MAPPING, "m-1", json!({})),
        ];
        AwsApiGatewayBasePathMappingReconciler
            .execute(&mut remote, &mut vec![])
            .unwrap();
        assert_eq!(
            remote,
            vec![Resource::new(types::API_GATEWAY_BASE_PATH_MAPPING, "m-1", json!({}))]
        );
    }
}
