//! Resources declared through the OpenAPI `body` of an API
//!
//! An API defined from an OpenAPI document owns every resource, method,
//! integration and gateway response the document describes, without state
//! declaring them. They are imported into state so the remote copies are
//! not reported as unmanaged.

use std::collections::HashSet;
use std::sync::Arc;

use drift_resource::{Attributes, Resource, ResourceFactory};
use tracing::debug;

use super::types;
use crate::error::{Error, Result};
use crate::middleware::Middleware;
use crate::openapi::{OpenApiDocument, Operation};

/// Expands the `body` of REST and routed APIs into their derived resources.
///
/// Path resources, routes and integrations carry ids assigned by AWS and
/// are only imported when a matching remote resource exists. Methods,
/// responses and gateway responses use derived ids.
pub struct AwsApiGatewayApiExpander {
    factory: Arc<dyn ResourceFactory>,
}

/// Derived resources of one API, deduplicated against state
struct Derived<'a> {
    remote: &'a [Resource],
    known: &'a mut HashSet<(String, String)>,
    factory: &'a dyn ResourceFactory,
    out: Vec<Resource>,
}

impl Derived<'_> {
    fn push(&mut self, resource: Resource) {
        let key = (resource.resource_type.clone(), resource.id.clone());
        if !self.known.insert(key) {
            debug!(id = %resource.id, resource_type = %resource.resource_type, "Resource already in state, skipping");
            return;
        }
        debug!(id = %resource.id, resource_type = %resource.resource_type, "Importing resource from OpenAPI body");
        self.out.push(resource);
    }

    /// Import `found` under its own id with `attrs`
    fn import(&mut self, found: &Resource, attrs: Attributes) {
        let resource = self
            .factory
            .create_abstract_resource(found.resource_type(), found.id(), attrs);
        self.push(resource);
    }

    /// Child with a derived id, taking its attributes from a remote twin
    fn derive(&mut self, resource_type: &str, id: String) {
        let attrs = self
            .remote
            .iter()
            .find(|r| r.is(resource_type) && r.id == id)
            .map(|r| r.attrs.clone())
            .unwrap_or_default();
        let resource = self.factory.create_abstract_resource(resource_type, &id, attrs);
        self.push(resource);
    }
}

impl AwsApiGatewayApiExpander {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }

    fn expand_rest_api(&self, api: &str, doc: &OpenApiDocument, derived: &mut Derived<'_>) {
        let remote = derived.remote;
        for path in doc.resource_paths() {
            let Some(found) = remote.iter().find(|r| {
                r.is(types::API_GATEWAY_RESOURCE)
                    && r.attrs.get_str("rest_api_id") == Some(api)
                    && r.attrs.get_str("path") == Some(path.as_str())
            }) else {
                debug!(api, path = %path, "No remote resource for OpenAPI path");
                continue;
            };

            let mut attrs = Attributes::new();
            attrs.insert("rest_api_id", api);
            attrs.insert("path", path.as_str());
            derived.import(found, attrs);

            let resource_id = found.id.clone();
            for op in doc.operations(&path) {
                self.expand_operation(api, &resource_id, op, derived);
            }
        }

        for key in doc.gateway_responses() {
            derived.derive(types::API_GATEWAY_GATEWAY_RESPONSE, format!("aggr-{api}-{key}"));
        }
    }

    fn expand_operation(&self, api: &str, resource_id: &str, op: &Operation, derived: &mut Derived<'_>) {
        let method = &op.method;
        derived.derive(
            types::API_GATEWAY_METHOD,
            format!("agm-{api}-{resource_id}-{method}"),
        );
        for code in &op.response_codes {
            derived.derive(
                types::API_GATEWAY_METHOD_RESPONSE,
                format!("agmr-{api}-{resource_id}-{method}-{code}"),
            );
        }
        derived.derive(
            types::API_GATEWAY_INTEGRATION,
            format!("agi-{api}-{resource_id}-{method}"),
        );
        if let Some(integration) = &op.integration {
            for code in &integration.status_codes {
                derived.derive(
                    types::API_GATEWAY_INTEGRATION_RESPONSE,
                    format!("agir-{api}-{resource_id}-{method}-{code}"),
                );
            }
        }
    }

    fn expand_routed_api(&self, api: &str, doc: &OpenApiDocument, derived: &mut Derived<'_>) {
        let remote = derived.remote;
        for path in doc.paths() {
            for op in doc.operations(path) {
                let route_key = format!("{} {}", op.method, path);
                if let Some(route) = remote.iter().find(|r| {
                    r.is(types::APIGATEWAYV2_ROUTE)
                        && r.attrs.get_str("api_id") == Some(api)
                        && r.attrs.get_str("route_key") == Some(route_key.as_str())
                }) {
                    derived.import(route, route.attrs.clone());
                } else {
                    debug!(api, route_key = %route_key, "No remote route for OpenAPI operation");
                }

                let Some(integration) = &op.integration else {
                    continue;
                };
                let found = remote.iter().find(|r| {
                    r.is(types::APIGATEWAYV2_INTEGRATION)
                        && r.attrs.get_str("api_id") == Some(api)
                        && upper(r.attrs.get_str("integration_type")) == integration.integration_type
                        && upper(r.attrs.get_str("integration_method")) == integration.http_method
                });
                if let Some(found) = found {
                    derived.import(found, found.attrs.clone());
                }
            }
        }
    }
}

fn upper(value: Option<&str>) -> Option<String> {
    value.map(str::to_uppercase)
}

fn parse_body(api: &Resource) -> Result<Option<OpenApiDocument>> {
    let Some(body) = api.attrs.get_str("body") else {
        return Ok(None);
    };
    OpenApiDocument::parse(body).map_err(|e| {
        Error::malformed("openapi", &api.resource_type, &api.id, e.to_string())
    })
}

impl Middleware for AwsApiGatewayApiExpander {
    fn name(&self) -> &'static str {
        "aws_api_gateway_api_expander"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let mut known: HashSet<(String, String)> = state
            .iter()
            .map(|r| (r.resource_type.clone(), r.id.clone()))
            .collect();

        let mut out = Vec::with_capacity(state.len());
        let mut pending = std::mem::take(state).into_iter();
        while let Some(api) = pending.next() {
            let is_rest = api.is(types::API_GATEWAY_REST_API);
            if !is_rest && !api.is(types::APIGATEWAYV2_API) {
                out.push(api);
                continue;
            }

            let doc = match parse_body(&api) {
                Ok(Some(doc)) => doc,
                Ok(None) => {
                    out.push(api);
                    continue;
                }
                Err(err) => {
                    // Keep state whole for the caller before failing
                    out.push(api);
                    out.extend(pending);
                    *state = out;
                    return Err(err);
                }
            };

            let mut derived = Derived {
                remote: remote.as_slice(),
                known: &mut known,
                factory: self.factory.as_ref(),
                out: Vec::new(),
            };
            if is_rest {
                self.expand_rest_api(&api.id, &doc, &mut derived);
            } else {
                self.expand_routed_api(&api.id, &doc, &mut derived);
            }
            let children = derived.out;

            out.push(api);
            out.extend(children);
        }
        *state = out;
        Ok(())
    }
}
