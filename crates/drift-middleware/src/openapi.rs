//! Minimal OpenAPI document model
//!
//! Only the parts needed to derive API gateway resources are read: paths,
//! their operations, declared response codes and the AWS extensions
//! (`x-amazon-apigateway-integration`, `x-amazon-apigateway-gateway-responses`).
//! Both Swagger 2 and OpenAPI 3 share this shape, so a single model covers
//! both once the version marker has been found.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

const INTEGRATION_EXTENSION: &str = "x-amazon-apigateway-integration";
const GATEWAY_RESPONSES_EXTENSION: &str = "x-amazon-apigateway-gateway-responses";

const HTTP_METHODS: &[&str] = &[
    "delete", "get", "head", "options", "patch", "post", "put", "trace",
];

/// The body could not be read as JSON nor as YAML
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct DocumentError(String);

/// Version marker found at the top of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    /// `swagger: "2.0"`
    Swagger2,
    /// `openapi: "3.x"`
    OpenApi3,
}

/// AWS integration attached to an operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Integration {
    /// `type`, upper-cased
    pub integration_type: Option<String>,
    /// `httpMethod`, upper-cased
    pub http_method: Option<String>,
    /// `responses.*.statusCode`, sorted and deduplicated
    pub status_codes: Vec<String>,
}

/// One HTTP operation on a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Upper-cased HTTP method
    pub method: String,
    /// Keys of `responses`
    pub response_codes: Vec<String>,
    pub integration: Option<Integration>,
}

/// Parsed OpenAPI document
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApiDocument {
    pub version: SpecVersion,
    paths: BTreeMap<String, Vec<Operation>>,
    gateway_responses: Vec<String>,
}

impl OpenApiDocument {
    /// Parse a document body.
    ///
    /// JSON is tried first, then YAML. Returns `Ok(None)` for an empty body
    /// or a mapping that carries neither an `openapi` nor a `swagger` key.
    pub fn parse(body: &str) -> Result<Option<Self>, DocumentError> {
        if body.trim().is_empty() {
            return Ok(None);
        }

        let root = match serde_json::from_str::<Value>(body) {
            Ok(value) => value,
            Err(_) => serde_yaml::from_str::<serde_yaml::Value>(body)
                .map(yaml_to_json)
                .map_err(|e| DocumentError(e.to_string()))?,
        };

        let Value::Object(root) = root else {
            return Err(DocumentError(
                "document root must be a mapping".to_string(),
            ));
        };

        let version = if root.contains_key("openapi") {
            SpecVersion::OpenApi3
        } else if root.contains_key("swagger") {
            SpecVersion::Swagger2
        } else {
            return Ok(None);
        };

        let paths = root
            .get("paths")
            .and_then(Value::as_object)
            .map(|paths| {
                paths
                    .iter()
                    .map(|(path, item)| (path.clone(), read_operations(item)))
                    .collect()
            })
            .unwrap_or_default();

        let gateway_responses = root
            .get(GATEWAY_RESPONSES_EXTENSION)
            .and_then(Value::as_object)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();

        Ok(Some(Self {
            version,
            paths,
            gateway_responses,
        }))
    }

    /// Document paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Every path plus all of its ancestor prefixes, sorted.
    ///
    /// `/a/b` implies `/a`, since a nested resource cannot exist without its
    /// parent.
    pub fn resource_paths(&self) -> Vec<String> {
        let mut all = BTreeSet::new();
        for path in self.paths.keys() {
            let mut prefix = String::new();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                prefix.push('/');
                prefix.push_str(segment);
                all.insert(prefix.clone());
            }
            if prefix.is_empty() {
                all.insert(path.clone());
            }
        }
        all.into_iter().collect()
    }

    /// Operations declared on `path`; empty for ancestor-only paths
    pub fn operations(&self, path: &str) -> &[Operation] {
        self.paths.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    /// Keys of the top-level gateway responses extension
    pub fn gateway_responses(&self) -> &[String] {
        &self.gateway_responses
    }
}

fn read_operations(item: &Value) -> Vec<Operation> {
    let Some(item) = item.as_object() else {
        return Vec::new();
    };

    HTTP_METHODS
        .iter()
        .filter_map(|method| {
            let op = item.get(*method)?.as_object()?;
            Some(Operation {
                method: method.to_uppercase(),
                response_codes: op
                    .get("responses")
                    .and_then(Value::as_object)
                    .map(|r| r.keys().cloned().collect())
                    .unwrap_or_default(),
                integration: op
                    .get(INTEGRATION_EXTENSION)
                    .and_then(Value::as_object)
                    .map(read_integration),
            })
        })
        .collect()
}

fn read_integration(ext: &Map<String, Value>) -> Integration {
    let upper = |key: &str| ext.get(key).and_then(Value::as_str).map(str::to_uppercase);

    let status_codes: BTreeSet<String> = ext
        .get("responses")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|responses| responses.values())
        .filter_map(|response| response.get("statusCode"))
        .filter_map(status_code)
        .collect();

    Integration {
        integration_type: upper("type"),
        http_method: upper("httpMethod"),
        status_codes: status_codes.into_iter().collect(),
    }
}

// Numeric codes are rendered without a fractional part.
fn status_code(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i.to_string()),
            None => n.as_f64().map(|f| f.to_string()),
        },
        _ => None,
    }
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map(Value::from).unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .filter_map(|(k, v)| yaml_key(k).map(|k| (k, yaml_to_json(v))))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

// Unquoted status codes come through as numbers.
fn yaml_key(key: serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Some(s),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const YAML_V3: &str = r#"
openapi: 3.0.1
info:
  title: example
paths:
  /path1/path2:
    get:
      responses:
        200:
          description: ok
      x-amazon-apigateway-integration:
        type: http_proxy
        httpMethod: get
        responses:
          default:
            statusCode: 200
x-amazon-apigateway-gateway-responses:
  UNAUTHORIZED:
    statusCode: 401
"#;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("{}")]
    #[case(r#"{"info": {"title": "no marker"}}"#)]
    fn documents_without_marker_are_ignored(#[case] body: &str) {
        assert_eq!(OpenApiDocument::parse(body).unwrap(), None);
    }

    #[rstest]
    #[case("{not json")]
    #[case("just a string")]
    #[case("- a\n- b")]
    fn unreadable_documents_are_rejected(#[case] body: &str) {
        assert!(OpenApiDocument::parse(body).is_err());
    }

    #[test]
    fn yaml_document_with_numeric_keys() {
        let doc = OpenApiDocument::parse(YAML_V3).unwrap().unwrap();
        assert_eq!(doc.version, SpecVersion::OpenApi3);
        assert_eq!(doc.resource_paths(), vec!["/path1", "/path1/path2"]);
        assert!(doc.operations("/path1").is_empty());

        let ops = doc.operations("/path1/path2");
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].method, "GET");
        assert_eq!(ops[0].response_codes, vec!["200"]);

        let integration = ops[0].integration.as_ref().unwrap();
        assert_eq!(integration.integration_type.as_deref(), Some("HTTP_PROXY"));
        assert_eq!(integration.http_method.as_deref(), Some("GET"));
        assert_eq!(integration.status_codes, vec!["200"]);

        assert_eq!(doc.gateway_responses(), ["UNAUTHORIZED".to_string()]);
    }

    #[test]
    fn swagger_json_document() {
        let body = r#"{"swagger": "2.0", "paths": {"/": {"post": {"responses": {"201": {}}}}}}"#;
        let doc = OpenApiDocument::parse(body).unwrap().unwrap();
        assert_eq!(doc.version, SpecVersion::Swagger2);
        assert_eq!(doc.resource_paths(), vec!["/"]);
        assert_eq!(doc.operations("/")[0].method, "POST");
    }

    #[test]
    fn float_status_codes_render_as_integers() {
        assert_eq!(status_code(&serde_json::json!(200.0)), Some("200".to_string()));
        assert_eq!(status_code(&serde_json::json!("4\\d{2}")), Some("4\\d{2}".to_string()));
    }
}
