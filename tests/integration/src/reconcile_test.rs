//! End-to-end reconciliation of a mixed AWS, Google and Azure inventory
//!
//! Exercises the full flow: inventories decoded from JSON -> chain assembled
//! from configuration -> both sides reconciled.

use std::sync::Arc;

use drift_middleware::{Alerter, Chain, ReconcileConfig, aws_factory, build_chain};
use drift_resource::{Resource, parse_resources};
use drift_test_utils::RecordingFactory;
use pretty_assertions::assert_eq;

const REMOTE: &str = include_str!("../fixtures/remote.json");
const STATE: &str = include_str!("../fixtures/state.json");

fn inventories() -> (Vec<Resource>, Vec<Resource>) {
    (parse_resources(REMOTE).unwrap(), parse_resources(STATE).unwrap())
}

fn chain(config: &ReconcileConfig) -> Chain {
    build_chain(config, aws_factory(), Arc::new(Alerter::new())).unwrap()
}

fn has(collection: &[Resource], resource_type: &str, id: &str) -> bool {
    collection.iter().any(|r| r.is(resource_type) && r.id == id)
}

#[test]
fn test_full_chain_reconciles_inventories() {
    let _ = drift_middleware::logging::init_with_default("warn");
    let (mut remote, mut state) = inventories();
    chain(&ReconcileConfig::default())
        .execute(&mut remote, &mut state)
        .unwrap();

    // Provider-created defaults are gone from remote
    for default in ["vpc-1", "subnet-1", "igw-1", "rtb-1", "acl-1", "sg-default"] {
        assert!(remote.iter().all(|r| r.id != default), "{default} kept");
    }

    // Aliases unified on both sides
    assert!(has(&remote, "aws_lb", "lb-1"));
    assert!(has(&state, "aws_lb", "lb-1"));

    // Multi-target rule split in two
    let rules = state
        .iter()
        .filter(|r| r.is("aws_security_group_rule"))
        .count();
    assert_eq!(rules, 2);
    assert!(!has(&state, "aws_security_group_rule", "sgrule-aggregate"));

    // Inline policy turned into its own resource, removed from both buckets
    assert!(has(&state, "aws_s3_bucket_policy", "bucket-1"));
    for side in [&remote, &state] {
        let bucket = side.iter().find(|r| r.is("aws_s3_bucket")).unwrap();
        assert!(!bucket.attrs.contains_key("policy"));
    }

    // Effective tags compared
    let bucket = state.iter().find(|r| r.is("aws_s3_bucket")).unwrap();
    assert_eq!(bucket.attrs.get_map("tags").map(|m| m.len()), Some(2));

    // OpenAPI body imported the path resource and its method
    assert!(has(&state, "aws_api_gateway_resource", "res-1"));
    let method = state
        .iter()
        .find(|r| r.is("aws_api_gateway_method"))
        .unwrap();
    assert_eq!(method.attrs.get_str("authorization"), Some("NONE"));

    // Azure route and Google members expanded
    assert!(has(&state, "azurerm_route", "table1/routes/r1"));
    let members: Vec<&str> = state
        .iter()
        .filter(|r| r.is("google_storage_bucket_iam_member"))
        .map(Resource::id)
        .collect();
    assert_eq!(
        members,
        vec![
            "b/roles/storage.admin/user:a@example.com",
            "b/roles/storage.admin/group:ops@example.com",
        ]
    );
}

#[test]
fn test_full_chain_is_idempotent() {
    let chain = chain(&ReconcileConfig::default());
    let (mut remote, mut state) = inventories();

    chain.execute(&mut remote, &mut state).unwrap();
    let (remote_once, state_once) = (remote.clone(), state.clone());

    chain.execute(&mut remote, &mut state).unwrap();
    assert_eq!(remote, remote_once);
    assert_eq!(state, state_once);
}

#[test]
fn test_strict_mode_is_idempotent_too() {
    let chain = chain(&ReconcileConfig::parse("strict = true").unwrap());
    let (mut remote, mut state) = inventories();

    chain.execute(&mut remote, &mut state).unwrap();
    let once = (remote.clone(), state.clone());
    chain.execute(&mut remote, &mut state).unwrap();
    assert_eq!((remote, state), once);
}

#[test]
fn test_provider_selection_leaves_other_clouds_untouched() {
    let chain = chain(&ReconcileConfig::parse(r#"providers = ["google", "azurerm"]"#).unwrap());
    let (mut remote, mut state) = inventories();
    chain.execute(&mut remote, &mut state).unwrap();

    // AWS stages did not run
    assert!(has(&remote, "aws_default_vpc", "vpc-1"));
    assert!(has(&state, "aws_alb", "lb-1"));
    // Others did
    assert!(has(&state, "azurerm_route", "table1/routes/r1"));
}

#[test]
fn test_factory_sees_every_synthesized_resource() {
    let factory = Arc::new(RecordingFactory::wrapping(aws_factory()));
    let chain = build_chain(
        &ReconcileConfig::default(),
        factory.clone(),
        Arc::new(Alerter::new()),
    )
    .unwrap();
    let (mut remote, mut state) = inventories();
    chain.execute(&mut remote, &mut state).unwrap();

    assert_eq!(factory.count("aws_security_group_rule"), 2);
    assert_eq!(factory.count("aws_s3_bucket_policy"), 1);
    assert_eq!(factory.count("azurerm_route"), 1);
    assert_eq!(factory.count("google_storage_bucket_iam_member"), 2);
}
