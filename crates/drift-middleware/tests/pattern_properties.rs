//! Ordering and conservation properties of the reconciliation patterns

use std::collections::BTreeSet;
use std::sync::Arc;

use drift_middleware::Middleware;
use drift_middleware::aws::{
    AwsAlbTransformer, AwsApiGatewayDomainNamesReconciler, VpcSecurityGroupRuleSanitizer, types,
};
use drift_resource::{PassthroughFactory, Resource};
use drift_test_utils::fixtures::{ingress_rule, resource};
use proptest::prelude::*;
use serde_json::json;

fn cidrs(octets: &[u8]) -> Vec<String> {
    octets.iter().map(|o| format!("10.{o}.0.0/16")).collect()
}

fn split_ids(octets: &[u8]) -> BTreeSet<String> {
    let blocks = cidrs(octets);
    let refs: Vec<&str> = blocks.iter().map(String::as_str).collect();
    let mut state = vec![ingress_rule("aggregate", "sg-1", &refs)];
    VpcSecurityGroupRuleSanitizer::new(Arc::new(PassthroughFactory))
        .execute(&mut Vec::new(), &mut state)
        .unwrap();
    assert_eq!(state.len(), octets.len());
    state.into_iter().map(|r| r.id).collect()
}

fn octet_permutations() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    prop::collection::btree_set(any::<u8>(), 2..8)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_flat_map(|sorted| (Just(sorted.clone()), Just(sorted).prop_shuffle()))
}

proptest! {
    #[test]
    fn fan_out_ids_ignore_target_order((sorted, shuffled) in octet_permutations()) {
        let a = split_ids(&sorted);
        let b = split_ids(&shuffled);
        prop_assert_eq!(a.len(), sorted.len());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn alias_unification_loses_nothing(legacy in prop::collection::vec(any::<bool>(), 0..20)) {
        let mut remote: Vec<Resource> = legacy
            .iter()
            .enumerate()
            .map(|(i, &old)| {
                let kind = if old { types::ALB } else { types::LB };
                resource(kind, &format!("lb-{i}"), json!({"name": format!("lb-{i}")}))
            })
            .collect();
        let before = remote.clone();

        AwsAlbTransformer.execute(&mut remote, &mut Vec::new()).unwrap();

        prop_assert_eq!(remote.len(), before.len());
        for (after, original) in remote.iter().zip(&before) {
            prop_assert!(after.is(types::LB));
            prop_assert_eq!(&after.id, &original.id);
            prop_assert_eq!(&after.attrs, &original.attrs);
        }
    }

    #[test]
    fn managed_v1_hides_its_v2_twin(name in "[a-z]{1,12}\\.example\\.com") {
        let v1 = resource(types::API_GATEWAY_DOMAIN_NAME, &name, json!({"domain_name": &name}));
        let v2 = resource(types::APIGATEWAYV2_DOMAIN_NAME, &name, json!({"domain_name": &name}));
        let mut remote = vec![v2, v1.clone()];
        let mut state = vec![v1];

        AwsApiGatewayDomainNamesReconciler.execute(&mut remote, &mut state).unwrap();

        prop_assert_eq!(remote.len(), 1);
        prop_assert!(remote[0].is(types::API_GATEWAY_DOMAIN_NAME));
    }
}
