//! S3 buckets

use drift_resource::Resource;
use tracing::debug;

use super::types;
use crate::error::Result;
use crate::middleware::Middleware;
use crate::patterns::{self, Managed};

const PUBLIC_ACCESS_FLAGS: [&str; 4] = [
    "block_public_acls",
    "block_public_policy",
    "ignore_public_acls",
    "restrict_public_buckets",
];

/// Reconciles canned ACLs with explicit grants.
///
/// `acl` only exists in configuration and is dropped on both sides. A
/// canned ACL other than `private` expands into grants AWS reports back,
/// so the remote `grant` list of such a bucket is dropped too.
#[derive(Debug, Default, Clone, Copy)]
pub struct S3BucketAcl;

impl Middleware for S3BucketAcl {
    fn name(&self) -> &'static str {
        "s3_bucket_acl"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        for bucket in state.iter_mut().filter(|r| r.is(types::S3_BUCKET)) {
            let Some(acl) = bucket.attrs.remove("acl") else {
                continue;
            };
            let canned = acl.as_str().unwrap_or_default();
            if canned.is_empty() || canned == "private" {
                continue;
            }
            if let Some(found) = remote
                .iter_mut()
                .find(|r| r.is(types::S3_BUCKET) && r.id == bucket.id)
            {
                debug!(id = %found.id, acl = canned, "Ignoring remote grants of bucket with canned ACL");
                found.attrs.remove("grant");
            }
        }

        patterns::strip(remote, types::S3_BUCKET, &["acl"]);
        Ok(())
    }
}

/// Drops unmanaged public access blocks with every flag off.
///
/// AWS answers either with an error or with such a block for buckets
/// without one, so both read the same.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsS3BucketPublicAccessBlockReconciler;

fn is_default_access_block(res: &Resource, _: &[Resource]) -> bool {
    res.is(types::S3_BUCKET_PUBLIC_ACCESS_BLOCK)
        && PUBLIC_ACCESS_FLAGS
            .iter()
            .all(|flag| !res.attrs.get_bool(flag).unwrap_or(false))
}

impl Middleware for AwsS3BucketPublicAccessBlockReconciler {
    fn name(&self) -> &'static str {
        "aws_s3_bucket_public_access_block_reconciler"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::Equal, is_default_access_block);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn grant() -> serde_json::Value {
        json!([{"id": "356616ba70ebbea2", "permissions": ["FULL_CONTROL"], "type": "CanonicalUser", "uri": ""}])
    }

    #[rstest]
    #[case::public_read(Some("public-read"), false)]
    #[case::private(Some("private"), true)]
    #[case::undefined(None, true)]
    fn remote_grants_follow_canned_acl(#[case] acl: Option<&str>, #[case] grant_kept: bool) {
        let mut remote = vec![Resource::new(
            types::S3_BUCKET,
            "testgrant",
            json!({"grant": grant(), "acl": "ignored"}),
        )];
        let mut state = vec![
            Resource::new("aws_ami", "ami-1", json!({})),
            Resource::new(types::S3_BUCKET, "testgrant", json!({"acl": acl})),
        ];

        S3BucketAcl.execute(&mut remote, &mut state).unwrap();

        assert_eq!(remote[0].attrs.contains_key("grant"), grant_kept);
        assert!(!remote[0].attrs.contains_key("acl"));
        assert!(!state[1].attrs.contains_key("acl"));
        if grant_kept {
            assert_eq!(remote[0].attrs.get("grant"), Some(&grant()));
        }
    }

    #[test]
    fn default_public_access_blocks_are_dropped_unless_managed() {
        let all_off = json!({
            "block_public_acls": false,
            "block_public_policy": false,
            "ignore_public_acls": false,
            "restrict_public_buckets": false,
        });
        let mut remote = vec![
            Resource::new(types::S3_BUCKET_PUBLIC_ACCESS_BLOCK, "unmanaged", all_off.clone()),
            Resource::new(types::S3_BUCKET_PUBLIC_ACCESS_BLOCK, "managed", all_off.clone()),
            Resource::new(
                types::S3_BUCKET_PUBLIC_ACCESS_BLOCK,
                "restrictive",
                json!({"block_public_acls": true}),
            ),
        ];
        let mut state = vec![Resource::new(
            types::S3_BUCKET_PUBLIC_ACCESS_BLOCK,
            "managed",
            all_off,
        )];

        AwsS3BucketPublicAccessBlockReconciler
            .execute(&mut remote, &mut state)
            .unwrap();

        let ids: Vec<&str> = remote.iter().map(Resource::id).collect();
        assert_eq!(ids, vec!["managed", "restrictive"]);
    }
}
