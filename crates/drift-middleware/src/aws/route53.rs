use drift_resource::Resource;
use tracing::debug;

use super::types;
use crate::error::Result;
use crate::middleware::Middleware;
use crate::patterns::{self, Managed};

/// Rewrites state record ids to the form the remote enumeration reports:
/// `{zone_id}_{name}_{type}`, followed by `_{set_identifier}` for records
/// using a routing policy. The name is lowercased without its trailing dot.
#[derive(Debug, Default, Clone, Copy)]
pub struct Route53RecordIdReconciler;

fn record_id(record: &Resource) -> Option<String> {
    let attrs = &record.attrs;
    let name = attrs.get_str("name").map(|n| {
        n.strip_suffix('.').unwrap_or(n).to_lowercase()
    });
    let mut id = patterns::join_id(
        &[
            attrs.get_str("zone_id"),
            name.as_deref(),
            attrs.get_str("type"),
        ],
        "_",
    )?;
    if let Some(set_identifier) = attrs.get_non_empty_str("set_identifier") {
        id.push('_');
        id.push_str(set_identifier);
    }
    Some(id)
}

impl Middleware for Route53RecordIdReconciler {
    fn name(&self) -> &'static str {
        "route53_record_id_reconciler"
    }

    fn execute(&self, _: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        for record in state.iter_mut().filter(|r| r.is(types::ROUTE53_RECORD)) {
            let Some(id) = record_id(record) else {
                continue;
            };
            if id != record.id {
                debug!(from = %record.id, to = %id, "Reconciling route53 record id");
                record.id = id;
            }
        }
        Ok(())
    }
}

/// Drops NS and SOA records Route53 creates with every hosted zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct Route53DefaultZoneRecordSanitizer;

impl Middleware for Route53DefaultZoneRecordSanitizer {
    fn name(&self) -> &'static str {
        "route53_default_zone_record_sanitizer"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        patterns::filter_defaults(remote, state, Managed::SameResource, |r, _| {
            r.is(types::ROUTE53_RECORD)
                && matches!(r.attrs.get_str("type"), Some("NS") | Some("SOA"))
        });
        Ok(())
    }
}
