//! Building blocks shared by the reconciliation stages
//!
//! Each helper implements one recurring reconciliation shape so that stages
//! only carry their per-type predicates and field mappings:
//!
//! - [`retype`]: relabel a legacy type to its canonical name
//! - [`filter_defaults`]: drop provider-created defaults nobody manages
//! - [`insert_unless_present`] / [`strip`]: expand embedded blocks into
//!   standalone children
//! - [`reconcile_versions`]: collapse resources reported through two API
//!   versions
//! - [`fan_out`]: split one resource into several narrower ones
//! - [`join_id`]: compose a canonical identifier

use std::collections::HashSet;

use drift_resource::Resource;
use tracing::debug;

/// How a remote resource is recognized as managed by state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Managed {
    /// State holds a resource with the same type and id
    SameResource,
    /// State holds a structurally equal resource
    Equal,
}

impl Managed {
    /// Whether `resource` is managed according to `state`
    pub fn by(self, resource: &Resource, state: &[Resource]) -> bool {
        match self {
            Self::SameResource => contains(state, resource.resource_type(), resource.id()),
            Self::Equal => state.iter().any(|s| s.equal(resource)),
        }
    }
}

/// Whether `collection` holds a resource of `resource_type` with `id`
pub fn contains(collection: &[Resource], resource_type: &str, id: &str) -> bool {
    find(collection, resource_type, id).is_some()
}

/// Find the resource of `resource_type` with `id`
pub fn find<'a>(collection: &'a [Resource], resource_type: &str, id: &str) -> Option<&'a Resource> {
    collection
        .iter()
        .find(|r| r.is(resource_type) && r.id() == id)
}

/// Relabel every `from` resource as `to`, keeping id and attributes.
///
/// Returns how many resources were relabelled.
pub fn retype(collection: &mut [Resource], from: &str, to: &str) -> usize {
    let mut count = 0;
    for res in collection.iter_mut().filter(|r| r.is(from)) {
        debug!(id = %res.id, from, to, "Relabelling resource");
        res.resource_type = to.to_string();
        count += 1;
    }
    count
}

/// Drop remote resources matching `is_default` unless state manages them.
///
/// The predicate sees the whole remote collection so it can follow
/// cross-references; when the referenced resource is absent the predicate
/// must answer `false` so the resource is kept.
pub fn filter_defaults<F>(
    remote: &mut Vec<Resource>,
    state: &[Resource],
    managed: Managed,
    is_default: F,
) where
    F: Fn(&Resource, &[Resource]) -> bool,
{
    let verdicts: Vec<bool> = {
        let all: &[Resource] = remote.as_slice();
        all.iter()
            .map(|r| is_default(r, all) && !managed.by(r, state))
            .collect()
    };

    let mut verdicts = verdicts.into_iter();
    remote.retain(|r| {
        let drop = verdicts.next().unwrap_or(false);
        if drop {
            debug!(id = %r.id, resource_type = %r.resource_type, "Ignoring default resource from remote");
        }
        !drop
    });
}

/// Append `child` unless a resource with the same type and id is present.
///
/// Returns whether the child was added.
pub fn insert_unless_present(collection: &mut Vec<Resource>, child: Resource) -> bool {
    if contains(collection, child.resource_type(), child.id()) {
        debug!(id = %child.id, resource_type = %child.resource_type, "Resource already present, skipping");
        return false;
    }
    debug!(id = %child.id, resource_type = %child.resource_type, "Creating resource");
    collection.push(child);
    true
}

/// Remove `keys` from every resource of `resource_type`
pub fn strip(collection: &mut [Resource], resource_type: &str, keys: &[&str]) {
    for res in collection.iter_mut().filter(|r| r.is(resource_type)) {
        for key in keys {
            res.attrs.remove(key);
        }
    }
}

/// Collapse resources that a provider reports through two API versions.
///
/// Remote resources of type `v1` or `v2` that are structurally equal to a
/// state resource are managed and always kept. Among the unmanaged ones, a
/// resource whose id matches a managed one is dropped, and of the rest only
/// the `v1` flavour is kept.
///
/// Output order: other types, then managed, then the kept unmanaged ones.
pub fn reconcile_versions(remote: &mut Vec<Resource>, state: &[Resource], v1: &str, v2: &str) {
    let mut others = Vec::with_capacity(remote.len());
    let mut managed = Vec::new();
    let mut unmanaged = Vec::new();

    for res in remote.drain(..) {
        if !res.is(v1) && !res.is(v2) {
            others.push(res);
        } else if Managed::Equal.by(&res, state) {
            managed.push(res);
        } else {
            unmanaged.push(res);
        }
    }

    unmanaged.retain(|res| {
        let shadowed = managed.iter().any(|m| m.id() == res.id());
        let keep = !shadowed && res.is(v1);
        if !keep {
            debug!(id = %res.id, resource_type = %res.resource_type, "Dropping duplicate across API versions");
        }
        keep
    });

    others.extend(managed);
    others.extend(unmanaged);
    *remote = others;
}

/// Replace each resource for which `split` returns a list by that list.
///
/// Resources for which `split` returns `None` stay where they are, so the
/// relative order of untouched resources is preserved. A part whose type
/// and id are already held by a kept resource or an earlier part is
/// dropped, keeping `(type, id)` unique.
pub fn fan_out<F>(collection: &mut Vec<Resource>, split: F)
where
    F: Fn(&Resource) -> Option<Vec<Resource>>,
{
    let splits: Vec<Option<Vec<Resource>>> = collection.iter().map(&split).collect();
    let mut known: HashSet<(String, String)> = collection
        .iter()
        .zip(&splits)
        .filter(|(_, parts)| parts.is_none())
        .map(|(r, _)| (r.resource_type.clone(), r.id.clone()))
        .collect();

    let mut out = Vec::with_capacity(collection.len());
    for (res, parts) in collection.drain(..).zip(splits) {
        let Some(parts) = parts else {
            out.push(res);
            continue;
        };
        debug!(id = %res.id, resource_type = %res.resource_type, parts = parts.len(), "Splitting resource");
        for part in parts {
            if known.insert((part.resource_type.clone(), part.id.clone())) {
                out.push(part);
            } else {
                debug!(id = %part.id, resource_type = %part.resource_type, "Split part already present, skipping");
            }
        }
    }
    *collection = out;
}

/// Join identifier components with `separator`.
///
/// Returns `None` when any component is missing or empty.
pub fn join_id(components: &[Option<&str>], separator: &str) -> Option<String> {
    let parts: Option<Vec<&str>> = components
        .iter()
        .map(|c| c.filter(|s| !s.is_empty()))
        .collect();
    parts.map(|p| p.join(separator))
}
