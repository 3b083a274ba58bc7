use drift_resource::Resource;
use tracing::trace;

use crate::error::Result;
use crate::middleware::Middleware;

/// Compares resources on their effective tags.
///
/// `tags_all` merges provider-level default tags into `tags`. When present
/// it replaces `tags` and is removed, on both sides.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagsAllManager;

fn promote_tags_all(res: &mut Resource) {
    if let Some(all) = res.attrs.remove("tags_all") {
        trace!(id = %res.id, resource_type = %res.resource_type, "Using tags_all as tags");
        res.attrs.insert("tags", all);
    }
}

impl Middleware for TagsAllManager {
    fn name(&self) -> &'static str {
        "tags_all_manager"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        remote
            .iter_mut()
            .chain(state.iter_mut())
            .for_each(promote_tags_all);
        Ok(())
    }
}
