use async_trait::async_trait;

use crate::context::RequestContext;
use crate::result::HookResult;

/// A pluggable delegate implementation. All hooks have default bodies that
/// return [`HookResult::Absent`]; implement only the decision points you
/// care about.
///
/// Delegates are invoked concurrently across requests, so implementations
/// must not share mutable state between invocations. Hooks are expected to
/// be fast, non-blocking, and side-effect-free; any I/O needed to act on a
/// returned locator happens in the storage layer, after this core returns.
#[async_trait]
pub trait Delegate: Send + Sync {
    /// Identifies the delegate in logs and error chains.
    fn name(&self) -> &str;

    /// Pass/fail gate for the request. May return a boolean, or a
    /// structured challenge/redirect/scale instruction.
    async fn authorize(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(HookResult::Absent)
    }

    /// Names the storage backend that should serve the identifier.
    async fn source(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(HookResult::Absent)
    }

    /// Opaque derivative metadata to embed in the output.
    async fn metadata(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(HookResult::Absent)
    }

    /// Image or text overlay instruction for the rendering layer.
    async fn overlay(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(HookResult::Absent)
    }

    /// Rectangular regions to redact from the rendered image.
    async fn redactions(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(HookResult::Absent)
    }

    async fn filesystem_location(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(HookResult::Absent)
    }

    async fn http_resource_info(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(HookResult::Absent)
    }

    async fn blobstore_object_info(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(HookResult::Absent)
    }

    async fn database_identifier(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(HookResult::Absent)
    }

    async fn database_media_type_query(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(HookResult::Absent)
    }

    async fn database_lookup_query(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(HookResult::Absent)
    }

    /// Extra key→value pairs to merge into the information response.
    async fn extra_response_keys(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(HookResult::Absent)
    }
}
