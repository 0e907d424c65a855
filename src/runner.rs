//! Typed facade over evaluation and interpretation. This is the surface
//! the host's resource handlers call, one method per hook, with the
//! configured error-degradation policy applied per hook class.

use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::config::DelegateConfig;
use crate::context::RequestContext;
use crate::delegate::Delegate;
use crate::error::DelegateError;
use crate::evaluate::evaluate;
use crate::interpret;
use crate::interpret::{AuthVerdict, OverlaySpec, RedactionRegion, ResourceLocator};
use crate::registry::HookName;
use crate::result::HookResult;

/// Stateless dispatcher shared by all in-flight requests. Holds only the
/// immutable config; per-request state lives in the [`RequestContext`].
#[derive(Debug, Clone, Default)]
pub struct DelegateRunner {
    config: DelegateConfig,
}

impl DelegateRunner {
    pub fn new(config: DelegateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DelegateConfig {
        &self.config
    }

    /// Authorization gate. Contract violations always surface; execution
    /// failures fail closed to a deny unless `degrade_on_error` is set, in
    /// which case the hook's absent-default (allow) applies.
    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
    ) -> Result<AuthVerdict, DelegateError> {
        match evaluate(HookName::Authorize, ctx, delegate).await {
            Ok(result) => interpret::interpret_authorize(&result, ctx, self.config.deny_status),
            Err(err @ DelegateError::ContractViolation { .. }) => Err(err),
            Err(DelegateError::HookExecution { .. }) if self.config.degrade_on_error => {
                warn!(
                    hook = HookName::Authorize.as_str(),
                    identifier = %ctx.identifier,
                    "authorize failed; degrading to default allow"
                );
                Ok(AuthVerdict::Allow)
            }
            Err(DelegateError::HookExecution { .. }) => {
                error!(
                    hook = HookName::Authorize.as_str(),
                    identifier = %ctx.identifier,
                    "authorize failed; failing closed"
                );
                Ok(AuthVerdict::Deny {
                    status: self.config.deny_status,
                })
            }
        }
    }

    /// Backend selection. `None` means the delegate failed and the request
    /// cannot be routed; absent results fall back to the configured
    /// baseline backend.
    pub async fn source(
        &self,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
    ) -> Result<Option<String>, DelegateError> {
        match evaluate(HookName::Source, ctx, delegate).await {
            Ok(result) => {
                interpret::interpret_source(&result, ctx, &self.config.default_source).map(Some)
            }
            Err(err @ DelegateError::ContractViolation { .. }) => Err(err),
            Err(DelegateError::HookExecution { .. }) if self.config.degrade_on_error => {
                warn!(
                    hook = HookName::Source.as_str(),
                    identifier = %ctx.identifier,
                    "source failed; degrading to baseline backend"
                );
                Ok(Some(self.config.default_source.clone()))
            }
            Err(DelegateError::HookExecution { .. }) => Ok(self.not_found(HookName::Source)),
        }
    }

    pub async fn filesystem_location(
        &self,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
    ) -> Result<Option<ResourceLocator>, DelegateError> {
        self.resolve(
            HookName::FilesystemLocation,
            ctx,
            delegate,
            interpret::interpret_filesystem_location,
        )
        .await
    }

    pub async fn http_resource_info(
        &self,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
    ) -> Result<Option<ResourceLocator>, DelegateError> {
        self.resolve(
            HookName::HttpResourceInfo,
            ctx,
            delegate,
            interpret::interpret_http_resource_info,
        )
        .await
    }

    pub async fn blobstore_object_info(
        &self,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
    ) -> Result<Option<ResourceLocator>, DelegateError> {
        self.resolve(
            HookName::BlobstoreObjectInfo,
            ctx,
            delegate,
            interpret::interpret_blobstore_object_info,
        )
        .await
    }

    pub async fn database_identifier(
        &self,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
    ) -> Result<Option<ResourceLocator>, DelegateError> {
        self.resolve(
            HookName::DatabaseIdentifier,
            ctx,
            delegate,
            interpret::interpret_database_identifier,
        )
        .await
    }

    pub async fn database_media_type_query(
        &self,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
    ) -> Result<Option<ResourceLocator>, DelegateError> {
        self.resolve(
            HookName::DatabaseMediaTypeQuery,
            ctx,
            delegate,
            interpret::interpret_database_media_type_query,
        )
        .await
    }

    pub async fn database_lookup_query(
        &self,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
    ) -> Result<Option<ResourceLocator>, DelegateError> {
        self.resolve(
            HookName::DatabaseLookupQuery,
            ctx,
            delegate,
            interpret::interpret_database_lookup_query,
        )
        .await
    }

    /// Overlay instruction; decorative, so execution failures degrade to
    /// "no overlay" rather than failing the request.
    pub async fn overlay(
        &self,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
    ) -> Result<Option<OverlaySpec>, DelegateError> {
        self.decorate(HookName::Overlay, ctx, delegate, None, |result, ctx| {
            interpret::interpret_overlay(result, ctx)
        })
        .await
    }

    pub async fn redactions(
        &self,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
    ) -> Result<Vec<RedactionRegion>, DelegateError> {
        self.decorate(
            HookName::Redactions,
            ctx,
            delegate,
            Vec::new(),
            |result, ctx| interpret::interpret_redactions(result, ctx),
        )
        .await
    }

    pub async fn metadata(
        &self,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
    ) -> Result<Option<String>, DelegateError> {
        self.decorate(HookName::Metadata, ctx, delegate, None, |result, ctx| {
            interpret::interpret_metadata(result, ctx)
        })
        .await
    }

    pub async fn extra_response_keys(
        &self,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
    ) -> Result<Option<Map<String, Value>>, DelegateError> {
        self.decorate(
            HookName::ExtraResponseKeys,
            ctx,
            delegate,
            None,
            |result, ctx| interpret::interpret_extra_response_keys(result, ctx),
        )
        .await
    }

    // Resolution hooks share one policy: violations surface, execution
    // failures become not-found.
    async fn resolve<F>(
        &self,
        hook: HookName,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
        interpret: F,
    ) -> Result<Option<ResourceLocator>, DelegateError>
    where
        F: FnOnce(&HookResult, &RequestContext) -> Result<Option<ResourceLocator>, DelegateError>,
    {
        match evaluate(hook, ctx, delegate).await {
            Ok(result) => interpret(&result, ctx),
            Err(err @ DelegateError::ContractViolation { .. }) => Err(err),
            Err(DelegateError::HookExecution { .. }) => Ok(self.not_found(hook)),
        }
    }

    async fn decorate<T, F>(
        &self,
        hook: HookName,
        ctx: &RequestContext,
        delegate: &dyn Delegate,
        empty: T,
        interpret: F,
    ) -> Result<T, DelegateError>
    where
        F: FnOnce(&HookResult, &RequestContext) -> Result<T, DelegateError>,
    {
        match evaluate(hook, ctx, delegate).await {
            Ok(result) => interpret(&result, ctx),
            Err(err @ DelegateError::ContractViolation { .. }) => Err(err),
            Err(DelegateError::HookExecution { .. }) => {
                warn!(
                    hook = hook.as_str(),
                    identifier = %ctx.identifier,
                    "decorative hook failed; degrading to empty outcome"
                );
                Ok(empty)
            }
        }
    }

    fn not_found<T>(&self, hook: HookName) -> Option<T> {
        error!(
            hook = hook.as_str(),
            "resolution hook failed; treating resource as not found"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct BrokenDelegate;

    #[async_trait]
    impl Delegate for BrokenDelegate {
        fn name(&self) -> &str {
            "broken"
        }

        async fn authorize(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
            anyhow::bail!("rules service unavailable")
        }

        async fn http_resource_info(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
            anyhow::bail!("rules service unavailable")
        }

        async fn overlay(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
            anyhow::bail!("rules service unavailable")
        }

        async fn redactions(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
            anyhow::bail!("rules service unavailable")
        }
    }

    #[tokio::test]
    async fn failing_authorize_fails_closed_by_default() {
        let runner = DelegateRunner::default();
        let ctx = RequestContext::new("cats.jpg");
        let verdict = runner.authorize(&ctx, &BrokenDelegate).await.unwrap();
        assert_eq!(verdict, AuthVerdict::Deny { status: 403 });
    }

    #[tokio::test]
    async fn failing_authorize_degrades_to_allow_when_configured() {
        let runner = DelegateRunner::new(DelegateConfig {
            degrade_on_error: true,
            ..DelegateConfig::default()
        });
        let ctx = RequestContext::new("cats.jpg");
        let verdict = runner.authorize(&ctx, &BrokenDelegate).await.unwrap();
        assert_eq!(verdict, AuthVerdict::Allow);
    }

    #[tokio::test]
    async fn failing_resolution_hook_is_not_found() {
        let runner = DelegateRunner::default();
        let ctx = RequestContext::new("cats.jpg");
        let locator = runner.http_resource_info(&ctx, &BrokenDelegate).await.unwrap();
        assert_eq!(locator, None);
    }

    #[tokio::test]
    async fn failing_decorative_hooks_degrade_to_empty() {
        let runner = DelegateRunner::default();
        let ctx = RequestContext::new("cats.jpg");
        assert_eq!(runner.overlay(&ctx, &BrokenDelegate).await.unwrap(), None);
        assert!(runner
            .redactions(&ctx, &BrokenDelegate)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn contract_violations_always_surface() {
        struct ListAuthorizer;

        #[async_trait]
        impl Delegate for ListAuthorizer {
            fn name(&self) -> &str {
                "list-authorizer"
            }

            async fn authorize(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
                Ok(HookResult::List(Vec::new()))
            }
        }

        let runner = DelegateRunner::default();
        let ctx = RequestContext::new("cats.jpg");
        let err = runner.authorize(&ctx, &ListAuthorizer).await.unwrap_err();
        assert!(err.is_contract_violation());
    }
}
