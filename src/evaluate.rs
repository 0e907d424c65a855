//! Decision evaluator: invokes a single hook, contains failures, and
//! validates the returned shape against the registry.

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tracing::{error, trace};

use crate::context::RequestContext;
use crate::delegate::Delegate;
use crate::error::DelegateError;
use crate::registry::HookName;
use crate::result::HookResult;

/// Invokes `hook` on `delegate` with `ctx` and returns the validated raw
/// result.
///
/// Panics inside the hook are contained and reported as
/// [`DelegateError::HookExecution`], never propagated to the host. A result
/// whose shape is outside the hook's allowed set is a
/// [`DelegateError::ContractViolation`].
pub async fn evaluate(
    hook: HookName,
    ctx: &RequestContext,
    delegate: &dyn Delegate,
) -> Result<HookResult, DelegateError> {
    let invoked = AssertUnwindSafe(dispatch(hook, ctx, delegate))
        .catch_unwind()
        .await;

    let result = match invoked {
        Ok(Ok(result)) => result,
        Ok(Err(cause)) => {
            error!(
                hook = hook.as_str(),
                delegate = delegate.name(),
                identifier = %ctx.identifier,
                error = %cause,
                "hook returned an error"
            );
            return Err(DelegateError::execution(hook, ctx, cause));
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(
                hook = hook.as_str(),
                delegate = delegate.name(),
                identifier = %ctx.identifier,
                panic = message,
                "hook panicked"
            );
            return Err(DelegateError::execution(
                hook,
                ctx,
                anyhow::anyhow!("hook panicked: {message}"),
            ));
        }
    };

    let shape = result.shape();
    if !hook.allowed_shapes().contains(&shape) {
        return Err(DelegateError::violation(
            hook,
            ctx,
            format!(
                "returned a {shape} result, expected one of: {}",
                shape_list(hook)
            ),
        ));
    }

    trace!(
        hook = hook.as_str(),
        delegate = delegate.name(),
        identifier = %ctx.identifier,
        shape = %shape,
        "hook evaluated"
    );
    Ok(result)
}

fn dispatch<'a>(
    hook: HookName,
    ctx: &'a RequestContext,
    delegate: &'a dyn Delegate,
) -> impl std::future::Future<Output = anyhow::Result<HookResult>> + 'a {
    async move {
        match hook {
            HookName::Authorize => delegate.authorize(ctx).await,
            HookName::Source => delegate.source(ctx).await,
            HookName::Metadata => delegate.metadata(ctx).await,
            HookName::Overlay => delegate.overlay(ctx).await,
            HookName::Redactions => delegate.redactions(ctx).await,
            HookName::FilesystemLocation => delegate.filesystem_location(ctx).await,
            HookName::HttpResourceInfo => delegate.http_resource_info(ctx).await,
            HookName::BlobstoreObjectInfo => delegate.blobstore_object_info(ctx).await,
            HookName::DatabaseIdentifier => delegate.database_identifier(ctx).await,
            HookName::DatabaseMediaTypeQuery => delegate.database_media_type_query(ctx).await,
            HookName::DatabaseLookupQuery => delegate.database_lookup_query(ctx).await,
            HookName::ExtraResponseKeys => delegate.extra_response_keys(ctx).await,
        }
    }
}

fn shape_list(hook: HookName) -> String {
    hook.allowed_shapes()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
