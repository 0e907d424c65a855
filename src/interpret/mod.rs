//! Outcome interpreters: per hook kind, map a validated [`HookResult`]
//! into the typed effect the host applies.

mod authorize;
mod overlay;
mod resolve;

pub use authorize::{interpret_authorize, AuthVerdict};
pub use overlay::{
    interpret_extra_response_keys, interpret_metadata, interpret_overlay, interpret_redactions,
    ImageOverlay, OverlaySpec, RedactionRegion, TextOverlay, RESERVED_RESPONSE_KEYS,
};
pub use resolve::{
    interpret_blobstore_object_info, interpret_database_identifier,
    interpret_database_lookup_query, interpret_database_media_type_query,
    interpret_filesystem_location, interpret_http_resource_info, interpret_source, HttpResource,
    ResourceLocator,
};

use serde_json::{Map, Value};

use crate::context::RequestContext;
use crate::error::DelegateError;
use crate::registry::HookName;

// Field extraction shared by the per-hook interpreters. All of these turn a
// missing or mistyped field into a contract violation carrying the hook
// name and identifier.

fn require_str(
    hook: HookName,
    ctx: &RequestContext,
    map: &Map<String, Value>,
    key: &str,
) -> Result<String, DelegateError> {
    match map.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(DelegateError::violation(
            hook,
            ctx,
            format!("field `{key}` must be a string, got {other}"),
        )),
        None => Err(DelegateError::violation(
            hook,
            ctx,
            format!("missing required field `{key}`"),
        )),
    }
}

fn optional_str(
    hook: HookName,
    ctx: &RequestContext,
    map: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, DelegateError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(DelegateError::violation(
            hook,
            ctx,
            format!("field `{key}` must be a string, got {other}"),
        )),
    }
}

fn require_status(
    hook: HookName,
    ctx: &RequestContext,
    map: &Map<String, Value>,
) -> Result<u16, DelegateError> {
    let value = map.get("status_code").ok_or_else(|| {
        DelegateError::violation(hook, ctx, "missing required field `status_code`")
    })?;
    value
        .as_u64()
        .and_then(|n| u16::try_from(n).ok())
        .filter(|n| (100..=599).contains(n))
        .ok_or_else(|| {
            DelegateError::violation(
                hook,
                ctx,
                format!("field `status_code` must be an HTTP status, got {value}"),
            )
        })
}

fn require_positive_u32(
    hook: HookName,
    ctx: &RequestContext,
    map: &Map<String, Value>,
    key: &str,
) -> Result<u32, DelegateError> {
    let value = map
        .get(key)
        .ok_or_else(|| DelegateError::violation(hook, ctx, format!("missing required field `{key}`")))?;
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            DelegateError::violation(
                hook,
                ctx,
                format!("field `{key}` must be a positive integer, got {value}"),
            )
        })
}

fn require_i64(
    hook: HookName,
    ctx: &RequestContext,
    map: &Map<String, Value>,
    key: &str,
) -> Result<i64, DelegateError> {
    let value = map
        .get(key)
        .ok_or_else(|| DelegateError::violation(hook, ctx, format!("missing required field `{key}`")))?;
    value.as_i64().ok_or_else(|| {
        DelegateError::violation(
            hook,
            ctx,
            format!("field `{key}` must be an integer, got {value}"),
        )
    })
}

fn optional_f64(
    hook: HookName,
    ctx: &RequestContext,
    map: &Map<String, Value>,
    key: &str,
) -> Result<Option<f64>, DelegateError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            DelegateError::violation(
                hook,
                ctx,
                format!("field `{key}` must be a number, got {value}"),
            )
        }),
    }
}
