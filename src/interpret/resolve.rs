use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::RequestContext;
use crate::error::DelegateError;
use crate::registry::HookName;
use crate::result::HookResult;

/// HTTP backend resource description: a URI plus optional credentials and
/// extra request headers, all opaque to this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResource {
    pub uri: String,
    pub username: Option<String>,
    pub secret: Option<String>,
    /// Extra headers the storage layer sends when fetching, in declared
    /// order.
    pub headers: Vec<(String, String)>,
}

/// Backend-specific description of where raw resource bytes live. Produced
/// by a resolution hook, consumed exactly once by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum ResourceLocator {
    Filesystem { pathname: String },
    Http(HttpResource),
    Blobstore { bucket: Option<String>, key: String },
    DatabaseIdentifier { identifier: String },
    Query { sql: String },
}

/// Backend name selection. `Absent` falls back to the host's configured
/// baseline backend.
pub fn interpret_source(
    result: &HookResult,
    ctx: &RequestContext,
    baseline: &str,
) -> Result<String, DelegateError> {
    match result {
        HookResult::Absent => Ok(baseline.to_string()),
        HookResult::Text(name) => Ok(name.clone()),
        other => Err(shape_violation(HookName::Source, ctx, other)),
    }
}

pub fn interpret_filesystem_location(
    result: &HookResult,
    ctx: &RequestContext,
) -> Result<Option<ResourceLocator>, DelegateError> {
    match result {
        HookResult::Absent => Ok(None),
        HookResult::Text(pathname) => Ok(Some(ResourceLocator::Filesystem {
            pathname: pathname.clone(),
        })),
        other => Err(shape_violation(HookName::FilesystemLocation, ctx, other)),
    }
}

/// A text result is a bare URI; a structured result must carry `uri` and
/// may add paired credentials and a `headers` map.
pub fn interpret_http_resource_info(
    result: &HookResult,
    ctx: &RequestContext,
) -> Result<Option<ResourceLocator>, DelegateError> {
    const HOOK: HookName = HookName::HttpResourceInfo;
    match result {
        HookResult::Absent => Ok(None),
        HookResult::Text(uri) => Ok(Some(ResourceLocator::Http(HttpResource {
            uri: uri.clone(),
            ..HttpResource::default()
        }))),
        HookResult::Structured(map) => {
            let uri = super::require_str(HOOK, ctx, map, "uri")?;
            let (username, secret) = credentials(HOOK, ctx, map)?;
            let headers = header_map(HOOK, ctx, map)?;
            Ok(Some(ResourceLocator::Http(HttpResource {
                uri,
                username,
                secret,
                headers,
            })))
        }
        other => Err(shape_violation(HOOK, ctx, other)),
    }
}

/// A text result is a bare object key; the bucket is then left to host
/// configuration.
pub fn interpret_blobstore_object_info(
    result: &HookResult,
    ctx: &RequestContext,
) -> Result<Option<ResourceLocator>, DelegateError> {
    const HOOK: HookName = HookName::BlobstoreObjectInfo;
    match result {
        HookResult::Absent => Ok(None),
        HookResult::Text(key) => Ok(Some(ResourceLocator::Blobstore {
            bucket: None,
            key: key.clone(),
        })),
        HookResult::Structured(map) => Ok(Some(ResourceLocator::Blobstore {
            bucket: super::optional_str(HOOK, ctx, map, "bucket")?,
            key: super::require_str(HOOK, ctx, map, "key")?,
        })),
        other => Err(shape_violation(HOOK, ctx, other)),
    }
}

pub fn interpret_database_identifier(
    result: &HookResult,
    ctx: &RequestContext,
) -> Result<Option<ResourceLocator>, DelegateError> {
    match result {
        HookResult::Absent => Ok(None),
        HookResult::Text(identifier) => Ok(Some(ResourceLocator::DatabaseIdentifier {
            identifier: identifier.clone(),
        })),
        other => Err(shape_violation(HookName::DatabaseIdentifier, ctx, other)),
    }
}

pub fn interpret_database_media_type_query(
    result: &HookResult,
    ctx: &RequestContext,
) -> Result<Option<ResourceLocator>, DelegateError> {
    query(HookName::DatabaseMediaTypeQuery, result, ctx)
}

pub fn interpret_database_lookup_query(
    result: &HookResult,
    ctx: &RequestContext,
) -> Result<Option<ResourceLocator>, DelegateError> {
    query(HookName::DatabaseLookupQuery, result, ctx)
}

fn query(
    hook: HookName,
    result: &HookResult,
    ctx: &RequestContext,
) -> Result<Option<ResourceLocator>, DelegateError> {
    match result {
        HookResult::Absent => Ok(None),
        HookResult::Text(sql) => Ok(Some(ResourceLocator::Query { sql: sql.clone() })),
        other => Err(shape_violation(hook, ctx, other)),
    }
}

/// Uniform credential rule: a username requires a secret and vice versa.
/// Explicit fields always win; this layer never parses credentials out of
/// the identifier string.
fn credentials(
    hook: HookName,
    ctx: &RequestContext,
    map: &Map<String, Value>,
) -> Result<(Option<String>, Option<String>), DelegateError> {
    let username = super::optional_str(hook, ctx, map, "username")?;
    let secret = super::optional_str(hook, ctx, map, "secret")?;
    match (&username, &secret) {
        (Some(_), None) | (None, Some(_)) => Err(DelegateError::violation(
            hook,
            ctx,
            "`username` and `secret` must be supplied together",
        )),
        _ => Ok((username, secret)),
    }
}

fn header_map(
    hook: HookName,
    ctx: &RequestContext,
    map: &Map<String, Value>,
) -> Result<Vec<(String, String)>, DelegateError> {
    match map.get("headers") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(headers)) => {
            let mut out = Vec::with_capacity(headers.len());
            for (name, value) in headers {
                match value {
                    Value::String(v) => out.push((name.clone(), v.clone())),
                    other => {
                        return Err(DelegateError::violation(
                            hook,
                            ctx,
                            format!("header `{name}` must be a string, got {other}"),
                        ));
                    }
                }
            }
            Ok(out)
        }
        Some(other) => Err(DelegateError::violation(
            hook,
            ctx,
            format!("field `headers` must be a map, got {other}"),
        )),
    }
}

fn shape_violation(hook: HookName, ctx: &RequestContext, result: &HookResult) -> DelegateError {
    DelegateError::violation(
        hook,
        ctx,
        format!("{} result is not a valid locator for this backend", result.shape()),
    )
}
