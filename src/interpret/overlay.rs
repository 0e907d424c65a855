use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::RequestContext;
use crate::error::DelegateError;
use crate::registry::HookName;
use crate::result::HookResult;

/// Response-envelope keys owned by the host. A delegate merging one of
/// these through `extra_response_keys` is a contract violation.
pub const RESERVED_RESPONSE_KEYS: &[&str] = &[
    "@context", "@id", "protocol", "width", "height", "sizes", "tiles", "profile",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOverlay {
    pub path: String,
    pub inset: i64,
    pub position: String,
}

/// Text overlay with its styling attributes. Only the text, inset, and
/// position are required; styling falls back to host defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub text: String,
    pub inset: i64,
    pub position: String,
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub font: Option<String>,
    pub font_size: Option<f64>,
    pub font_min_size: Option<f64>,
    pub font_weight: Option<f64>,
    pub glyph_spacing: Option<f64>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
}

/// Overlay instruction for the rendering layer. The sub-kind is selected
/// by which of the `image` / `string` keys the result carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlaySpec {
    Image(ImageOverlay),
    Text(TextOverlay),
}

/// A rectangular region to blank out. Regions are applied independently
/// and may overlap; nothing merges them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionRegion {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

pub fn interpret_overlay(
    result: &HookResult,
    ctx: &RequestContext,
) -> Result<Option<OverlaySpec>, DelegateError> {
    const HOOK: HookName = HookName::Overlay;
    let map = match result {
        HookResult::Absent => return Ok(None),
        HookResult::Structured(map) => map,
        other => {
            return Err(DelegateError::violation(
                HOOK,
                ctx,
                format!("{} result is not a valid overlay", other.shape()),
            ));
        }
    };

    match (map.contains_key("image"), map.contains_key("string")) {
        (true, true) => Err(DelegateError::violation(
            HOOK,
            ctx,
            "result mixes image-overlay and text-overlay keys",
        )),
        (false, false) => Err(DelegateError::violation(
            HOOK,
            ctx,
            "result carries neither `image` nor `string`",
        )),
        (true, false) => Ok(Some(OverlaySpec::Image(ImageOverlay {
            path: super::require_str(HOOK, ctx, map, "image")?,
            inset: super::require_i64(HOOK, ctx, map, "inset")?,
            position: super::require_str(HOOK, ctx, map, "position")?,
        }))),
        (false, true) => Ok(Some(OverlaySpec::Text(TextOverlay {
            text: super::require_str(HOOK, ctx, map, "string")?,
            inset: super::require_i64(HOOK, ctx, map, "inset")?,
            position: super::require_str(HOOK, ctx, map, "position")?,
            color: super::optional_str(HOOK, ctx, map, "color")?,
            background_color: super::optional_str(HOOK, ctx, map, "background_color")?,
            font: super::optional_str(HOOK, ctx, map, "font")?,
            font_size: super::optional_f64(HOOK, ctx, map, "font_size")?,
            font_min_size: super::optional_f64(HOOK, ctx, map, "font_min_size")?,
            font_weight: super::optional_f64(HOOK, ctx, map, "font_weight")?,
            glyph_spacing: super::optional_f64(HOOK, ctx, map, "glyph_spacing")?,
            stroke_color: super::optional_str(HOOK, ctx, map, "stroke_color")?,
            stroke_width: super::optional_f64(HOOK, ctx, map, "stroke_width")?,
        }))),
    }
}

/// `Absent` and an empty list both mean "no redactions"; a non-empty list
/// is returned with its count and ordering intact.
pub fn interpret_redactions(
    result: &HookResult,
    ctx: &RequestContext,
) -> Result<Vec<RedactionRegion>, DelegateError> {
    const HOOK: HookName = HookName::Redactions;
    let entries = match result {
        HookResult::Absent => return Ok(Vec::new()),
        HookResult::List(entries) => entries,
        other => {
            return Err(DelegateError::violation(
                HOOK,
                ctx,
                format!("{} result is not a valid redaction list", other.shape()),
            ));
        }
    };

    entries.iter().map(|map| region(ctx, map)).collect()
}

fn region(ctx: &RequestContext, map: &Map<String, Value>) -> Result<RedactionRegion, DelegateError> {
    const HOOK: HookName = HookName::Redactions;
    let dimension = |key: &str| -> Result<u32, DelegateError> {
        let value = super::require_i64(HOOK, ctx, map, key)?;
        u32::try_from(value).map_err(|_| {
            DelegateError::violation(
                HOOK,
                ctx,
                format!("field `{key}` must be a non-negative integer, got {value}"),
            )
        })
    };
    Ok(RedactionRegion {
        x: super::require_i64(HOOK, ctx, map, "x")?,
        y: super::require_i64(HOOK, ctx, map, "y")?,
        width: dimension("width")?,
        height: dimension("height")?,
    })
}

/// Opaque payload text, passed through verbatim to the output embedding
/// step. This layer never validates its internal structure.
pub fn interpret_metadata(
    result: &HookResult,
    ctx: &RequestContext,
) -> Result<Option<String>, DelegateError> {
    match result {
        HookResult::Absent => Ok(None),
        HookResult::Text(payload) => Ok(Some(payload.clone())),
        other => Err(DelegateError::violation(
            HookName::Metadata,
            ctx,
            format!("{} result is not a valid metadata payload", other.shape()),
        )),
    }
}

/// `Absent` means "omit the fragment"; an empty map is present-but-empty,
/// which the host renders differently from an omission.
pub fn interpret_extra_response_keys(
    result: &HookResult,
    ctx: &RequestContext,
) -> Result<Option<Map<String, Value>>, DelegateError> {
    const HOOK: HookName = HookName::ExtraResponseKeys;
    let map = match result {
        HookResult::Absent => return Ok(None),
        HookResult::Structured(map) => map,
        other => {
            return Err(DelegateError::violation(
                HOOK,
                ctx,
                format!("{} result is not a valid response fragment", other.shape()),
            ));
        }
    };

    for key in map.keys() {
        if RESERVED_RESPONSE_KEYS.contains(&key.as_str()) {
            return Err(DelegateError::violation(
                HOOK,
                ctx,
                format!("key `{key}` is reserved by the host"),
            ));
        }
    }
    Ok(Some(map.clone()))
}
