//! A canned delegate whose decisions are keyed entirely off the request
//! identifier. It backs the crate's integration tests and doubles as a
//! worked example of the hook contract.

use async_trait::async_trait;
use serde_json::json;

use crate::context::RequestContext;
use crate::delegate::Delegate;
use crate::result::HookResult;

pub struct FixtureDelegate;

impl FixtureDelegate {
    const BLOBSTORE_BUCKET: &'static str = "lightbox-fixtures";
}

#[async_trait]
impl Delegate for FixtureDelegate {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn authorize(&self, ctx: &RequestContext) -> anyhow::Result<HookResult> {
        match ctx.identifier.as_str() {
            "forbidden.jpg" | "forbidden-boolean.jpg" => Ok(HookResult::Boolean(false)),
            "forbidden-code.jpg" => HookResult::try_from(json!({
                "status_code": 401,
                "challenge": "Basic",
            })),
            "redirect.jpg" => HookResult::try_from(json!({
                "status_code": 303,
                "location": "http://example.org/",
            })),
            "reduce.jpg" => HookResult::try_from(json!({
                "status_code": 302,
                "scale_numerator": 1,
                "scale_denominator": 2,
            })),
            _ => Ok(HookResult::Boolean(true)),
        }
    }

    async fn source(&self, ctx: &RequestContext) -> anyhow::Result<HookResult> {
        match ctx.identifier.as_str() {
            "http" => Ok("http".into()),
            "database" => Ok("database".into()),
            "bogus" => Ok(HookResult::Absent),
            _ => Ok("filesystem".into()),
        }
    }

    async fn metadata(&self, ctx: &RequestContext) -> anyhow::Result<HookResult> {
        if ctx.identifier == "metadata" {
            Ok("<rdf:RDF>derivative metadata</rdf:RDF>".into())
        } else {
            Ok(HookResult::Absent)
        }
    }

    async fn overlay(&self, ctx: &RequestContext) -> anyhow::Result<HookResult> {
        match ctx.identifier.as_str() {
            "image" => HookResult::try_from(json!({
                "image": "/dev/cats",
                "inset": 5,
                "position": "bottom left",
            })),
            "string" => HookResult::try_from(json!({
                "background_color": "rgba(12, 23, 34, 45)",
                "string": "dogs\ndogs",
                "inset": 5,
                "position": "bottom left",
                "color": "red",
                "font": "SansSerif",
                "font_size": 20,
                "font_min_size": 11,
                "font_weight": 1.5,
                "glyph_spacing": 0.1,
                "stroke_color": "blue",
                "stroke_width": 3,
            })),
            _ => Ok(HookResult::Absent),
        }
    }

    async fn redactions(&self, ctx: &RequestContext) -> anyhow::Result<HookResult> {
        match ctx.identifier.as_str() {
            "bogus" => Ok(HookResult::Absent),
            "empty" => Ok(HookResult::List(Vec::new())),
            _ => HookResult::try_from(json!([
                {"x": 0, "y": 10, "width": 50, "height": 50},
            ])),
        }
    }

    async fn filesystem_location(&self, ctx: &RequestContext) -> anyhow::Result<HookResult> {
        match ctx.identifier.as_str() {
            "missing" => Ok(HookResult::Absent),
            ident => Ok(ident.into()),
        }
    }

    async fn http_resource_info(&self, ctx: &RequestContext) -> anyhow::Result<HookResult> {
        let ident = ctx.identifier.as_str();

        if let Some(uri) = ident.strip_prefix("valid-auth-") {
            return HookResult::try_from(json!({
                "uri": uri,
                "username": "user",
                "secret": "secret",
            }));
        }
        if let Some(uri) = ident.strip_prefix("invalid-auth-") {
            return HookResult::try_from(json!({
                "uri": uri,
                "username": "user",
                "secret": "bogus",
            }));
        }
        if ident.starts_with("http://localhost") || ident.starts_with("https://localhost") {
            return HookResult::try_from(json!({
                "uri": ident,
                "headers": {"X-Custom": "yes"},
            }));
        }
        if ctx.client_ip == "1.2.3.4" {
            // Proxied requests get credentials only when the original
            // scheme was https.
            return if ctx.header("X-Forwarded-Proto") == Some("https") {
                HookResult::try_from(json!({
                    "uri": ident,
                    "username": "user",
                    "secret": "bogus",
                }))
            } else {
                HookResult::try_from(json!({
                    "uri": format!(
                        "http://other-example.org/bleh/{}",
                        urlencoding::encode(ident)
                    ),
                }))
            };
        }
        if ident == "missing" {
            return Ok(HookResult::Absent);
        }
        HookResult::try_from(json!({
            "uri": format!("http://example.org/bla/{}", urlencoding::encode(ident)),
            "headers": {"X-Custom": "yes"},
        }))
    }

    async fn blobstore_object_info(&self, ctx: &RequestContext) -> anyhow::Result<HookResult> {
        let ident = ctx.identifier.as_str();
        if ident.contains("bucket:") || ident.contains("key:") {
            // Identifiers may carry the target location inline, as
            // `bucket:<name>;key:<name>` pairs.
            let mut map = serde_json::Map::new();
            for part in ident.split(';') {
                if let Some((k, v)) = part.split_once(':') {
                    map.insert(k.to_string(), v.into());
                }
            }
            return Ok(HookResult::Structured(map));
        }
        match ident {
            "bogus" => Ok(HookResult::Absent),
            _ => HookResult::try_from(json!({
                "key": ident,
                "bucket": Self::BLOBSTORE_BUCKET,
            })),
        }
    }

    async fn database_identifier(&self, ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok(ctx.identifier.as_str().into())
    }

    async fn database_media_type_query(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok("SELECT media_type FROM items WHERE filename = ?".into())
    }

    async fn database_lookup_query(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
        Ok("SELECT image FROM items WHERE filename = ?".into())
    }

    async fn extra_response_keys(&self, ctx: &RequestContext) -> anyhow::Result<HookResult> {
        match ctx.identifier.as_str() {
            "bogus" => Ok(HookResult::Absent),
            "empty" => Ok(HookResult::Structured(serde_json::Map::new())),
            _ => HookResult::try_from(json!({
                "attribution": "Copyright My Great Organization. All rights reserved.",
                "license": "http://example.org/license.html",
                "service": {
                    "@context": "http://example.org/services/physdim/context.json",
                    "profile": "http://example.org/services/physdim",
                    "physicalScale": 0.0025,
                    "physicalUnits": "in",
                },
            })),
        }
    }
}
