use serde::{Deserialize, Serialize};

use crate::context::RequestContext;
use crate::error::DelegateError;
use crate::registry::HookName;
use crate::result::HookResult;

/// Authorization outcome derived from the `authorize` hook. Computed fresh
/// per request; the host must never cache it across identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum AuthVerdict {
    Allow,
    Deny {
        status: u16,
    },
    Challenge {
        status: u16,
        scheme: String,
    },
    Redirect {
        status: u16,
        location: String,
    },
    /// Access granted, but output dimensions are capped to
    /// `numerator / denominator` of the original. A security and
    /// cost-control cap: it overrides any client-requested scale upward,
    /// never downward.
    ScaledAllow {
        status: u16,
        numerator: u32,
        denominator: u32,
    },
}

impl AuthVerdict {
    /// Whether the request may proceed to the image pipeline at all.
    pub fn allows(&self) -> bool {
        matches!(self, Self::Allow | Self::ScaledAllow { .. })
    }
}

/// State machine over the `authorize` result.
///
/// Structured results are matched against key-sets in fixed declared order:
/// challenge, then redirect, then scale. The first match wins, so a result
/// carrying both redirect and scale keys redirects.
pub fn interpret_authorize(
    result: &HookResult,
    ctx: &RequestContext,
    deny_status: u16,
) -> Result<AuthVerdict, DelegateError> {
    const HOOK: HookName = HookName::Authorize;
    match result {
        // Pass/fail gate, not a locator: absent means default-open.
        HookResult::Absent => Ok(AuthVerdict::Allow),
        HookResult::Boolean(true) => Ok(AuthVerdict::Allow),
        HookResult::Boolean(false) => Ok(AuthVerdict::Deny {
            status: deny_status,
        }),
        HookResult::Structured(map) => {
            let status = super::require_status(HOOK, ctx, map)?;
            if map.contains_key("challenge") {
                Ok(AuthVerdict::Challenge {
                    status,
                    scheme: super::require_str(HOOK, ctx, map, "challenge")?,
                })
            } else if map.contains_key("location") {
                Ok(AuthVerdict::Redirect {
                    status,
                    location: super::require_str(HOOK, ctx, map, "location")?,
                })
            } else if map.contains_key("scale_numerator") || map.contains_key("scale_denominator") {
                Ok(AuthVerdict::ScaledAllow {
                    status,
                    numerator: super::require_positive_u32(HOOK, ctx, map, "scale_numerator")?,
                    denominator: super::require_positive_u32(HOOK, ctx, map, "scale_denominator")?,
                })
            } else {
                Err(DelegateError::violation(
                    HOOK,
                    ctx,
                    "structured result carries none of the challenge, location, or scale key-sets",
                ))
            }
        }
        HookResult::Text(_) | HookResult::List(_) => Err(DelegateError::violation(
            HOOK,
            ctx,
            format!("{} result is not a valid authorization", result.shape()),
        )),
    }
}
