use thiserror::Error;

use crate::context::RequestContext;
use crate::registry::HookName;

/// Errors surfaced by hook evaluation and outcome interpretation.
///
/// A hook legitimately returning [`crate::HookResult::Absent`] for a
/// resolution hook is not an error — it is the not-found outcome, expressed
/// as `Ok(None)` at the interpreter layer. Nothing here is retried
/// internally: decisions are idempotent pure functions, so a retry without
/// a code change cannot help.
#[derive(Debug, Error)]
pub enum DelegateError {
    /// The delegate returned a shape or field combination outside the
    /// hook's declared contract. A programming error in the delegate;
    /// always surfaced to the host.
    #[error("contract violation in hook `{hook}` for identifier `{identifier}`: {reason}")]
    ContractViolation {
        hook: HookName,
        identifier: String,
        reason: String,
    },

    /// The delegate itself failed or panicked while evaluating the hook.
    /// The host applies the hook's fail-closed default unless configured to
    /// degrade on error.
    #[error("hook `{hook}` failed for identifier `{identifier}`")]
    HookExecution {
        hook: HookName,
        identifier: String,
        #[source]
        cause: anyhow::Error,
    },
}

impl DelegateError {
    pub(crate) fn violation(
        hook: HookName,
        ctx: &RequestContext,
        reason: impl Into<String>,
    ) -> Self {
        Self::ContractViolation {
            hook,
            identifier: ctx.identifier.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn execution(hook: HookName, ctx: &RequestContext, cause: anyhow::Error) -> Self {
        Self::HookExecution {
            hook,
            identifier: ctx.identifier.clone(),
            cause,
        }
    }

    /// The hook whose evaluation produced this error.
    pub fn hook(&self) -> HookName {
        match self {
            Self::ContractViolation { hook, .. } | Self::HookExecution { hook, .. } => *hook,
        }
    }

    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }
}
