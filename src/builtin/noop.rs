use async_trait::async_trait;

use crate::delegate::Delegate;

/// Delegate that declines every hook. Deployments without a delegate get
/// this one, which makes every decision fall back to its registry default.
pub struct NoopDelegate;

#[async_trait]
impl Delegate for NoopDelegate {
    fn name(&self) -> &str {
        "noop"
    }
}
