//! Bounded retry over an endpoint.
//!
//! Attempts continue while both the attempt budget and the wall-clock budget
//! remain. There is no backoff between attempts, and no error kind is exempt
//! from retry.

use super::{BoxEndpoint, Endpoint};
use crate::errors::GatewayError;
use async_trait::async_trait;
use common::RequestContext;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Retries the wrapped endpoint within an attempt and time budget.
pub struct Retry<Req, Resp> {
    name: &'static str,
    inner: BoxEndpoint<Req, Resp>,
    max_attempts: u32,
    max_time: Duration,
}

impl<Req, Resp> Retry<Req, Resp> {
    /// A `max_attempts` of zero still makes one attempt.
    pub fn new(
        name: &'static str,
        inner: BoxEndpoint<Req, Resp>,
        max_attempts: u32,
        max_time: Duration,
    ) -> Self {
        Self {
            name,
            inner,
            max_attempts: max_attempts.max(1),
            max_time,
        }
    }

    fn budget_elapsed(&self) -> GatewayError {
        GatewayError::Transport {
            method: self.name,
            reason: format!("retry time budget of {:?} elapsed", self.max_time),
        }
    }
}

#[async_trait]
impl<Req, Resp> Endpoint<Req, Resp> for Retry<Req, Resp>
where
    Req: Send + Sync,
    Resp: Send,
{
    async fn call(&self, ctx: &RequestContext, request: &Req) -> Result<Resp, GatewayError> {
        let deadline = Instant::now() + self.max_time;
        let mut attempts: u32 = 0;
        let mut last_error = None;

        while attempts < self.max_attempts {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let first = attempts == 0;
            if remaining.is_zero() && !first {
                break;
            }

            attempts += 1;
            // The first attempt is never skipped; it is unbounded only when
            // the time budget is zero.
            let outcome = if remaining.is_zero() {
                Ok(self.inner.call(ctx, request).await)
            } else {
                tokio::time::timeout(remaining, self.inner.call(ctx, request)).await
            };
            match outcome {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => {
                    debug!(
                        target: "door.proxy.retry",
                        method = self.name,
                        attempt = attempts,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Attempt failed"
                    );
                    last_error = Some(e);
                }
                Err(_) => {
                    last_error = Some(self.budget_elapsed());
                    break;
                }
            }
        }

        Err(GatewayError::RetryExhausted {
            method: self.name,
            attempts,
            last: Box::new(last_error.unwrap_or_else(|| self.budget_elapsed())),
        })
    }
}
