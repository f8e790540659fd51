//! Round-robin selection over a fixed set of endpoints.

use super::{BoxEndpoint, Endpoint};
use crate::errors::GatewayError;
use async_trait::async_trait;
use common::RequestContext;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Dispatches each call to the next endpoint in the set.
pub struct RoundRobin<Req, Resp> {
    name: &'static str,
    endpoints: Vec<BoxEndpoint<Req, Resp>>,
    next: AtomicUsize,
}

impl<Req, Resp> RoundRobin<Req, Resp> {
    pub fn new(name: &'static str, endpoints: Vec<BoxEndpoint<Req, Resp>>) -> Self {
        Self {
            name,
            endpoints,
            next: AtomicUsize::new(0),
        }
    }

    /// Number of endpoints in the set.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[async_trait]
impl<Req, Resp> Endpoint<Req, Resp> for RoundRobin<Req, Resp>
where
    Req: Send + Sync,
    Resp: Send,
{
    async fn call(&self, ctx: &RequestContext, request: &Req) -> Result<Resp, GatewayError> {
        if self.endpoints.is_empty() {
            return Err(GatewayError::NoEndpoints(self.name));
        }

        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.endpoints.len();
        let endpoint = self
            .endpoints
            .get(index)
            .ok_or(GatewayError::NoEndpoints(self.name))?;

        endpoint.call(ctx, request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Fixed(&'static str);

    #[async_trait]
    impl Endpoint<(), &'static str> for Fixed {
        async fn call(
            &self,
            _ctx: &RequestContext,
            _request: &(),
        ) -> Result<&'static str, GatewayError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn test_empty_set_is_no_endpoints() {
        let balancer: RoundRobin<(), &'static str> = RoundRobin::new("GetUser", vec![]);

        let result = balancer.call(&RequestContext::default(), &()).await;
        assert!(matches!(result, Err(GatewayError::NoEndpoints("GetUser"))));
        assert!(balancer.is_empty());
    }

    #[tokio::test]
    async fn test_rotates_through_endpoints() {
        let balancer = RoundRobin::new(
            "GetUser",
            vec![
                Arc::new(Fixed("a")) as BoxEndpoint<(), &'static str>,
                Arc::new(Fixed("b")),
                Arc::new(Fixed("c")),
            ],
        );
        let ctx = RequestContext::default();

        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(balancer.call(&ctx, &()).await.unwrap());
        }

        assert_eq!(seen, vec!["a", "b", "c", "a", "b", "c"]);
        assert_eq!(balancer.len(), 3);
    }

    #[tokio::test]
    async fn test_single_endpoint_always_selected() {
        let balancer = RoundRobin::new(
            "GetEvents",
            vec![Arc::new(Fixed("only")) as BoxEndpoint<(), &'static str>],
        );
        let ctx = RequestContext::default();

        for _ in 0..3 {
            assert_eq!(balancer.call(&ctx, &()).await.unwrap(), "only");
        }
    }
}
