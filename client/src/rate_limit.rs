//! A bounded-demand rate limiter between callers and the transport.
//!
//! Demand is a pool of at most `n` permits that a background task restores
//! to `n` every `t` milliseconds; unused demand never accumulates past
//! the bound. Each outgoing request consumes one permit (a batch consumes
//! one per element); callers await while demand is zero. The limiter is
//! optional: wiring [`RpcClient`](crate::rpc_client::RpcClient) straight
//! to an [`HttpSender`](crate::http_sender::HttpSender) works unchanged.

use {
    crate::{client_error::Result, rpc_request::{RpcError, RpcRequest}, rpc_sender::RpcSender},
    async_trait::async_trait,
    serde_json::Value,
    std::{sync::Arc, time::Duration},
    tokio::sync::Semaphore,
};

pub struct RateLimiter {
    permits: Arc<Semaphore>,
    demand: usize,
}

impl RateLimiter {
    /// Allow `demand` requests per `interval`. Must be called from within
    /// a tokio runtime; the replenishment task exits when the limiter is
    /// dropped.
    pub fn new(demand: usize, interval: Duration) -> Self {
        let permits = Arc::new(Semaphore::new(demand));
        let replenish = Arc::downgrade(&permits);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Some(permits) = replenish.upgrade() else {
                    break;
                };
                let deficit = demand.saturating_sub(permits.available_permits());
                if deficit > 0 {
                    permits.add_permits(deficit);
                }
            }
        });
        Self { permits, demand }
    }

    /// Consume `n` permits, waiting for replenishment as needed. Demands
    /// larger than the configured bound are clamped down to it; they
    /// could never be met otherwise.
    pub async fn acquire(&self, n: usize) {
        let n = n.clamp(1, self.demand) as u32;
        self.permits
            .acquire_many(n)
            .await
            .expect("limiter semaphore is never closed")
            .forget();
    }
}

/// An [`RpcSender`] that meters another sender through a [`RateLimiter`].
pub struct RateLimitedSender<S> {
    sender: S,
    limiter: RateLimiter,
}

impl<S: RpcSender> RateLimitedSender<S> {
    pub fn new(sender: S, limiter: RateLimiter) -> Self {
        Self { sender, limiter }
    }
}

#[async_trait]
impl<S: RpcSender + Send + Sync> RpcSender for RateLimitedSender<S> {
    async fn send(&self, request: RpcRequest, params: Value) -> Result<Value> {
        self.limiter.acquire(1).await;
        self.sender.send(request, params).await
    }

    async fn send_batch(
        &self,
        requests: Vec<(RpcRequest, Value)>,
    ) -> Result<Vec<std::result::Result<Value, RpcError>>> {
        self.limiter.acquire(requests.len()).await;
        self.sender.send_batch(requests).await
    }

    fn url(&self) -> String {
        self.sender.url()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::mock_sender::MockSender, serde_json::json, tokio::time::Instant};

    #[tokio::test(start_paused = true)]
    async fn test_demand_is_bounded_and_replenished() {
        let limiter = RateLimiter::new(2, Duration::from_millis(100));
        let start = Instant::now();

        // the initial pool covers two acquisitions immediately
        limiter.acquire(1).await;
        limiter.acquire(1).await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        // the third waits for the next replenishment tick
        limiter.acquire(1).await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unused_demand_does_not_accumulate() {
        let limiter = RateLimiter::new(2, Duration::from_millis(100));
        // sit idle across many replenishment intervals
        tokio::time::sleep(Duration::from_millis(1_000)).await;

        let start = Instant::now();
        limiter.acquire(2).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        // the bound still holds: a third permit requires a tick
        limiter.acquire(1).await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_batch_demand_is_clamped() {
        let limiter = RateLimiter::new(2, Duration::from_millis(100));
        // asking for more than the bound would otherwise never complete
        limiter.acquire(5).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_limited_sender_forwards() {
        let sender = RateLimitedSender::new(
            MockSender::new("succeeds"),
            RateLimiter::new(10, Duration::from_millis(100)),
        );
        let response = sender
            .send(RpcRequest::GetBalance, json!(["someAddress"]))
            .await
            .unwrap();
        assert_eq!(response["value"], 50);
        assert_eq!(sender.url(), "succeeds");
    }
}
