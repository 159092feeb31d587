//! The transport seam between [`RpcClient`](crate::rpc_client::RpcClient)
//! and whatever actually moves bytes.

use {
    crate::{client_error::Result, rpc_request::{RpcError, RpcRequest}},
    async_trait::async_trait,
    serde_json::Value,
};

/// A transport for RPC calls.
///
/// Implementations post JSON-RPC envelopes and hand back the `result`
/// member of the response. The production implementation is
/// [`HttpSender`](crate::http_sender::HttpSender); tests use
/// [`MockSender`](crate::mock_sender::MockSender), and
/// [`RateLimitedSender`](crate::rate_limit::RateLimitedSender) wraps any
/// other sender.
#[async_trait]
pub trait RpcSender {
    /// Send one request; id 0 on the wire.
    async fn send(&self, request: RpcRequest, params: Value) -> Result<Value>;

    /// Send a batch. The returned vector is in request order regardless of
    /// the order the server answered; per-element RPC errors stay
    /// per-element so one bad request cannot sink its batch.
    async fn send_batch(
        &self,
        requests: Vec<(RpcRequest, Value)>,
    ) -> Result<Vec<std::result::Result<Value, RpcError>>>;

    fn url(&self) -> String;
}
