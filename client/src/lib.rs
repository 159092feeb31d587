//! JSON-RPC plumbing for a Solana cluster: request encoding, method-aware
//! response decoding, an HTTP transport with retries, a client façade, and
//! the confirmation tracker that polls signatures to a requested
//! commitment level.
//!
//! The transport sits behind the [`rpc_sender::RpcSender`] trait;
//! [`mock_sender::MockSender`] swaps in canned responses for tests, and
//! [`rate_limit::RateLimitedSender`] interposes a bounded-demand limiter
//! without changing any caller.

pub mod account_views;
pub mod client_error;
pub mod cluster;
pub mod http_sender;
pub mod mock_sender;
pub mod rate_limit;
pub mod rpc_client;
pub mod rpc_params;
pub mod rpc_request;
pub mod rpc_response;
pub mod rpc_sender;
pub mod signature_tracker;
