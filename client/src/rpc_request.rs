//! JSON-RPC 2.0 request encoding, single and batched.

use {
    serde_json::{json, Value},
    thiserror::Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcRequest {
    GetAccountInfo,
    GetBalance,
    GetBlock,
    GetLatestBlockhash,
    GetMinimumBalanceForRentExemption,
    GetMultipleAccounts,
    GetRecentBlockhash,
    GetSignatureStatuses,
    GetSignaturesForAddress,
    GetTokenLargestAccounts,
    GetTokenSupply,
    GetTransaction,
    RequestAirdrop,
    SendTransaction,
}

impl RpcRequest {
    pub fn method(self) -> &'static str {
        match self {
            RpcRequest::GetAccountInfo => "getAccountInfo",
            RpcRequest::GetBalance => "getBalance",
            RpcRequest::GetBlock => "getBlock",
            RpcRequest::GetLatestBlockhash => "getLatestBlockhash",
            RpcRequest::GetMinimumBalanceForRentExemption => {
                "getMinimumBalanceForRentExemption"
            }
            RpcRequest::GetMultipleAccounts => "getMultipleAccounts",
            RpcRequest::GetRecentBlockhash => "getRecentBlockhash",
            RpcRequest::GetSignatureStatuses => "getSignatureStatuses",
            RpcRequest::GetSignaturesForAddress => "getSignaturesForAddress",
            RpcRequest::GetTokenLargestAccounts => "getTokenLargestAccounts",
            RpcRequest::GetTokenSupply => "getTokenSupply",
            RpcRequest::GetTransaction => "getTransaction",
            RpcRequest::RequestAirdrop => "requestAirdrop",
            RpcRequest::SendTransaction => "sendTransaction",
        }
    }

    /// Wrap `params` in a JSON-RPC 2.0 envelope. Empty trailing config
    /// maps are dropped so optional options never clutter the wire.
    pub fn build_request_json(self, id: u64, params: Value) -> Value {
        let params = clean_params(params);
        let mut request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": self.method(),
        });
        if !matches!(&params, Value::Array(array) if array.is_empty()) {
            request["params"] = params;
        }
        request
    }
}

impl std::fmt::Display for RpcRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.method())
    }
}

fn clean_params(mut params: Value) -> Value {
    if let Value::Array(array) = &mut params {
        while matches!(array.last(), Some(Value::Object(map)) if map.is_empty()) {
            array.pop();
        }
    }
    params
}

/// Encode a batch, assigning ascending integer ids starting at zero; the
/// transport matches responses back to requests by these ids.
pub fn build_batch_json(requests: &[(RpcRequest, Value)]) -> Value {
    Value::Array(
        requests
            .iter()
            .enumerate()
            .map(|(id, (request, params))| {
                request.build_request_json(id as u64, params.clone())
            })
            .collect(),
    )
}

/// Errors surfaced by the RPC layer itself, as opposed to the transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("RPC request error: {0}")]
    RpcRequestError(String),
    #[error("RPC response error {code}: {message}")]
    RpcResponseError {
        code: i64,
        message: String,
        /// Program logs attached to a pre-flight failure, when present.
        logs: Option<Vec<String>>,
    },
    #[error("parse error: expected {0}")]
    ParseError(String),
}

/// Split a JSON-RPC response envelope into its `result`, lifting an
/// `error` member (and any program logs inside it) into [`RpcError`].
pub fn extract_result(mut response: Value) -> Result<Value, RpcError> {
    if let Some(error) = response.get("error") {
        let logs = error
            .get("data")
            .and_then(|data| data.get("logs"))
            .and_then(|logs| serde_json::from_value(logs.clone()).ok());
        return Err(RpcError::RpcResponseError {
            code: error["code"].as_i64().unwrap_or(0),
            message: error["message"].as_str().unwrap_or_default().to_string(),
            logs,
        });
    }
    Ok(response["result"].take())
}
