//! An [`RpcSender`] for unit tests: canned responses, no network.

use {
    crate::{
        client_error::Result,
        rpc_request::{RpcError, RpcRequest},
        rpc_sender::RpcSender,
    },
    async_trait::async_trait,
    base64::Engine,
    lumos_sdk::{signature::Signature, transaction::Transaction},
    serde_json::{json, Value},
    std::{collections::HashMap, sync::RwLock},
};

pub type Mocks = HashMap<RpcRequest, Value>;

/// Returns a reasonable default response for every supported request, or a
/// caller-provided mock. A mock installed for a request is consumed by its
/// first use.
///
/// `sendTransaction` is special-cased to deserialize the submitted wire
/// bytes and echo back the transaction's own first signature, so tests
/// exercise the full encode path.
pub struct MockSender {
    mocks: RwLock<Mocks>,
    url: String,
}

impl MockSender {
    pub fn new<U: ToString>(url: U) -> Self {
        Self::new_with_mocks(url, Mocks::default())
    }

    pub fn new_with_mocks<U: ToString>(url: U, mocks: Mocks) -> Self {
        Self {
            mocks: RwLock::new(mocks),
            url: url.to_string(),
        }
    }

    fn mock_blockhash() -> String {
        bs58::encode([42u8; 32]).into_string()
    }

    fn default_response(&self, request: RpcRequest, params: &Value) -> Result<Value> {
        let response = match request {
            RpcRequest::GetAccountInfo => json!({
                "context": {"slot": 1},
                "value": Value::Null,
            }),
            RpcRequest::GetBalance => json!({
                "context": {"slot": 1},
                "value": 50,
            }),
            RpcRequest::GetBlock => Value::Null,
            RpcRequest::GetLatestBlockhash => json!({
                "context": {"slot": 1},
                "value": {
                    "blockhash": Self::mock_blockhash(),
                    "lastValidBlockHeight": 1_000u64,
                },
            }),
            RpcRequest::GetMinimumBalanceForRentExemption => json!(2_039_280u64),
            RpcRequest::GetMultipleAccounts => {
                let count = params[0].as_array().map(Vec::len).unwrap_or_default();
                json!({
                    "context": {"slot": 1},
                    "value": vec![Value::Null; count],
                })
            }
            RpcRequest::GetRecentBlockhash => json!({
                "context": {"slot": 1},
                "value": {
                    "blockhash": Self::mock_blockhash(),
                    "feeCalculator": {"lamportsPerSignature": 5_000u64},
                },
            }),
            RpcRequest::GetSignatureStatuses => {
                let count = params[0].as_array().map(Vec::len).unwrap_or_default();
                let status = json!({
                    "slot": 72,
                    "confirmations": Value::Null,
                    "err": Value::Null,
                    "confirmationStatus": "finalized",
                });
                json!({
                    "context": {"slot": 72},
                    "value": vec![status; count],
                })
            }
            RpcRequest::GetSignaturesForAddress => json!([]),
            RpcRequest::GetTokenLargestAccounts => json!({
                "context": {"slot": 1},
                "value": [],
            }),
            RpcRequest::GetTokenSupply => json!({
                "context": {"slot": 1},
                "value": {
                    "amount": "771",
                    "decimals": 2,
                    "uiAmount": 7.71,
                    "uiAmountString": "7.71",
                },
            }),
            RpcRequest::GetTransaction => Value::Null,
            RpcRequest::RequestAirdrop => {
                json!(Signature::new_from_array([8u8; 64]).to_string())
            }
            RpcRequest::SendTransaction => {
                let encoded = params[0].as_str().unwrap_or_default();
                let wire = base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|err| RpcError::ParseError(err.to_string()))?;
                let transaction = Transaction::deserialize(&wire)
                    .map_err(|err| RpcError::ParseError(err.to_string()))?;
                let signature = transaction
                    .signatures
                    .first()
                    .copied()
                    .ok_or_else(|| RpcError::ParseError("a signed transaction".to_string()))?;
                json!(signature.to_string())
            }
        };
        Ok(response)
    }
}

#[async_trait]
impl RpcSender for MockSender {
    async fn send(&self, request: RpcRequest, params: Value) -> Result<Value> {
        if self.url == "fails" {
            return Ok(Value::Null);
        }
        if let Some(response) = self.mocks.write().unwrap().remove(&request) {
            // a canned envelope with an `error` member behaves like a
            // server-side error
            if response.get("error").is_some() {
                return crate::rpc_request::extract_result(response).map_err(Into::into);
            }
            return Ok(response);
        }
        self.default_response(request, &params)
    }

    async fn send_batch(
        &self,
        requests: Vec<(RpcRequest, Value)>,
    ) -> Result<Vec<std::result::Result<Value, RpcError>>> {
        let mut responses = Vec::with_capacity(requests.len());
        for (request, params) in requests {
            responses.push(
                self.send(request, params)
                    .await
                    .map_err(|err| RpcError::RpcRequestError(err.to_string())),
            );
        }
        Ok(responses)
    }

    fn url(&self) -> String {
        self.url.clone()
    }
}
