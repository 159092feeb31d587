//! The production [`RpcSender`]: HTTP POST via reqwest, with retries.
//!
//! Retry policy: transport errors and HTTP 5xx are retried with
//! exponential backoff (500 ms doubling, capped at 4000 ms per wait), at
//! most ten attempts in total. Any other non-success status is surfaced
//! immediately; a 4xx will not get better by waiting.

use {
    crate::{
        client_error::{ClientError, ClientErrorKind, Result},
        rpc_request::{self, RpcError, RpcRequest},
        rpc_sender::RpcSender,
    },
    async_trait::async_trait,
    log::*,
    serde_json::Value,
    std::{collections::HashMap, time::Duration},
};

const MAX_ATTEMPTS: usize = 10;
const INITIAL_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 4_000;

pub struct HttpSender {
    client: reqwest::Client,
    url: String,
}

impl HttpSender {
    pub fn new<U: ToString>(url: U) -> Self {
        Self::new_with_timeout(url, Duration::from_secs(30))
    }

    pub fn new_with_timeout<U: ToString>(url: U, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("build reqwest client");
        Self {
            client,
            url: url.to_string(),
        }
    }

    async fn post_with_retries(&self, body: &Value) -> Result<Value> {
        let mut backoff_ms = INITIAL_BACKOFF_MS;
        for attempt in 1..=MAX_ATTEMPTS {
            let retryable_error: ClientError =
                match self.client.post(&self.url).json(body).send().await {
                    Ok(response) if response.status().is_success() => {
                        return response.json::<Value>().await.map_err(Into::into);
                    }
                    Ok(response) if response.status().is_server_error() => {
                        ClientErrorKind::HttpError(response.status().as_u16()).into()
                    }
                    Ok(response) => {
                        return Err(
                            ClientErrorKind::HttpError(response.status().as_u16()).into()
                        );
                    }
                    Err(err) => err.into(),
                };
            if attempt == MAX_ATTEMPTS {
                return Err(retryable_error);
            }
            info!(
                "rpc request to {} failed ({}), {} attempts left",
                self.url,
                retryable_error,
                MAX_ATTEMPTS - attempt,
            );
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
        }
        unreachable!("the final attempt returns");
    }
}

#[async_trait]
impl RpcSender for HttpSender {
    async fn send(&self, request: RpcRequest, params: Value) -> Result<Value> {
        let body = request.build_request_json(0, params);
        let response = self.post_with_retries(&body).await?;
        rpc_request::extract_result(response)
            .map_err(|err| ClientError::new_with_request(err.into(), request.method()))
    }

    async fn send_batch(
        &self,
        requests: Vec<(RpcRequest, Value)>,
    ) -> Result<Vec<std::result::Result<Value, RpcError>>> {
        if requests.is_empty() {
            return Ok(vec![]);
        }
        let body = rpc_request::build_batch_json(&requests);
        let response = self.post_with_retries(&body).await?;
        let Value::Array(entries) = response else {
            return Err(
                RpcError::ParseError("a JSON array in reply to a batch".to_string()).into(),
            );
        };

        // responses may arrive in any order; ids map them back
        let mut by_id: HashMap<u64, Value> = entries
            .into_iter()
            .filter_map(|entry| entry.get("id").and_then(Value::as_u64).map(|id| (id, entry)))
            .collect();

        Ok((0..requests.len() as u64)
            .map(|id| match by_id.remove(&id) {
                Some(entry) => rpc_request::extract_result(entry),
                None => Err(RpcError::ParseError(format!(
                    "a batch response with id {id}"
                ))),
            })
            .collect())
    }

    fn url(&self) -> String {
        self.url.clone()
    }
}
