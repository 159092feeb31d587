//! The error type handed back by every client operation.

use {
    crate::{
        account_views::ParseViewError, rpc_params::RpcParamsError, rpc_request::RpcError,
    },
    lumos_sdk::signature::Signature,
    std::io,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum ClientErrorKind {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    RpcError(#[from] RpcError),
    #[error(transparent)]
    Params(#[from] RpcParamsError),
    #[error(transparent)]
    ParseView(#[from] ParseViewError),
    /// A non-retryable HTTP status (4xx), or a 5xx that outlived every
    /// retry.
    #[error("HTTP status {0}")]
    HttpError(u16),
    /// The confirmation deadline elapsed; carries whatever confirmed
    /// before it did.
    #[error("confirmation timed out with {} signatures confirmed", .confirmed.len())]
    ConfirmationTimeout { confirmed: Vec<Signature> },
    #[error("{0}")]
    Custom(String),
}

#[derive(Debug, Error)]
#[error("{kind}")]
pub struct ClientError {
    /// The RPC method this error belongs to, when known.
    request: Option<&'static str>,
    #[source]
    pub kind: ClientErrorKind,
}

impl ClientError {
    pub fn new_with_request(kind: ClientErrorKind, request: &'static str) -> Self {
        Self {
            request: Some(request),
            kind,
        }
    }

    pub fn into_with_request(self, request: &'static str) -> Self {
        Self {
            request: Some(request),
            ..self
        }
    }

    pub fn request(&self) -> Option<&'static str> {
        self.request
    }

    pub fn kind(&self) -> &ClientErrorKind {
        &self.kind
    }
}

impl<T> From<T> for ClientError
where
    ClientErrorKind: From<T>,
{
    fn from(thing: T) -> Self {
        Self {
            request: None,
            kind: thing.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_attachment() {
        let err: ClientError = RpcError::RpcRequestError("boom".to_string()).into();
        assert_eq!(err.request(), None);
        let err = err.into_with_request("getBalance");
        assert_eq!(err.request(), Some("getBalance"));
        assert!(matches!(err.kind(), ClientErrorKind::RpcError(_)));
    }

    #[test]
    fn test_display_forwards_kind() {
        let err: ClientError = ClientErrorKind::HttpError(502).into();
        assert_eq!(err.to_string(), "HTTP status 502");
    }
}
