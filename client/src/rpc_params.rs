//! The known-options registry: which config options each RPC method
//! accepts, and the projection of snake_case option names onto the
//! camelCase the wire expects.
//!
//! Every typed [`RpcClient`](crate::rpc_client::RpcClient) method routes
//! its config map through [`validate_params`], so an unknown, missing, or
//! ill-typed option is always a descriptive local error and never a
//! confusing server response.

use {
    crate::rpc_request::RpcRequest,
    lumos_sdk::commitment_config::CommitmentLevel,
    serde_json::{Map, Value},
    thiserror::Error,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcParamsError {
    #[error("unknown option `{field}` for {method}")]
    UnknownParam { method: &'static str, field: String },
    #[error("invalid value for `{field}`: {reason}")]
    InvalidParam { field: String, reason: String },
    #[error("missing required option `{field}`")]
    MissingParam { field: &'static str },
}

/// How a single option is validated.
#[derive(Debug, Clone, Copy)]
pub enum ParamKind {
    /// One of `processed`, `confirmed`, `finalized`.
    Commitment,
    /// Membership in a fixed set of strings.
    OneOf(&'static [&'static str]),
    /// Any non-negative integer.
    UnsignedInt,
    /// An integer within an inclusive range.
    BoundedInt { min: u64, max: u64 },
    Bool,
    /// A base58 transaction signature.
    Signature,
}

/// One entry in a method's options table.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    /// The caller-facing snake_case name.
    pub name: &'static str,
    /// The camelCase name that goes on the wire.
    pub wire: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    /// Applied when the caller omits the option.
    pub default: Option<&'static str>,
}

const fn optional(name: &'static str, wire: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec {
        name,
        wire,
        kind,
        required: false,
        default: None,
    }
}

const COMMITMENT: ParamSpec = optional("commitment", "commitment", ParamKind::Commitment);

const ENCODING_BINARY: ParamSpec = optional(
    "encoding",
    "encoding",
    ParamKind::OneOf(&["base58", "base64", "jsonParsed"]),
);

const COMMITMENT_ONLY: &[ParamSpec] = &[COMMITMENT];

const ACCOUNT_PARAMS: &[ParamSpec] = &[COMMITMENT, ENCODING_BINARY];

const BLOCK_PARAMS: &[ParamSpec] = &[
    COMMITMENT,
    optional(
        "encoding",
        "encoding",
        ParamKind::OneOf(&["json", "jsonParsed", "base58", "base64"]),
    ),
    optional(
        "transaction_details",
        "transactionDetails",
        ParamKind::OneOf(&["full", "signatures", "none"]),
    ),
    optional("rewards", "rewards", ParamKind::Bool),
];

const TRANSACTION_PARAMS: &[ParamSpec] = &[
    COMMITMENT,
    optional(
        "encoding",
        "encoding",
        ParamKind::OneOf(&["json", "jsonParsed", "base58", "base64"]),
    ),
];

const SIGNATURES_FOR_ADDRESS_PARAMS: &[ParamSpec] = &[
    COMMITMENT,
    optional("limit", "limit", ParamKind::BoundedInt { min: 1, max: 1000 }),
    optional("before", "before", ParamKind::Signature),
    optional("until", "until", ParamKind::Signature),
];

const SIGNATURE_STATUSES_PARAMS: &[ParamSpec] = &[optional(
    "search_transaction_history",
    "searchTransactionHistory",
    ParamKind::Bool,
)];

/// `sendTransaction` is the one method that renames its commitment option
/// and defaults its encoding.
const SEND_TRANSACTION_PARAMS: &[ParamSpec] = &[
    optional("commitment", "preflightCommitment", ParamKind::Commitment),
    ParamSpec {
        name: "encoding",
        wire: "encoding",
        kind: ParamKind::OneOf(&["base58", "base64"]),
        required: false,
        default: Some("base64"),
    },
    optional("skip_preflight", "skipPreflight", ParamKind::Bool),
    optional("max_retries", "maxRetries", ParamKind::UnsignedInt),
];

/// The options accepted by `request`.
pub fn known_params(request: RpcRequest) -> &'static [ParamSpec] {
    match request {
        RpcRequest::GetAccountInfo | RpcRequest::GetMultipleAccounts => ACCOUNT_PARAMS,
        RpcRequest::GetBalance
        | RpcRequest::GetLatestBlockhash
        | RpcRequest::GetRecentBlockhash
        | RpcRequest::GetMinimumBalanceForRentExemption
        | RpcRequest::GetTokenLargestAccounts
        | RpcRequest::GetTokenSupply
        | RpcRequest::RequestAirdrop => COMMITMENT_ONLY,
        RpcRequest::GetBlock => BLOCK_PARAMS,
        RpcRequest::GetTransaction => TRANSACTION_PARAMS,
        RpcRequest::GetSignaturesForAddress => SIGNATURES_FOR_ADDRESS_PARAMS,
        RpcRequest::GetSignatureStatuses => SIGNATURE_STATUSES_PARAMS,
        RpcRequest::SendTransaction => SEND_TRANSACTION_PARAMS,
    }
}

fn check_value(spec: &ParamSpec, value: &Value) -> Result<(), RpcParamsError> {
    let invalid = |reason: String| RpcParamsError::InvalidParam {
        field: spec.name.to_string(),
        reason,
    };
    match spec.kind {
        ParamKind::Commitment => {
            let level = value.as_str().ok_or_else(|| invalid("expected a string".into()))?;
            level
                .parse::<CommitmentLevel>()
                .map_err(|_| invalid(format!("`{level}` is not a commitment level")))?;
        }
        ParamKind::OneOf(allowed) => {
            let choice = value.as_str().ok_or_else(|| invalid("expected a string".into()))?;
            if !allowed.contains(&choice) {
                return Err(invalid(format!("`{choice}` is not one of {allowed:?}")));
            }
        }
        ParamKind::UnsignedInt => {
            value
                .as_u64()
                .ok_or_else(|| invalid("expected a non-negative integer".into()))?;
        }
        ParamKind::BoundedInt { min, max } => {
            let number = value
                .as_u64()
                .ok_or_else(|| invalid("expected a non-negative integer".into()))?;
            if !(min..=max).contains(&number) {
                return Err(invalid(format!("{number} is outside {min}..={max}")));
            }
        }
        ParamKind::Bool => {
            value.as_bool().ok_or_else(|| invalid("expected a bool".into()))?;
        }
        ParamKind::Signature => {
            let signature = value.as_str().ok_or_else(|| invalid("expected a string".into()))?;
            signature
                .parse::<lumos_sdk::signature::Signature>()
                .map_err(|err| invalid(err.to_string()))?;
        }
    }
    Ok(())
}

/// Check `options` against the method's table and return the normalized
/// camelCase map, defaults applied.
pub fn validate_params(
    request: RpcRequest,
    options: &Map<String, Value>,
) -> Result<Map<String, Value>, RpcParamsError> {
    let specs = known_params(request);
    let mut normalized = Map::new();

    for (name, value) in options {
        let spec = specs.iter().find(|spec| spec.name == name).ok_or_else(|| {
            RpcParamsError::UnknownParam {
                method: request.method(),
                field: name.clone(),
            }
        })?;
        check_value(spec, value)?;
        normalized.insert(spec.wire.to_string(), value.clone());
    }

    for spec in specs {
        if normalized.contains_key(spec.wire) {
            continue;
        }
        if let Some(default) = spec.default {
            normalized.insert(spec.wire.to_string(), Value::String(default.to_string()));
        } else if spec.required {
            return Err(RpcParamsError::MissingParam { field: spec.name });
        }
    }

    Ok(normalized)
}
