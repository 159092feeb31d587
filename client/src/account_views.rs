//! Decoded views over `jsonParsed` account data.
//!
//! Mint, token-account, multisig, and nonce accounts share one JSON
//! envelope, `{"program": .., "parsed": {"type": .., "info": ..}}`, with
//! differing `info` payloads, so a single parser dispatches on the
//! envelope and returns a tagged [`AccountInfoView`].

use {
    lumos_sdk::{fee_calculator::FeeCalculator, hash::Hash, pubkey::Pubkey},
    serde_json::Value,
    thiserror::Error,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseViewError {
    #[error("program `{0}` is not parsable")]
    UnsupportedProgram(String),
    #[error("account type `{0}` is not parsable")]
    UnsupportedType(String),
    #[error("invalid `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
}

fn invalid(field: &str, reason: impl ToString) -> ParseViewError {
    ParseViewError::InvalidField {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountInfoView {
    Mint(MintView),
    Token(TokenAccountView),
    Multisig(MultisigView),
    Nonce(NonceView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintView {
    pub mint_authority: Option<Pubkey>,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<Pubkey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAccountState {
    Uninitialized,
    Initialized,
    Frozen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountView {
    pub mint: Pubkey,
    pub owner: Pubkey,
    /// Balance in the mint's base units.
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    pub delegated_amount: u64,
    pub state: TokenAccountState,
    pub is_native: bool,
    /// Present only on wrapped-SOL accounts.
    pub rent_exempt_reserve: Option<u64>,
    pub close_authority: Option<Pubkey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigView {
    pub num_required_signers: u8,
    pub num_valid_signers: u8,
    pub is_initialized: bool,
    pub signers: Vec<Pubkey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceView {
    pub authority: Pubkey,
    pub blockhash: Hash,
    pub fee_calculator: FeeCalculator,
}

/// Parse the `data` member of a `jsonParsed`-encoded account.
pub fn parse_account_view(data: &Value) -> Result<AccountInfoView, ParseViewError> {
    let program = data["program"].as_str().unwrap_or_default();
    let parsed = &data["parsed"];
    let account_type = parsed["type"].as_str().unwrap_or_default();
    let info = &parsed["info"];

    match program {
        "spl-token" => match account_type {
            "mint" => Ok(AccountInfoView::Mint(parse_mint(info)?)),
            "account" => Ok(AccountInfoView::Token(parse_token_account(info)?)),
            "multisig" => Ok(AccountInfoView::Multisig(parse_multisig(info)?)),
            other => Err(ParseViewError::UnsupportedType(other.to_string())),
        },
        "nonce" => match account_type {
            "initialized" => Ok(AccountInfoView::Nonce(parse_nonce(info)?)),
            other => Err(ParseViewError::UnsupportedType(other.to_string())),
        },
        other => Err(ParseViewError::UnsupportedProgram(other.to_string())),
    }
}

fn pubkey_field(info: &Value, field: &str) -> Result<Pubkey, ParseViewError> {
    let value = info[field]
        .as_str()
        .ok_or_else(|| invalid(field, "expected a base58 string"))?;
    value.parse().map_err(|err| invalid(field, err))
}

fn optional_pubkey_field(info: &Value, field: &str) -> Result<Option<Pubkey>, ParseViewError> {
    match &info[field] {
        Value::Null => Ok(None),
        Value::String(value) => value.parse().map(Some).map_err(|err| invalid(field, err)),
        _ => Err(invalid(field, "expected a base58 string or null")),
    }
}

fn bool_field(info: &Value, field: &str) -> Result<bool, ParseViewError> {
    info[field]
        .as_bool()
        .ok_or_else(|| invalid(field, "expected a bool"))
}

fn u8_field(info: &Value, field: &str) -> Result<u8, ParseViewError> {
    info[field]
        .as_u64()
        .and_then(|value| u8::try_from(value).ok())
        .ok_or_else(|| invalid(field, "expected a small integer"))
}

/// Amounts appear as JSON strings (u64 precision survives) but are
/// tolerated as numbers too.
fn amount_field(value: &Value, field: &str) -> Result<u64, ParseViewError> {
    match value {
        Value::String(amount) => amount.parse().map_err(|err| invalid(field, err)),
        Value::Number(amount) => amount
            .as_u64()
            .ok_or_else(|| invalid(field, "expected a non-negative integer")),
        _ => Err(invalid(field, "expected an integer or string")),
    }
}

/// A `tokenAmount`-shaped object, or null/absent mapped to `None`.
fn optional_token_amount(info: &Value, field: &str) -> Result<Option<u64>, ParseViewError> {
    match &info[field] {
        Value::Null => Ok(None),
        value => amount_field(&value["amount"], field).map(Some),
    }
}

fn parse_mint(info: &Value) -> Result<MintView, ParseViewError> {
    Ok(MintView {
        mint_authority: optional_pubkey_field(info, "mintAuthority")?,
        supply: amount_field(&info["supply"], "supply")?,
        decimals: u8_field(info, "decimals")?,
        is_initialized: bool_field(info, "isInitialized")?,
        freeze_authority: optional_pubkey_field(info, "freezeAuthority")?,
    })
}

fn parse_token_account(info: &Value) -> Result<TokenAccountView, ParseViewError> {
    let state = match info["state"].as_str() {
        Some("uninitialized") => TokenAccountState::Uninitialized,
        Some("initialized") => TokenAccountState::Initialized,
        Some("frozen") => TokenAccountState::Frozen,
        other => return Err(invalid("state", format!("unknown state {other:?}"))),
    };
    Ok(TokenAccountView {
        mint: pubkey_field(info, "mint")?,
        owner: pubkey_field(info, "owner")?,
        amount: amount_field(&info["tokenAmount"]["amount"], "tokenAmount")?,
        delegate: optional_pubkey_field(info, "delegate")?,
        delegated_amount: optional_token_amount(info, "delegatedAmount")?.unwrap_or(0),
        state,
        is_native: bool_field(info, "isNative")?,
        rent_exempt_reserve: optional_token_amount(info, "rentExemptReserve")?,
        close_authority: optional_pubkey_field(info, "closeAuthority")?,
    })
}

fn parse_multisig(info: &Value) -> Result<MultisigView, ParseViewError> {
    let signers = info["signers"]
        .as_array()
        .ok_or_else(|| invalid("signers", "expected an array"))?
        .iter()
        .map(|signer| {
            signer
                .as_str()
                .ok_or_else(|| invalid("signers", "expected base58 strings"))?
                .parse()
                .map_err(|err| invalid("signers", err))
        })
        .collect::<Result<Vec<Pubkey>, _>>()?;
    Ok(MultisigView {
        num_required_signers: u8_field(info, "numRequiredSigners")?,
        num_valid_signers: u8_field(info, "numValidSigners")?,
        is_initialized: bool_field(info, "isInitialized")?,
        signers,
    })
}

fn parse_nonce(info: &Value) -> Result<NonceView, ParseViewError> {
    let blockhash = info["blockhash"]
        .as_str()
        .ok_or_else(|| invalid("blockhash", "expected a base58 string"))?
        .parse()
        .map_err(|err| invalid("blockhash", err))?;
    Ok(NonceView {
        authority: pubkey_field(info, "authority")?,
        blockhash,
        fee_calculator: FeeCalculator::new(amount_field(
            &info["feeCalculator"]["lamportsPerSignature"],
            "feeCalculator",
        )?),
    })
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn test_parse_mint() {
        let authority = Pubkey::new_unique();
        let view = parse_account_view(&json!({
            "program": "spl-token",
            "parsed": {
                "type": "mint",
                "info": {
                    "mintAuthority": authority.to_string(),
                    "supply": "10000000",
                    "decimals": 6,
                    "isInitialized": true,
                    "freezeAuthority": null,
                },
            },
            "space": 82,
        }))
        .unwrap();
        assert_eq!(
            view,
            AccountInfoView::Mint(MintView {
                mint_authority: Some(authority),
                supply: 10_000_000,
                decimals: 6,
                is_initialized: true,
                freeze_authority: None,
            })
        );
    }

    #[test]
    fn test_parse_token_account() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let delegate = Pubkey::new_unique();
        let view = parse_account_view(&json!({
            "program": "spl-token",
            "parsed": {
                "type": "account",
                "info": {
                    "mint": mint.to_string(),
                    "owner": owner.to_string(),
                    "state": "initialized",
                    "isNative": false,
                    "tokenAmount": {
                        "amount": "771",
                        "decimals": 2,
                        "uiAmount": 7.71,
                        "uiAmountString": "7.71",
                    },
                    "delegate": delegate.to_string(),
                    "delegatedAmount": {
                        "amount": "100",
                        "decimals": 2,
                        "uiAmount": 1.0,
                        "uiAmountString": "1",
                    },
                },
            },
            "space": 165,
        }))
        .unwrap();
        let AccountInfoView::Token(token) = view else {
            panic!("expected a token account view");
        };
        assert_eq!(token.mint, mint);
        assert_eq!(token.owner, owner);
        assert_eq!(token.amount, 771);
        assert_eq!(token.delegate, Some(delegate));
        assert_eq!(token.delegated_amount, 100);
        assert_eq!(token.state, TokenAccountState::Initialized);
        assert!(!token.is_native);
        assert_eq!(token.rent_exempt_reserve, None);
        assert_eq!(token.close_authority, None);
    }

    #[test]
    fn test_parse_multisig() {
        let signers: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        let view = parse_account_view(&json!({
            "program": "spl-token",
            "parsed": {
                "type": "multisig",
                "info": {
                    "numRequiredSigners": 2,
                    "numValidSigners": 3,
                    "isInitialized": true,
                    "signers": signers.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                },
            },
            "space": 355,
        }))
        .unwrap();
        assert_eq!(
            view,
            AccountInfoView::Multisig(MultisigView {
                num_required_signers: 2,
                num_valid_signers: 3,
                is_initialized: true,
                signers,
            })
        );
    }

    #[test]
    fn test_parse_nonce() {
        let authority = Pubkey::new_unique();
        let blockhash = lumos_sdk::hash::hash(b"nonce");
        let view = parse_account_view(&json!({
            "program": "nonce",
            "parsed": {
                "type": "initialized",
                "info": {
                    "authority": authority.to_string(),
                    "blockhash": blockhash.to_string(),
                    "feeCalculator": {"lamportsPerSignature": "5000"},
                },
            },
            "space": 80,
        }))
        .unwrap();
        assert_eq!(
            view,
            AccountInfoView::Nonce(NonceView {
                authority,
                blockhash,
                fee_calculator: FeeCalculator::new(5_000),
            })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_shapes() {
        assert_eq!(
            parse_account_view(&json!({"program": "vote", "parsed": {}})),
            Err(ParseViewError::UnsupportedProgram("vote".to_string()))
        );
        assert_eq!(
            parse_account_view(&json!({
                "program": "spl-token",
                "parsed": {"type": "tokenMetadata", "info": {}},
            })),
            Err(ParseViewError::UnsupportedType("tokenMetadata".to_string()))
        );
        assert!(matches!(
            parse_account_view(&json!({
                "program": "spl-token",
                "parsed": {"type": "mint", "info": {"supply": "x"}},
            })),
            Err(ParseViewError::InvalidField { .. })
        ));
    }
}
