//! Typed RPC responses and the method-aware decoding of their base58
//! fields into [`Pubkey`]s, [`Signature`]s, and [`Hash`]es.

use {
    crate::rpc_request::RpcError,
    lumos_sdk::{
        commitment_config::CommitmentLevel,
        fee_calculator::FeeCalculator,
        hash::Hash,
        instruction::CompiledInstruction,
        message::MessageHeader,
        pubkey::Pubkey,
        signature::Signature,
    },
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponseContext {
    pub slot: u64,
}

/// The `{context, value}` envelope most account-level queries return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    pub context: RpcResponseContext,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlockhash {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlockhashFeeCalculator {
    pub blockhash: String,
    pub fee_calculator: FeeCalculator,
}

/// A raw account, `owner` still base58. [`UiAccount::owner`] decodes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiAccount {
    pub lamports: u64,
    /// Either an `[data, encoding]` pair or a `jsonParsed` object,
    /// depending on the requested encoding.
    pub data: Value,
    pub owner: String,
    pub executable: bool,
    pub rent_epoch: u64,
}

impl UiAccount {
    pub fn owner(&self) -> Result<Pubkey, RpcError> {
        self.owner
            .parse()
            .map_err(|_| RpcError::ParseError(format!("valid owner pubkey, got `{}`", self.owner)))
    }
}

/// One signature's status, as returned by `getSignatureStatuses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    pub slot: u64,
    /// `None` once the transaction is rooted.
    pub confirmations: Option<usize>,
    /// A non-null value means the transaction failed on-chain.
    pub err: Option<Value>,
    pub confirmation_status: Option<CommitmentLevel>,
}

impl TransactionStatus {
    /// Has this status reached `commitment`? An absent status level never
    /// satisfies anything; callers keep polling.
    pub fn satisfies_commitment(&self, commitment: CommitmentLevel) -> bool {
        self.confirmation_status
            .map(|status| status.satisfies(commitment))
            .unwrap_or(false)
    }
}

/// An entry from `getSignaturesForAddress`, `signature` still base58.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcConfirmedTransactionStatusWithSignature {
    pub signature: String,
    pub slot: u64,
    pub err: Option<Value>,
    pub memo: Option<String>,
    pub block_time: Option<i64>,
}

impl RpcConfirmedTransactionStatusWithSignature {
    pub fn signature(&self) -> Result<Signature, RpcError> {
        self.signature.parse().map_err(|_| {
            RpcError::ParseError(format!("valid signature, got `{}`", self.signature))
        })
    }
}

/// [`RpcConfirmedTransactionStatusWithSignature`] with its signature
/// decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedSignatureInfo {
    pub signature: Signature,
    pub slot: u64,
    pub err: Option<Value>,
    pub memo: Option<String>,
    pub block_time: Option<i64>,
}

impl TryFrom<RpcConfirmedTransactionStatusWithSignature> for ConfirmedSignatureInfo {
    type Error = RpcError;

    fn try_from(
        entry: RpcConfirmedTransactionStatusWithSignature,
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            signature: entry.signature()?,
            slot: entry.slot,
            err: entry.err,
            memo: entry.memo,
            block_time: entry.block_time,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    pub amount: String,
    pub decimals: u8,
    pub ui_amount: Option<f64>,
    pub ui_amount_string: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcTokenAccountBalance {
    pub address: String,
    #[serde(flatten)]
    pub amount: UiTokenAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiCompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    /// Base58-encoded instruction data.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiRawMessage {
    pub header: MessageHeader,
    pub account_keys: Vec<String>,
    pub recent_blockhash: String,
    pub instructions: Vec<UiCompiledInstruction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiTransaction {
    pub signatures: Vec<String>,
    pub message: UiRawMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTransactionStatusMeta {
    pub err: Option<Value>,
    pub fee: u64,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub log_messages: Option<Vec<String>>,
}

/// The `getTransaction` result, all key material still base58.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedConfirmedTransaction {
    pub slot: u64,
    pub transaction: UiTransaction,
    pub meta: Option<UiTransactionStatusMeta>,
    pub block_time: Option<i64>,
}

/// A `getTransaction` result with every base58 field decoded: account
/// keys, the recent blockhash, each signature, and the instruction data.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedTransactionView {
    pub slot: u64,
    pub signatures: Vec<Signature>,
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
    pub err: Option<Value>,
    pub log_messages: Option<Vec<String>>,
    pub block_time: Option<i64>,
}

impl TryFrom<EncodedConfirmedTransaction> for ConfirmedTransactionView {
    type Error = RpcError;

    fn try_from(encoded: EncodedConfirmedTransaction) -> Result<Self, Self::Error> {
        let parse_error = |what: &str, bad: &str| {
            RpcError::ParseError(format!("valid {what}, got `{bad}`"))
        };

        let signatures = encoded
            .transaction
            .signatures
            .iter()
            .map(|signature| {
                signature
                    .parse()
                    .map_err(|_| parse_error("signature", signature))
            })
            .collect::<Result<Vec<Signature>, _>>()?;

        let message = encoded.transaction.message;
        let account_keys = message
            .account_keys
            .iter()
            .map(|key| key.parse().map_err(|_| parse_error("account key", key)))
            .collect::<Result<Vec<Pubkey>, _>>()?;
        let recent_blockhash = message
            .recent_blockhash
            .parse()
            .map_err(|_| parse_error("blockhash", &message.recent_blockhash))?;

        let instructions = message
            .instructions
            .into_iter()
            .map(|ix| {
                let data = bs58::decode(&ix.data)
                    .into_vec()
                    .map_err(|_| parse_error("instruction data", &ix.data))?;
                Ok(CompiledInstruction {
                    program_id_index: ix.program_id_index,
                    accounts: ix.accounts,
                    data,
                })
            })
            .collect::<Result<Vec<_>, RpcError>>()?;

        let (err, log_messages) = match encoded.meta {
            Some(meta) => (meta.err, meta.log_messages),
            None => (None, None),
        };

        Ok(Self {
            slot: encoded.slot,
            signatures,
            header: message.header,
            account_keys,
            recent_blockhash,
            instructions,
            err,
            log_messages,
            block_time: encoded.block_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn test_satisfies_commitment() {
        let mut status = TransactionStatus {
            slot: 5,
            confirmations: Some(3),
            err: None,
            confirmation_status: Some(CommitmentLevel::Confirmed),
        };
        assert!(status.satisfies_commitment(CommitmentLevel::Processed));
        assert!(status.satisfies_commitment(CommitmentLevel::Confirmed));
        assert!(!status.satisfies_commitment(CommitmentLevel::Finalized));

        status.confirmation_status = None;
        assert!(!status.satisfies_commitment(CommitmentLevel::Processed));
    }

    #[test]
    fn test_status_deserializes_from_camel_case() {
        let status: TransactionStatus = serde_json::from_value(json!({
            "slot": 72,
            "confirmations": null,
            "err": null,
            "confirmationStatus": "finalized",
        }))
        .unwrap();
        assert_eq!(status.confirmation_status, Some(CommitmentLevel::Finalized));
        assert_eq!(status.confirmations, None);
    }

    #[test]
    fn test_transaction_view_decodes_base58_fields() {
        let payer = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        let blockhash = lumos_sdk::hash::hash(b"x");
        let signature = Signature::new_from_array([9u8; 64]);

        let encoded: EncodedConfirmedTransaction = serde_json::from_value(json!({
            "slot": 430,
            "blockTime": 1_700_000_000i64,
            "meta": {
                "err": null,
                "fee": 5000,
                "preBalances": [100, 0],
                "postBalances": [94_000, 1000],
                "logMessages": ["Program 11111111111111111111111111111111 invoke [1]"],
            },
            "transaction": {
                "signatures": [signature.to_string()],
                "message": {
                    "header": {
                        "numRequiredSignatures": 1,
                        "numReadonlySignedAccounts": 0,
                        "numReadonlyUnsignedAccounts": 1,
                    },
                    "accountKeys": [payer.to_string(), program.to_string()],
                    "recentBlockhash": blockhash.to_string(),
                    "instructions": [{
                        "programIdIndex": 1,
                        "accounts": [0],
                        "data": bs58::encode([7u8, 8u8]).into_string(),
                    }],
                },
            },
        }))
        .unwrap();

        let view = ConfirmedTransactionView::try_from(encoded).unwrap();
        assert_eq!(view.signatures, vec![signature]);
        assert_eq!(view.account_keys, vec![payer, program]);
        assert_eq!(view.recent_blockhash, blockhash);
        assert_eq!(view.instructions[0].data, vec![7, 8]);
        assert!(view.err.is_none());
        assert_eq!(view.log_messages.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_transaction_view_rejects_bad_key() {
        let encoded: EncodedConfirmedTransaction = serde_json::from_value(json!({
            "slot": 1,
            "transaction": {
                "signatures": [],
                "message": {
                    "header": {
                        "numRequiredSignatures": 0,
                        "numReadonlySignedAccounts": 0,
                        "numReadonlyUnsignedAccounts": 0,
                    },
                    "accountKeys": ["not base58 at all!"],
                    "recentBlockhash": lumos_sdk::hash::hash(b"x").to_string(),
                    "instructions": [],
                },
            },
            "meta": null,
            "blockTime": null,
        }))
        .unwrap();
        assert!(ConfirmedTransactionView::try_from(encoded).is_err());
    }

    #[test]
    fn test_token_balance_flatten() {
        let balance: RpcTokenAccountBalance = serde_json::from_value(json!({
            "address": Pubkey::new_unique().to_string(),
            "amount": "771",
            "decimals": 2,
            "uiAmount": 7.71,
            "uiAmountString": "7.71",
        }))
        .unwrap();
        assert_eq!(balance.amount.amount, "771");
        assert_eq!(balance.amount.decimals, 2);
    }
}
