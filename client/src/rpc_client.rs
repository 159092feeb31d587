//! The RPC client façade: typed wrappers over every supported method,
//! plus transaction submission with confirmation tracking.

use {
    crate::{
        account_views::{self, AccountInfoView},
        client_error::{ClientError, ClientErrorKind, Result},
        http_sender::HttpSender,
        mock_sender::{MockSender, Mocks},
        rpc_params,
        rpc_request::{RpcError, RpcRequest},
        rpc_response::{
            ConfirmedSignatureInfo, ConfirmedTransactionView, EncodedConfirmedTransaction,
            Response, RpcBlockhash, RpcBlockhashFeeCalculator,
            RpcConfirmedTransactionStatusWithSignature, RpcTokenAccountBalance,
            TransactionStatus, UiAccount, UiTokenAmount,
        },
        rpc_sender::RpcSender,
        signature_tracker::{self, SignatureSubscription},
    },
    base64::Engine,
    log::*,
    lumos_sdk::{
        commitment_config::CommitmentLevel,
        fee_calculator::FeeCalculator,
        hash::Hash,
        pubkey::Pubkey,
        signature::Signature,
        transaction::Transaction,
    },
    serde::de::DeserializeOwned,
    serde_json::{json, Map, Value},
    std::{sync::Arc, time::Duration},
};

/// A client for one RPC endpoint.
///
/// Cloning is cheap (clones share the underlying transport), which is
/// what lets the confirmation tracker poll from its own task.
#[derive(Clone)]
pub struct RpcClient {
    sender: Arc<dyn RpcSender + Send + Sync + 'static>,
    commitment: CommitmentLevel,
}

impl RpcClient {
    pub fn new<U: ToString>(url: U) -> Self {
        Self::new_with_commitment(url, CommitmentLevel::default())
    }

    pub fn new_with_commitment<U: ToString>(url: U, commitment: CommitmentLevel) -> Self {
        Self {
            sender: Arc::new(HttpSender::new(url)),
            commitment,
        }
    }

    pub fn new_with_cluster(cluster: &crate::cluster::RpcCluster) -> Self {
        Self::new(cluster.url())
    }

    pub fn new_with_timeout<U: ToString>(url: U, timeout: Duration) -> Self {
        Self {
            sender: Arc::new(HttpSender::new_with_timeout(url, timeout)),
            commitment: CommitmentLevel::default(),
        }
    }

    pub fn new_sender<S: RpcSender + Send + Sync + 'static>(sender: S) -> Self {
        Self {
            sender: Arc::new(sender),
            commitment: CommitmentLevel::default(),
        }
    }

    pub fn new_mock<U: ToString>(url: U) -> Self {
        Self::new_sender(MockSender::new(url))
    }

    pub fn new_mock_with_mocks<U: ToString>(url: U, mocks: Mocks) -> Self {
        Self::new_sender(MockSender::new_with_mocks(url, mocks))
    }

    pub fn url(&self) -> String {
        self.sender.url()
    }

    pub fn commitment(&self) -> CommitmentLevel {
        self.commitment
    }

    async fn send<T: DeserializeOwned>(&self, request: RpcRequest, params: Value) -> Result<T> {
        let response = self
            .sender
            .send(request, params)
            .await
            .map_err(|err| err.into_with_request(request.method()))?;
        serde_json::from_value(response)
            .map_err(|err| ClientError::new_with_request(err.into(), request.method()))
    }

    /// Ship a pre-built batch; the response vector is in request order.
    pub async fn send_batch(
        &self,
        requests: Vec<(RpcRequest, Value)>,
    ) -> Result<Vec<std::result::Result<Value, RpcError>>> {
        self.sender.send_batch(requests).await
    }

    fn commitment_options(&self, commitment: CommitmentLevel) -> Map<String, Value> {
        let mut options = Map::new();
        options.insert(
            "commitment".to_string(),
            Value::String(commitment.as_str().to_string()),
        );
        options
    }

    fn validated_config(request: RpcRequest, options: Map<String, Value>) -> Result<Value> {
        let normalized = rpc_params::validate_params(request, &options)?;
        Ok(Value::Object(normalized))
    }

    pub async fn get_latest_blockhash(&self) -> Result<Hash> {
        let config = Self::validated_config(
            RpcRequest::GetLatestBlockhash,
            self.commitment_options(self.commitment),
        )?;
        let response: Response<RpcBlockhash> = self
            .send(RpcRequest::GetLatestBlockhash, json!([config]))
            .await?;
        parse_field(&response.value.blockhash, "blockhash", RpcRequest::GetLatestBlockhash)
    }

    /// The legacy blockhash query; also reports the fee rate.
    pub async fn get_recent_blockhash(&self) -> Result<(Hash, FeeCalculator)> {
        let response: Response<RpcBlockhashFeeCalculator> = self
            .send(RpcRequest::GetRecentBlockhash, json!([]))
            .await?;
        let blockhash = parse_field(
            &response.value.blockhash,
            "blockhash",
            RpcRequest::GetRecentBlockhash,
        )?;
        Ok((blockhash, response.value.fee_calculator))
    }

    pub async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64> {
        self.get_balance_with_commitment(pubkey, self.commitment)
            .await
    }

    pub async fn get_balance_with_commitment(
        &self,
        pubkey: &Pubkey,
        commitment: CommitmentLevel,
    ) -> Result<u64> {
        let config =
            Self::validated_config(RpcRequest::GetBalance, self.commitment_options(commitment))?;
        let response: Response<u64> = self
            .send(RpcRequest::GetBalance, json!([pubkey.to_string(), config]))
            .await?;
        Ok(response.value)
    }

    pub async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<UiAccount>> {
        let mut options = self.commitment_options(self.commitment);
        options.insert("encoding".to_string(), json!("base64"));
        let config = Self::validated_config(RpcRequest::GetAccountInfo, options)?;
        let response: Response<Option<UiAccount>> = self
            .send(RpcRequest::GetAccountInfo, json!([pubkey.to_string(), config]))
            .await?;
        Ok(response.value)
    }

    /// Fetch an account `jsonParsed` and decode it into a typed
    /// [`AccountInfoView`] (mint, token account, multisig, or nonce).
    pub async fn get_account_view(&self, pubkey: &Pubkey) -> Result<Option<AccountInfoView>> {
        let mut options = self.commitment_options(self.commitment);
        options.insert("encoding".to_string(), json!("jsonParsed"));
        let config = Self::validated_config(RpcRequest::GetAccountInfo, options)?;
        let response: Response<Option<UiAccount>> = self
            .send(RpcRequest::GetAccountInfo, json!([pubkey.to_string(), config]))
            .await?;
        response
            .value
            .map(|account| {
                account_views::parse_account_view(&account.data).map_err(|err| {
                    ClientError::new_with_request(err.into(), RpcRequest::GetAccountInfo.method())
                })
            })
            .transpose()
    }

    pub async fn get_multiple_accounts(
        &self,
        pubkeys: &[Pubkey],
    ) -> Result<Vec<Option<UiAccount>>> {
        let mut options = self.commitment_options(self.commitment);
        options.insert("encoding".to_string(), json!("base64"));
        let config = Self::validated_config(RpcRequest::GetMultipleAccounts, options)?;
        let keys: Vec<String> = pubkeys.iter().map(Pubkey::to_string).collect();
        let response: Response<Vec<Option<UiAccount>>> = self
            .send(RpcRequest::GetMultipleAccounts, json!([keys, config]))
            .await?;
        Ok(response.value)
    }

    pub async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        self.send(
            RpcRequest::GetMinimumBalanceForRentExemption,
            json!([data_len]),
        )
        .await
    }

    /// The raw block at `slot`, or `None` for a skipped slot.
    pub async fn get_block(&self, slot: u64) -> Result<Option<Value>> {
        let config = Self::validated_config(
            RpcRequest::GetBlock,
            self.commitment_options(self.commitment),
        )?;
        let block: Value = self.send(RpcRequest::GetBlock, json!([slot, config])).await?;
        Ok(match block {
            Value::Null => None,
            block => Some(block),
        })
    }

    pub async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64) -> Result<Signature> {
        let signature: String = self
            .send(
                RpcRequest::RequestAirdrop,
                json!([pubkey.to_string(), lamports]),
            )
            .await?;
        parse_field(&signature, "signature", RpcRequest::RequestAirdrop)
    }

    pub async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.send_transaction_with_commitment(transaction, self.commitment)
            .await
    }

    /// Submit `transaction` base64-encoded, with `commitment` as the
    /// pre-flight commitment.
    pub async fn send_transaction_with_commitment(
        &self,
        transaction: &Transaction,
        commitment: CommitmentLevel,
    ) -> Result<Signature> {
        let wire =
            base64::engine::general_purpose::STANDARD.encode(transaction.serialize());
        let config = Self::validated_config(
            RpcRequest::SendTransaction,
            self.commitment_options(commitment),
        )?;
        let response: String = self
            .send(RpcRequest::SendTransaction, json!([wire, config]))
            .await?;
        let signature: Signature =
            parse_field(&response, "signature", RpcRequest::SendTransaction)?;
        // A mismatched signature means a confused RPC node; confirming it
        // would track the wrong transaction.
        if Some(&signature) != transaction.signatures.first() {
            return Err(ClientError::new_with_request(
                RpcError::RpcRequestError(format!(
                    "RPC node returned mismatched signature {:?}, expected {:?}",
                    signature,
                    transaction.signatures.first(),
                ))
                .into(),
                RpcRequest::SendTransaction.method(),
            ));
        }
        Ok(signature)
    }

    pub async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> Result<Response<Vec<Option<TransactionStatus>>>> {
        let signatures: Vec<String> = signatures.iter().map(Signature::to_string).collect();
        self.send(RpcRequest::GetSignatureStatuses, json!([signatures]))
            .await
    }

    pub async fn get_signatures_for_address(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Vec<ConfirmedSignatureInfo>> {
        let config = Self::validated_config(
            RpcRequest::GetSignaturesForAddress,
            self.commitment_options(self.commitment),
        )?;
        let entries: Vec<RpcConfirmedTransactionStatusWithSignature> = self
            .send(
                RpcRequest::GetSignaturesForAddress,
                json!([pubkey.to_string(), config]),
            )
            .await?;
        entries
            .into_iter()
            .map(|entry| {
                ConfirmedSignatureInfo::try_from(entry).map_err(|err| {
                    ClientError::new_with_request(
                        err.into(),
                        RpcRequest::GetSignaturesForAddress.method(),
                    )
                })
            })
            .collect()
    }

    /// Fetch and fully decode a confirmed transaction, or `None` when the
    /// cluster does not know the signature.
    pub async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<ConfirmedTransactionView>> {
        let mut options = self.commitment_options(self.commitment);
        options.insert("encoding".to_string(), json!("json"));
        let config = Self::validated_config(RpcRequest::GetTransaction, options)?;
        let encoded: Option<EncodedConfirmedTransaction> = self
            .send(
                RpcRequest::GetTransaction,
                json!([signature.to_string(), config]),
            )
            .await?;
        encoded
            .map(|encoded| {
                ConfirmedTransactionView::try_from(encoded).map_err(|err| {
                    ClientError::new_with_request(
                        err.into(),
                        RpcRequest::GetTransaction.method(),
                    )
                })
            })
            .transpose()
    }

    pub async fn get_token_supply(&self, mint: &Pubkey) -> Result<UiTokenAmount> {
        let config = Self::validated_config(
            RpcRequest::GetTokenSupply,
            self.commitment_options(self.commitment),
        )?;
        let response: Response<UiTokenAmount> = self
            .send(RpcRequest::GetTokenSupply, json!([mint.to_string(), config]))
            .await?;
        Ok(response.value)
    }

    pub async fn get_token_largest_accounts(
        &self,
        mint: &Pubkey,
    ) -> Result<Vec<RpcTokenAccountBalance>> {
        let config = Self::validated_config(
            RpcRequest::GetTokenLargestAccounts,
            self.commitment_options(self.commitment),
        )?;
        let response: Response<Vec<RpcTokenAccountBalance>> = self
            .send(
                RpcRequest::GetTokenLargestAccounts,
                json!([mint.to_string(), config]),
            )
            .await?;
        Ok(response.value)
    }

    /// Submit `transactions` and await their confirmation to `commitment`.
    ///
    /// Transactions that fail pre-flight are logged, program logs
    /// included when the node attached any, and dropped from the batch.
    /// The result lists signatures in *confirmation* order, which is not
    /// necessarily submission order. When `timeout` elapses first, the
    /// error carries whatever had confirmed by then; outstanding tracker
    /// polls drain quietly.
    pub async fn send_and_confirm_transactions(
        &self,
        transactions: &[Transaction],
        commitment: CommitmentLevel,
        timeout: Duration,
    ) -> Result<Vec<Signature>> {
        let mut signatures = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            match self
                .send_transaction_with_commitment(transaction, commitment)
                .await
            {
                Ok(signature) => signatures.push(signature),
                Err(err) => {
                    if let ClientErrorKind::RpcError(RpcError::RpcResponseError {
                        logs: Some(logs),
                        ..
                    }) = err.kind()
                    {
                        for log in logs {
                            warn!("{log}");
                        }
                    }
                    warn!("transaction failed pre-flight and was dropped: {err}");
                }
            }
        }
        if signatures.is_empty() {
            return Ok(vec![]);
        }

        let mut notifications = signature_tracker::track(
            self.clone(),
            SignatureSubscription::new(signatures.clone(), commitment),
        );

        let mut confirmed = Vec::with_capacity(signatures.len());
        let deadline = tokio::time::Instant::now() + timeout;
        while confirmed.len() < signatures.len() {
            match tokio::time::timeout_at(deadline, notifications.recv()).await {
                Ok(Some(batch)) => confirmed.extend(batch),
                // tracker finished; whatever is missing failed on-chain
                Ok(None) => break,
                Err(_elapsed) => {
                    return Err(ClientErrorKind::ConfirmationTimeout { confirmed }.into());
                }
            }
        }
        Ok(confirmed)
    }
}

fn parse_field<T: std::str::FromStr>(
    value: &str,
    what: &str,
    request: RpcRequest,
) -> Result<T> {
    value.parse().map_err(|_| {
        ClientError::new_with_request(
            RpcError::ParseError(format!("valid {what}, got `{value}`")).into(),
            request.method(),
        )
    })
}
