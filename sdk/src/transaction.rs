//! Signed transactions: validation, signing, and the byte-exact wire form.
//!
//! ```text
//! transaction := compact_array<signature[64]> || message
//! ```
//!
//! Signing is the last step of a fixed pipeline: validate the inputs,
//! compile the account table, encode the message, then sign the message
//! bytes once per required signer, in account-table order.

use {
    crate::{
        hash::Hash,
        instruction::Instruction,
        message::{CompileError, Message, ParseError, WireReader},
        pubkey::Pubkey,
        short_vec,
        signature::{Signature, Signer, SIGNATURE_BYTES},
        system_instruction::SystemInstruction,
        system_program,
    },
    std::collections::BTreeSet,
    thiserror::Error,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction has no fee payer")]
    NoPayer,
    #[error("transaction has no recent blockhash")]
    NoBlockhash,
    #[error("transaction has no instructions")]
    NoInstructions,
    #[error("signer set does not match the accounts that must sign")]
    MismatchedSigners,
    #[error(transparent)]
    Compile(#[from] CompileError),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Transaction {
    /// One signature per required signer, ordered like the message's
    /// signer keys.
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    /// Validate, compile, and sign a transaction.
    ///
    /// Pre-checks run in a fixed order: a missing payer, then a missing
    /// blockhash, then an empty instruction list each fail before any
    /// compilation happens. The public keys of `signers` must equal, as a
    /// set, the accounts the compiled message marks as signers.
    pub fn try_new(
        payer: Option<&Pubkey>,
        recent_blockhash: Option<Hash>,
        instructions: &[Instruction],
        signers: &[&dyn Signer],
    ) -> Result<Self, TransactionError> {
        let payer = payer.ok_or(TransactionError::NoPayer)?;
        let recent_blockhash = recent_blockhash.ok_or(TransactionError::NoBlockhash)?;
        if instructions.is_empty() {
            return Err(TransactionError::NoInstructions);
        }

        let message = Message::try_compile(payer, instructions, recent_blockhash)?;

        let signing_keys: BTreeSet<Pubkey> = signers.iter().map(|s| s.pubkey()).collect();
        let required_keys: BTreeSet<Pubkey> = message.signer_keys().iter().copied().collect();
        if signing_keys != required_keys {
            return Err(TransactionError::MismatchedSigners);
        }

        let message_bytes = message.serialize();
        let signatures = message
            .signer_keys()
            .iter()
            .map(|key| {
                let signer = signers
                    .iter()
                    .find(|s| s.pubkey() == *key)
                    .ok_or(TransactionError::MismatchedSigners)?;
                Ok(signer.sign_message(&message_bytes))
            })
            .collect::<Result<Vec<_>, TransactionError>>()?;

        Ok(Self {
            signatures,
            message,
        })
    }

    /// The fee payer, when the account table is non-empty.
    pub fn payer(&self) -> Option<&Pubkey> {
        self.message.account_keys.first()
    }

    /// Emit the signed wire bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let message_bytes = self.message.serialize();
        let mut wire = Vec::with_capacity(
            1 + SIGNATURE_BYTES * self.signatures.len() + message_bytes.len(),
        );
        wire.extend_from_slice(&short_vec::encode_len(self.signatures.len()));
        for signature in &self.signatures {
            wire.extend_from_slice(signature.as_ref());
        }
        wire.extend_from_slice(&message_bytes);
        wire
    }

    /// Parse wire bytes back into a transaction.
    ///
    /// The inverse of [`Transaction::serialize`]: the payer, blockhash, and
    /// instructions are recovered losslessly (account flags stay collapsed
    /// as compiled); the original keypairs are not recoverable, only their
    /// signatures.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut reader = WireReader::new(bytes);
        let num_signatures = reader.read_len()?;
        let mut signatures =
            Vec::with_capacity(num_signatures.min(bytes.len() / SIGNATURE_BYTES + 1));
        for _ in 0..num_signatures {
            let signature = reader.read_bytes(SIGNATURE_BYTES)?;
            signatures
                .push(Signature::try_from(signature).map_err(|_| ParseError::Truncated)?);
        }
        let message = Message::parse(&mut reader)?;
        reader.finish()?;
        Ok(Self {
            signatures,
            message,
        })
    }

    /// Check every signature against the message bytes.
    pub fn verify(&self) -> bool {
        if self.signatures.len() != self.message.signer_keys().len() {
            return false;
        }
        let message_bytes = self.message.serialize();
        self.signatures
            .iter()
            .zip(self.message.signer_keys())
            .all(|(signature, pubkey)| signature.verify(pubkey, &message_bytes))
    }

    /// True when the first instruction advances a durable nonce, meaning
    /// `recent_blockhash` is a stored nonce rather than a cluster
    /// blockhash.
    pub fn uses_durable_nonce(&self) -> bool {
        self.message
            .instructions
            .first()
            .and_then(|ix| {
                let program_id = self
                    .message
                    .account_keys
                    .get(ix.program_id_index as usize)?;
                if !system_program::check_id(program_id) {
                    return None;
                }
                bincode::deserialize::<SystemInstruction>(&ix.data).ok()
            })
            .map(|parsed| matches!(parsed, SystemInstruction::AdvanceNonceAccount))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            instruction::AccountMeta,
            signature::Keypair,
            system_instruction,
        },
    };

    fn test_blockhash() -> Hash {
        crate::hash::hash(b"a recent blockhash")
    }

    #[test]
    fn test_precheck_order() {
        let payer = Keypair::new();
        let payer_pubkey = payer.pubkey();
        let ix = system_instruction::transfer(&payer_pubkey, &Pubkey::new_unique(), 1);

        assert_eq!(
            Transaction::try_new(None, None, &[], &[]),
            Err(TransactionError::NoPayer)
        );
        assert_eq!(
            Transaction::try_new(Some(&payer_pubkey), None, &[], &[]),
            Err(TransactionError::NoBlockhash)
        );
        assert_eq!(
            Transaction::try_new(Some(&payer_pubkey), Some(test_blockhash()), &[], &[]),
            Err(TransactionError::NoInstructions)
        );
        assert!(Transaction::try_new(
            Some(&payer_pubkey),
            Some(test_blockhash()),
            &[ix],
            &[&payer],
        )
        .is_ok());
    }

    #[test]
    fn test_mismatched_signers() {
        let payer = Keypair::new();
        let other = Keypair::new();
        let payer_pubkey = payer.pubkey();
        let ix = system_instruction::transfer(&payer_pubkey, &Pubkey::new_unique(), 1);

        // wrong keypair
        assert_eq!(
            Transaction::try_new(
                Some(&payer_pubkey),
                Some(test_blockhash()),
                &[ix.clone()],
                &[&other],
            ),
            Err(TransactionError::MismatchedSigners)
        );
        // extra keypair
        assert_eq!(
            Transaction::try_new(
                Some(&payer_pubkey),
                Some(test_blockhash()),
                &[ix.clone()],
                &[&payer, &other],
            ),
            Err(TransactionError::MismatchedSigners)
        );
        // missing keypair
        assert_eq!(
            Transaction::try_new(Some(&payer_pubkey), Some(test_blockhash()), &[ix], &[]),
            Err(TransactionError::MismatchedSigners)
        );
    }

    #[test]
    fn test_sign_and_verify() {
        let payer = Keypair::new();
        let payer_pubkey = payer.pubkey();
        let tx = Transaction::try_new(
            Some(&payer_pubkey),
            Some(test_blockhash()),
            &[system_instruction::transfer(
                &payer_pubkey,
                &Pubkey::new_unique(),
                1_000_000,
            )],
            &[&payer],
        )
        .unwrap();

        assert_eq!(tx.signatures.len(), 1);
        assert!(tx.verify());

        let mut tampered = tx.clone();
        tampered.message.recent_blockhash = crate::hash::hash(b"another");
        assert!(!tampered.verify());
    }

    #[test]
    fn test_signature_order_follows_account_table() {
        let payer = Keypair::new();
        let second = Keypair::new();
        let payer_pubkey = payer.pubkey();
        let second_pubkey = second.pubkey();

        let program_id = Pubkey::new_unique();
        let ix = Instruction::new_with_bytes(
            program_id,
            &[1],
            vec![
                AccountMeta::new_readonly(second_pubkey, true),
                AccountMeta::new(payer_pubkey, true),
            ],
        );
        // signer list handed over in the "wrong" order on purpose
        let tx = Transaction::try_new(
            Some(&payer_pubkey),
            Some(test_blockhash()),
            &[ix],
            &[&second, &payer],
        )
        .unwrap();

        assert_eq!(tx.message.account_keys[0], payer_pubkey);
        let message_bytes = tx.message.serialize();
        for (signature, key) in tx.signatures.iter().zip(tx.message.signer_keys()) {
            assert!(signature.verify(key, &message_bytes));
        }
        assert_eq!(tx.message.signer_keys()[0], payer_pubkey);
        assert_eq!(tx.message.signer_keys()[1], second_pubkey);
    }

    #[test]
    fn test_wire_round_trip() {
        let payer = Keypair::new();
        let payer_pubkey = payer.pubkey();
        let to = Pubkey::new_unique();
        let blockhash = test_blockhash();
        let instructions = vec![
            system_instruction::transfer(&payer_pubkey, &to, 42),
            system_instruction::transfer(&payer_pubkey, &to, 42),
        ];
        let tx = Transaction::try_new(
            Some(&payer_pubkey),
            Some(blockhash),
            &instructions,
            &[&payer],
        )
        .unwrap();

        let wire = tx.serialize();
        let parsed = Transaction::deserialize(&wire).unwrap();
        assert_eq!(parsed, tx);
        assert_eq!(parsed.payer(), Some(&payer_pubkey));
        assert_eq!(parsed.message.recent_blockhash, blockhash);
        assert_eq!(
            parsed.message.decompile_instructions().unwrap(),
            instructions
        );
        assert!(parsed.verify());

        // identical instructions deduplicate accounts but keep both
        // instruction entries, under a single signature
        assert_eq!(parsed.message.account_keys.len(), 3);
        assert_eq!(parsed.signatures.len(), 1);
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        assert!(Transaction::deserialize(&[]).is_err());
        let payer = Keypair::new();
        let payer_pubkey = payer.pubkey();
        let tx = Transaction::try_new(
            Some(&payer_pubkey),
            Some(test_blockhash()),
            &[system_instruction::allocate(&payer_pubkey, 1)],
            &[&payer],
        )
        .unwrap();
        let wire = tx.serialize();
        for len in 0..wire.len() {
            assert!(Transaction::deserialize(&wire[..len]).is_err(), "{len}");
        }
        let mut trailing = wire;
        trailing.push(0);
        assert_eq!(
            Transaction::deserialize(&trailing),
            Err(ParseError::TrailingBytes(1))
        );
    }

    #[test]
    fn test_uses_durable_nonce() {
        let payer = Keypair::new();
        let authority = Keypair::new();
        let payer_pubkey = payer.pubkey();
        let nonce_account = Pubkey::new_unique();

        let advance =
            system_instruction::advance_nonce_account(&nonce_account, &authority.pubkey());
        let transfer = system_instruction::transfer(&payer_pubkey, &Pubkey::new_unique(), 1);

        let tx = Transaction::try_new(
            Some(&payer_pubkey),
            Some(test_blockhash()),
            &[advance.clone(), transfer.clone()],
            &[&payer, &authority],
        )
        .unwrap();
        assert!(tx.uses_durable_nonce());

        let tx = Transaction::try_new(
            Some(&payer_pubkey),
            Some(test_blockhash()),
            &[transfer, advance],
            &[&payer, &authority],
        )
        .unwrap();
        assert!(!tx.uses_durable_nonce());
    }
}
