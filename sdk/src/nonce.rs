//! Durable nonce account state.
//!
//! A nonce account stores a blockhash that stands in for a recent
//! blockhash, letting a transaction be signed offline and submitted long
//! after its creation. The on-chain account is 80 bytes: a 4-byte version
//! word, a 4-byte state tag, and the 72-byte [`Data`] payload.

use {
    crate::{fee_calculator::FeeCalculator, hash::Hash, pubkey::Pubkey},
    serde::{Deserialize, Serialize},
};

/// Serialized size of a nonce account.
const NONCE_ACCOUNT_SIZE: usize = 80;

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    /// The key authorized to advance or withdraw the nonce.
    pub authority: Pubkey,
    /// The stored nonce, used in place of a recent blockhash.
    pub blockhash: Hash,
    /// The fee rate in force when the nonce was last advanced.
    pub fee_calculator: FeeCalculator,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub enum State {
    #[default]
    Uninitialized,
    Initialized(Data),
}

impl State {
    pub const fn size() -> usize {
        NONCE_ACCOUNT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_uninitialized() {
        assert_eq!(State::default(), State::Uninitialized);
    }

    #[test]
    fn test_size() {
        assert_eq!(State::size(), 80);
    }
}
