//! On-chain account layouts owned by the Token program.
//!
//! These mirror the program's packed representations; the serialized sizes
//! are what matter off-chain, since account allocation must request the
//! exact byte count.

use lumos_sdk::pubkey::Pubkey;

/// Minimum signers for a multisig.
pub const MIN_SIGNERS: usize = 1;
/// Maximum signers for a multisig.
pub const MAX_SIGNERS: usize = 11;

/// A mint: the definition of one token type.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Mint {
    /// Authority allowed to mint new tokens; `None` means the supply is
    /// fixed forever.
    pub mint_authority: Option<Pubkey>,
    /// Total supply, in the mint's base units.
    pub supply: u64,
    /// Number of base-10 digits to the right of the decimal place.
    pub decimals: u8,
    pub is_initialized: bool,
    /// Authority allowed to freeze token accounts of this mint.
    pub freeze_authority: Option<Pubkey>,
}

impl Mint {
    /// Packed size: two 36-byte optional keys, supply, decimals, and the
    /// initialized flag.
    pub const LEN: usize = 82;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    #[default]
    Uninitialized,
    Initialized,
    /// The mint's freeze authority has frozen the account; no transfers in
    /// or out until thawed.
    Frozen,
}

/// A token account: a balance of one mint held by one owner.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Account {
    pub mint: Pubkey,
    pub owner: Pubkey,
    /// Balance in the mint's base units.
    pub amount: u64,
    /// A delegate authorized to spend up to `delegated_amount`.
    pub delegate: Option<Pubkey>,
    pub state: AccountState,
    /// For wrapped-SOL accounts, the rent-exempt reserve that must stay
    /// behind when the account closes.
    pub is_native: Option<u64>,
    pub delegated_amount: u64,
    /// Authority allowed to close the account; the owner when `None`.
    pub close_authority: Option<Pubkey>,
}

impl Account {
    pub const LEN: usize = 165;

    pub fn is_frozen(&self) -> bool {
        self.state == AccountState::Frozen
    }
}

/// An m-of-n signing authority.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Multisig {
    /// Signatures required.
    pub m: u8,
    /// Valid signers recorded.
    pub n: u8,
    pub is_initialized: bool,
    pub signers: Vec<Pubkey>,
}

impl Multisig {
    /// Packed size: m, n, the initialized flag, and eleven key slots.
    pub const LEN: usize = 355;
}
