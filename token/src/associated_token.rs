//! The Associated Token Account program: the canonical token account for a
//! wallet/mint pair, at a program-derived address.

use {
    lumos_sdk::{
        instruction::{AccountMeta, Instruction},
        pubkey::{Pubkey, PubkeyError},
        system_program, sysvar,
    },
    thiserror::Error,
};

lumos_sdk::declare_id!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssociatedTokenError {
    /// The wallet must be an ordinary keyed account; a PDA cannot own an
    /// associated token account.
    #[error("owner address is not on the ed25519 curve")]
    OwnerOffCurve,
    #[error(transparent)]
    Pubkey(#[from] PubkeyError),
}

/// Derive the associated token address for `wallet` and `mint`.
pub fn get_associated_token_address(
    wallet_pubkey: &Pubkey,
    mint_pubkey: &Pubkey,
) -> Result<Pubkey, AssociatedTokenError> {
    if !wallet_pubkey.is_on_curve() {
        return Err(AssociatedTokenError::OwnerOffCurve);
    }
    let (address, _bump_seed) = Pubkey::find_program_address(
        &[
            wallet_pubkey.as_ref(),
            crate::id().as_ref(),
            mint_pubkey.as_ref(),
        ],
        &id(),
    )?;
    Ok(address)
}

/// Create the associated token account for `wallet` and `mint`, funded by
/// `funder`.
pub fn create_associated_token_account(
    funder_pubkey: &Pubkey,
    wallet_pubkey: &Pubkey,
    mint_pubkey: &Pubkey,
) -> Result<Instruction, AssociatedTokenError> {
    let associated_account = get_associated_token_address(wallet_pubkey, mint_pubkey)?;
    Ok(Instruction::new_with_bytes(
        id(),
        &[0],
        vec![
            AccountMeta::new(*funder_pubkey, true),
            AccountMeta::new(associated_account, false),
            AccountMeta::new_readonly(*wallet_pubkey, false),
            AccountMeta::new_readonly(*mint_pubkey, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(crate::id(), false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
        ],
    ))
}
