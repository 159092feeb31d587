//! Token Swap program: pool initialization and the swap, deposit, and
//! withdraw instructions.
//!
//! The swap account serializes to 324 bytes. Instruction data is a
//! single-byte discriminant followed by packed little-endian fields; the
//! initializer carries the fee table and the curve descriptor.

use lumos_sdk::{
    instruction::{data::Writer, AccountMeta, Instruction},
    pubkey::Pubkey,
};

lumos_sdk::declare_id!("SwaPpA9LAaLfeLi3a68M4DjnLqgtticKg6CnyNwgAC8");

/// Serialized size of a swap pool account.
pub const SWAP_ACCOUNT_LEN: usize = 324;

/// All pool fees, each a numerator/denominator pair.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Fees {
    /// Fee paid by traders, kept in the pool for liquidity providers.
    pub trade_fee_numerator: u64,
    pub trade_fee_denominator: u64,
    /// Trade fee routed to the pool owner.
    pub owner_trade_fee_numerator: u64,
    pub owner_trade_fee_denominator: u64,
    /// Fee charged on withdrawals, routed to the pool owner.
    pub owner_withdraw_fee_numerator: u64,
    pub owner_withdraw_fee_denominator: u64,
    /// Share of the owner trade fee routed to the transaction host.
    pub host_fee_numerator: u64,
    pub host_fee_denominator: u64,
}

impl Fees {
    fn pack_into(&self, writer: Writer) -> Writer {
        writer
            .u64_le(self.trade_fee_numerator)
            .u64_le(self.trade_fee_denominator)
            .u64_le(self.owner_trade_fee_numerator)
            .u64_le(self.owner_trade_fee_denominator)
            .u64_le(self.owner_withdraw_fee_numerator)
            .u64_le(self.owner_withdraw_fee_denominator)
            .u64_le(self.host_fee_numerator)
            .u64_le(self.host_fee_denominator)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CurveType {
    #[default]
    ConstantProduct = 0,
    ConstantPrice = 1,
    Stable = 2,
    Offset = 3,
}

/// The pricing curve: its type tag plus a 32-byte parameter block whose
/// meaning depends on the type (e.g. the token price for a constant-price
/// curve, the amplification coefficient for a stable curve).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SwapCurve {
    pub curve_type: CurveType,
    pub calculator: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapInstruction {
    /// 0. Initialize a pool.
    Initialize { fees: Fees, swap_curve: SwapCurve },
    /// 1. Trade `amount_in` of the source token for at least
    /// `minimum_amount_out` of the destination token.
    Swap {
        amount_in: u64,
        minimum_amount_out: u64,
    },
    /// 2. Deposit both tokens for `pool_token_amount` of pool tokens.
    DepositAllTokenTypes {
        pool_token_amount: u64,
        maximum_token_a_amount: u64,
        maximum_token_b_amount: u64,
    },
    /// 3. Redeem `pool_token_amount` of pool tokens for both tokens.
    WithdrawAllTokenTypes {
        pool_token_amount: u64,
        minimum_token_a_amount: u64,
        minimum_token_b_amount: u64,
    },
}

impl SwapInstruction {
    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::Initialize { fees, swap_curve } => fees
                .pack_into(Writer::with_capacity(98).u8(0))
                .u8(swap_curve.curve_type as u8)
                .bytes(&swap_curve.calculator)
                .build(),
            Self::Swap {
                amount_in,
                minimum_amount_out,
            } => Writer::new()
                .u8(1)
                .u64_le(*amount_in)
                .u64_le(*minimum_amount_out)
                .build(),
            Self::DepositAllTokenTypes {
                pool_token_amount,
                maximum_token_a_amount,
                maximum_token_b_amount,
            } => Writer::new()
                .u8(2)
                .u64_le(*pool_token_amount)
                .u64_le(*maximum_token_a_amount)
                .u64_le(*maximum_token_b_amount)
                .build(),
            Self::WithdrawAllTokenTypes {
                pool_token_amount,
                minimum_token_a_amount,
                minimum_token_b_amount,
            } => Writer::new()
                .u8(3)
                .u64_le(*pool_token_amount)
                .u64_le(*minimum_token_a_amount)
                .u64_le(*minimum_token_b_amount)
                .build(),
        }
    }
}

/// Initialize a swap pool. The pool authority is the PDA derived from the
/// swap account; the destination receives the initial pool tokens.
#[allow(clippy::too_many_arguments)]
pub fn initialize(
    swap_pubkey: &Pubkey,
    authority_pubkey: &Pubkey,
    token_a_pubkey: &Pubkey,
    token_b_pubkey: &Pubkey,
    pool_mint_pubkey: &Pubkey,
    fee_account_pubkey: &Pubkey,
    destination_pubkey: &Pubkey,
    fees: Fees,
    swap_curve: SwapCurve,
) -> Instruction {
    Instruction::new_with_bytes(
        id(),
        &SwapInstruction::Initialize { fees, swap_curve }.pack(),
        vec![
            AccountMeta::new(*swap_pubkey, true),
            AccountMeta::new_readonly(*authority_pubkey, false),
            AccountMeta::new_readonly(*token_a_pubkey, false),
            AccountMeta::new_readonly(*token_b_pubkey, false),
            AccountMeta::new(*pool_mint_pubkey, false),
            AccountMeta::new_readonly(*fee_account_pubkey, false),
            AccountMeta::new(*destination_pubkey, false),
            AccountMeta::new_readonly(crate::id(), false),
        ],
    )
}

/// Swap `amount_in` from the user's source account into the user's
/// destination account.
#[allow(clippy::too_many_arguments)]
pub fn swap(
    swap_pubkey: &Pubkey,
    authority_pubkey: &Pubkey,
    user_transfer_authority_pubkey: &Pubkey,
    source_pubkey: &Pubkey,
    swap_source_pubkey: &Pubkey,
    swap_destination_pubkey: &Pubkey,
    destination_pubkey: &Pubkey,
    pool_mint_pubkey: &Pubkey,
    fee_account_pubkey: &Pubkey,
    amount_in: u64,
    minimum_amount_out: u64,
) -> Instruction {
    Instruction::new_with_bytes(
        id(),
        &SwapInstruction::Swap {
            amount_in,
            minimum_amount_out,
        }
        .pack(),
        vec![
            AccountMeta::new_readonly(*swap_pubkey, false),
            AccountMeta::new_readonly(*authority_pubkey, false),
            AccountMeta::new_readonly(*user_transfer_authority_pubkey, true),
            AccountMeta::new(*source_pubkey, false),
            AccountMeta::new(*swap_source_pubkey, false),
            AccountMeta::new(*swap_destination_pubkey, false),
            AccountMeta::new(*destination_pubkey, false),
            AccountMeta::new(*pool_mint_pubkey, false),
            AccountMeta::new(*fee_account_pubkey, false),
            AccountMeta::new_readonly(crate::id(), false),
        ],
    )
}

/// Deposit into both sides of the pool.
#[allow(clippy::too_many_arguments)]
pub fn deposit_all_token_types(
    swap_pubkey: &Pubkey,
    authority_pubkey: &Pubkey,
    user_transfer_authority_pubkey: &Pubkey,
    deposit_token_a_pubkey: &Pubkey,
    deposit_token_b_pubkey: &Pubkey,
    swap_token_a_pubkey: &Pubkey,
    swap_token_b_pubkey: &Pubkey,
    pool_mint_pubkey: &Pubkey,
    destination_pubkey: &Pubkey,
    pool_token_amount: u64,
    maximum_token_a_amount: u64,
    maximum_token_b_amount: u64,
) -> Instruction {
    Instruction::new_with_bytes(
        id(),
        &SwapInstruction::DepositAllTokenTypes {
            pool_token_amount,
            maximum_token_a_amount,
            maximum_token_b_amount,
        }
        .pack(),
        vec![
            AccountMeta::new_readonly(*swap_pubkey, false),
            AccountMeta::new_readonly(*authority_pubkey, false),
            AccountMeta::new_readonly(*user_transfer_authority_pubkey, true),
            AccountMeta::new(*deposit_token_a_pubkey, false),
            AccountMeta::new(*deposit_token_b_pubkey, false),
            AccountMeta::new(*swap_token_a_pubkey, false),
            AccountMeta::new(*swap_token_b_pubkey, false),
            AccountMeta::new(*pool_mint_pubkey, false),
            AccountMeta::new(*destination_pubkey, false),
            AccountMeta::new_readonly(crate::id(), false),
        ],
    )
}

/// Withdraw from both sides of the pool.
#[allow(clippy::too_many_arguments)]
pub fn withdraw_all_token_types(
    swap_pubkey: &Pubkey,
    authority_pubkey: &Pubkey,
    user_transfer_authority_pubkey: &Pubkey,
    pool_mint_pubkey: &Pubkey,
    source_pool_pubkey: &Pubkey,
    swap_token_a_pubkey: &Pubkey,
    swap_token_b_pubkey: &Pubkey,
    destination_token_a_pubkey: &Pubkey,
    destination_token_b_pubkey: &Pubkey,
    fee_account_pubkey: &Pubkey,
    pool_token_amount: u64,
    minimum_token_a_amount: u64,
    minimum_token_b_amount: u64,
) -> Instruction {
    Instruction::new_with_bytes(
        id(),
        &SwapInstruction::WithdrawAllTokenTypes {
            pool_token_amount,
            minimum_token_a_amount,
            minimum_token_b_amount,
        }
        .pack(),
        vec![
            AccountMeta::new_readonly(*swap_pubkey, false),
            AccountMeta::new_readonly(*authority_pubkey, false),
            AccountMeta::new_readonly(*user_transfer_authority_pubkey, true),
            AccountMeta::new(*pool_mint_pubkey, false),
            AccountMeta::new(*source_pool_pubkey, false),
            AccountMeta::new(*swap_token_a_pubkey, false),
            AccountMeta::new(*swap_token_b_pubkey, false),
            AccountMeta::new(*destination_token_a_pubkey, false),
            AccountMeta::new(*destination_token_b_pubkey, false),
            AccountMeta::new(*fee_account_pubkey, false),
            AccountMeta::new_readonly(crate::id(), false),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_layout() {
        let fees = Fees {
            trade_fee_numerator: 25,
            trade_fee_denominator: 10_000,
            owner_trade_fee_numerator: 5,
            owner_trade_fee_denominator: 10_000,
            owner_withdraw_fee_numerator: 0,
            owner_withdraw_fee_denominator: 0,
            host_fee_numerator: 20,
            host_fee_denominator: 100,
        };
        let swap_curve = SwapCurve {
            curve_type: CurveType::ConstantPrice,
            calculator: [7u8; 32],
        };
        let data = SwapInstruction::Initialize {
            fees: fees.clone(),
            swap_curve,
        }
        .pack();

        // discriminant, eight u64 fee words, curve tag, parameter block
        assert_eq!(data.len(), 1 + 64 + 1 + 32);
        assert_eq!(data[0], 0);
        assert_eq!(&data[1..9], &25u64.to_le_bytes());
        assert_eq!(&data[57..65], &100u64.to_le_bytes());
        assert_eq!(data[65], 1);
        assert_eq!(&data[66..], &[7u8; 32]);
    }

    #[test]
    fn test_swap_layout() {
        let data = SwapInstruction::Swap {
            amount_in: 10,
            minimum_amount_out: 9,
        }
        .pack();
        let mut expected = vec![1];
        expected.extend_from_slice(&10u64.to_le_bytes());
        expected.extend_from_slice(&9u64.to_le_bytes());
        assert_eq!(data, expected);
    }

    #[test]
    fn test_deposit_withdraw_discriminants() {
        let deposit = SwapInstruction::DepositAllTokenTypes {
            pool_token_amount: 1,
            maximum_token_a_amount: 2,
            maximum_token_b_amount: 3,
        };
        let withdraw = SwapInstruction::WithdrawAllTokenTypes {
            pool_token_amount: 1,
            minimum_token_a_amount: 2,
            minimum_token_b_amount: 3,
        };
        assert_eq!(deposit.pack()[0], 2);
        assert_eq!(withdraw.pack()[0], 3);
        assert_eq!(deposit.pack().len(), 1 + 24);
    }

    #[test]
    fn test_swap_builder_accounts() {
        let user_authority = Pubkey::new_unique();
        let ix = swap(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &user_authority,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            10,
            9,
        );
        assert_eq!(ix.program_id, id());
        assert_eq!(ix.accounts.len(), 10);
        // only the user transfer authority signs
        let signers: Vec<_> = ix.accounts.iter().filter(|meta| meta.is_signer).collect();
        assert_eq!(signers.len(), 1);
        assert_eq!(signers[0].pubkey, user_authority);
        // the token program rides along read-only
        assert_eq!(ix.accounts[9].pubkey, crate::id());
    }

    #[test]
    fn test_swap_account_len() {
        assert_eq!(SWAP_ACCOUNT_LEN, 324);
    }
}
