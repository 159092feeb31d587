//! The Token program's instruction set and builder functions.
//!
//! Token instructions use a single-byte discriminant followed by packed
//! little-endian fields; optional keys travel as a one-byte presence flag
//! followed by the key only when present.
//!
//! Operations gated on an authority accept a `signer_pubkeys` slice. When
//! it is empty the authority itself signs; when it is non-empty the
//! authority is a multisig account that does not sign, and each listed
//! signer does, matching how the program evaluates multisig approvals.

use {
    crate::state::{MAX_SIGNERS, MIN_SIGNERS},
    lumos_sdk::{
        instruction::{data::Writer, AccountMeta, Instruction},
        pubkey::Pubkey,
        system_instruction, sysvar,
    },
    thiserror::Error,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// A multisig's signer count must fall in
    /// [`MIN_SIGNERS`]`..=`[`MAX_SIGNERS`], and `m` cannot exceed the
    /// number of recorded signers.
    #[error("invalid number of multisig signers: {0}")]
    InvalidSignerCount(usize),
}

/// Which of a mint's or account's authorities to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityType {
    MintTokens = 0,
    FreezeAccount = 1,
    AccountOwner = 2,
    CloseAccount = 3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenInstruction {
    /// 0. Initialize a mint. Accounts: mint `(writable)`, Rent sysvar.
    InitializeMint {
        decimals: u8,
        mint_authority: Pubkey,
        freeze_authority: Option<Pubkey>,
    },
    /// 1. Initialize a token account. Accounts: account `(writable)`,
    /// mint, owner, Rent sysvar.
    InitializeAccount,
    /// 2. Initialize a multisig. Accounts: multisig `(writable)`, Rent
    /// sysvar, then each signer key.
    InitializeMultisig { m: u8 },
    /// 3. Move tokens. Accounts: source `(writable)`, destination
    /// `(writable)`, authority.
    Transfer { amount: u64 },
    /// 4. Delegate spending. Accounts: source `(writable)`, delegate,
    /// owner.
    Approve { amount: u64 },
    /// 5. Revoke the delegate. Accounts: source `(writable)`, owner.
    Revoke,
    /// 6. Replace an authority. Accounts: mint or account `(writable)`,
    /// current authority.
    SetAuthority {
        authority_type: AuthorityType,
        new_authority: Option<Pubkey>,
    },
    /// 7. Mint new tokens. Accounts: mint `(writable)`, destination
    /// `(writable)`, mint authority.
    MintTo { amount: u64 },
    /// 8. Burn tokens. Accounts: account `(writable)`, mint `(writable)`,
    /// owner.
    Burn { amount: u64 },
    /// 9. Close an account, reclaiming its lamports. Accounts: account
    /// `(writable)`, destination `(writable)`, owner.
    CloseAccount,
    /// 10. Freeze an account. Accounts: account `(writable)`, mint,
    /// freeze authority.
    FreezeAccount,
    /// 11. Thaw an account. Accounts: account `(writable)`, mint, freeze
    /// authority.
    ThawAccount,
    /// 12. [`TokenInstruction::Transfer`], checked against the mint's
    /// decimals. Accounts: source `(writable)`, mint, destination
    /// `(writable)`, authority.
    TransferChecked { amount: u64, decimals: u8 },
    /// 13. Checked [`TokenInstruction::Approve`]. Accounts: source
    /// `(writable)`, mint, delegate, owner.
    ApproveChecked { amount: u64, decimals: u8 },
    /// 14. Checked [`TokenInstruction::MintTo`]. Accounts: mint
    /// `(writable)`, destination `(writable)`, mint authority.
    MintToChecked { amount: u64, decimals: u8 },
    /// 15. Checked [`TokenInstruction::Burn`]. Accounts: account
    /// `(writable)`, mint `(writable)`, owner.
    BurnChecked { amount: u64, decimals: u8 },
}

fn pack_pubkey_option(writer: Writer, value: &Option<Pubkey>) -> Writer {
    match value {
        Some(pubkey) => writer.u8(1).pubkey(pubkey),
        None => writer.u8(0),
    }
}

impl TokenInstruction {
    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::InitializeMint {
                decimals,
                mint_authority,
                freeze_authority,
            } => pack_pubkey_option(
                Writer::with_capacity(67)
                    .u8(0)
                    .u8(*decimals)
                    .pubkey(mint_authority),
                freeze_authority,
            )
            .build(),
            Self::InitializeAccount => Writer::new().u8(1).build(),
            Self::InitializeMultisig { m } => Writer::new().u8(2).u8(*m).build(),
            Self::Transfer { amount } => Writer::new().u8(3).u64_le(*amount).build(),
            Self::Approve { amount } => Writer::new().u8(4).u64_le(*amount).build(),
            Self::Revoke => Writer::new().u8(5).build(),
            Self::SetAuthority {
                authority_type,
                new_authority,
            } => pack_pubkey_option(
                Writer::new().u8(6).u8(*authority_type as u8),
                new_authority,
            )
            .build(),
            Self::MintTo { amount } => Writer::new().u8(7).u64_le(*amount).build(),
            Self::Burn { amount } => Writer::new().u8(8).u64_le(*amount).build(),
            Self::CloseAccount => Writer::new().u8(9).build(),
            Self::FreezeAccount => Writer::new().u8(10).build(),
            Self::ThawAccount => Writer::new().u8(11).build(),
            Self::TransferChecked { amount, decimals } => {
                Writer::new().u8(12).u64_le(*amount).u8(*decimals).build()
            }
            Self::ApproveChecked { amount, decimals } => {
                Writer::new().u8(13).u64_le(*amount).u8(*decimals).build()
            }
            Self::MintToChecked { amount, decimals } => {
                Writer::new().u8(14).u64_le(*amount).u8(*decimals).build()
            }
            Self::BurnChecked { amount, decimals } => {
                Writer::new().u8(15).u64_le(*amount).u8(*decimals).build()
            }
        }
    }
}

/// Append the authority and any multisig signers per the signing rule.
fn with_authority(
    mut accounts: Vec<AccountMeta>,
    authority: &Pubkey,
    signer_pubkeys: &[&Pubkey],
) -> Vec<AccountMeta> {
    accounts.push(AccountMeta::new_readonly(
        *authority,
        signer_pubkeys.is_empty(),
    ));
    for signer_pubkey in signer_pubkeys {
        accounts.push(AccountMeta::new_readonly(**signer_pubkey, true));
    }
    accounts
}

fn token_instruction(data: TokenInstruction, accounts: Vec<AccountMeta>) -> Instruction {
    Instruction::new_with_bytes(crate::id(), &data.pack(), accounts)
}

pub fn initialize_mint(
    mint_pubkey: &Pubkey,
    decimals: u8,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
) -> Instruction {
    token_instruction(
        TokenInstruction::InitializeMint {
            decimals,
            mint_authority: *mint_authority,
            freeze_authority: freeze_authority.copied(),
        },
        vec![
            AccountMeta::new(*mint_pubkey, false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
        ],
    )
}

pub fn initialize_account(
    account_pubkey: &Pubkey,
    mint_pubkey: &Pubkey,
    owner_pubkey: &Pubkey,
) -> Instruction {
    token_instruction(
        TokenInstruction::InitializeAccount,
        vec![
            AccountMeta::new(*account_pubkey, false),
            AccountMeta::new_readonly(*mint_pubkey, false),
            AccountMeta::new_readonly(*owner_pubkey, false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
        ],
    )
}

pub fn initialize_multisig(
    multisig_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    m: u8,
) -> Result<Instruction, TokenError> {
    if !(MIN_SIGNERS..=MAX_SIGNERS).contains(&signer_pubkeys.len())
        || !(MIN_SIGNERS..=signer_pubkeys.len()).contains(&(m as usize))
    {
        return Err(TokenError::InvalidSignerCount(m as usize));
    }
    let mut accounts = vec![
        AccountMeta::new(*multisig_pubkey, false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
    ];
    for signer_pubkey in signer_pubkeys {
        accounts.push(AccountMeta::new_readonly(**signer_pubkey, false));
    }
    Ok(token_instruction(
        TokenInstruction::InitializeMultisig { m },
        accounts,
    ))
}

pub fn transfer(
    source_pubkey: &Pubkey,
    destination_pubkey: &Pubkey,
    authority_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
) -> Instruction {
    token_instruction(
        TokenInstruction::Transfer { amount },
        with_authority(
            vec![
                AccountMeta::new(*source_pubkey, false),
                AccountMeta::new(*destination_pubkey, false),
            ],
            authority_pubkey,
            signer_pubkeys,
        ),
    )
}

pub fn transfer_checked(
    source_pubkey: &Pubkey,
    mint_pubkey: &Pubkey,
    destination_pubkey: &Pubkey,
    authority_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Instruction {
    token_instruction(
        TokenInstruction::TransferChecked { amount, decimals },
        with_authority(
            vec![
                AccountMeta::new(*source_pubkey, false),
                AccountMeta::new_readonly(*mint_pubkey, false),
                AccountMeta::new(*destination_pubkey, false),
            ],
            authority_pubkey,
            signer_pubkeys,
        ),
    )
}

pub fn approve(
    source_pubkey: &Pubkey,
    delegate_pubkey: &Pubkey,
    owner_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
) -> Instruction {
    token_instruction(
        TokenInstruction::Approve { amount },
        with_authority(
            vec![
                AccountMeta::new(*source_pubkey, false),
                AccountMeta::new_readonly(*delegate_pubkey, false),
            ],
            owner_pubkey,
            signer_pubkeys,
        ),
    )
}

pub fn approve_checked(
    source_pubkey: &Pubkey,
    mint_pubkey: &Pubkey,
    delegate_pubkey: &Pubkey,
    owner_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Instruction {
    token_instruction(
        TokenInstruction::ApproveChecked { amount, decimals },
        with_authority(
            vec![
                AccountMeta::new(*source_pubkey, false),
                AccountMeta::new_readonly(*mint_pubkey, false),
                AccountMeta::new_readonly(*delegate_pubkey, false),
            ],
            owner_pubkey,
            signer_pubkeys,
        ),
    )
}

pub fn revoke(
    source_pubkey: &Pubkey,
    owner_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
) -> Instruction {
    token_instruction(
        TokenInstruction::Revoke,
        with_authority(
            vec![AccountMeta::new(*source_pubkey, false)],
            owner_pubkey,
            signer_pubkeys,
        ),
    )
}

pub fn set_authority(
    owned_pubkey: &Pubkey,
    new_authority: Option<&Pubkey>,
    authority_type: AuthorityType,
    owner_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
) -> Instruction {
    token_instruction(
        TokenInstruction::SetAuthority {
            authority_type,
            new_authority: new_authority.copied(),
        },
        with_authority(
            vec![AccountMeta::new(*owned_pubkey, false)],
            owner_pubkey,
            signer_pubkeys,
        ),
    )
}

pub fn mint_to(
    mint_pubkey: &Pubkey,
    account_pubkey: &Pubkey,
    owner_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
) -> Instruction {
    token_instruction(
        TokenInstruction::MintTo { amount },
        with_authority(
            vec![
                AccountMeta::new(*mint_pubkey, false),
                AccountMeta::new(*account_pubkey, false),
            ],
            owner_pubkey,
            signer_pubkeys,
        ),
    )
}

pub fn mint_to_checked(
    mint_pubkey: &Pubkey,
    account_pubkey: &Pubkey,
    owner_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Instruction {
    token_instruction(
        TokenInstruction::MintToChecked { amount, decimals },
        with_authority(
            vec![
                AccountMeta::new(*mint_pubkey, false),
                AccountMeta::new(*account_pubkey, false),
            ],
            owner_pubkey,
            signer_pubkeys,
        ),
    )
}

pub fn burn(
    account_pubkey: &Pubkey,
    mint_pubkey: &Pubkey,
    authority_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
) -> Instruction {
    token_instruction(
        TokenInstruction::Burn { amount },
        with_authority(
            vec![
                AccountMeta::new(*account_pubkey, false),
                AccountMeta::new(*mint_pubkey, false),
            ],
            authority_pubkey,
            signer_pubkeys,
        ),
    )
}

pub fn burn_checked(
    account_pubkey: &Pubkey,
    mint_pubkey: &Pubkey,
    authority_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Instruction {
    token_instruction(
        TokenInstruction::BurnChecked { amount, decimals },
        with_authority(
            vec![
                AccountMeta::new(*account_pubkey, false),
                AccountMeta::new(*mint_pubkey, false),
            ],
            authority_pubkey,
            signer_pubkeys,
        ),
    )
}

pub fn close_account(
    account_pubkey: &Pubkey,
    destination_pubkey: &Pubkey,
    owner_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
) -> Instruction {
    token_instruction(
        TokenInstruction::CloseAccount,
        with_authority(
            vec![
                AccountMeta::new(*account_pubkey, false),
                AccountMeta::new(*destination_pubkey, false),
            ],
            owner_pubkey,
            signer_pubkeys,
        ),
    )
}

pub fn freeze_account(
    account_pubkey: &Pubkey,
    mint_pubkey: &Pubkey,
    owner_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
) -> Instruction {
    token_instruction(
        TokenInstruction::FreezeAccount,
        with_authority(
            vec![
                AccountMeta::new(*account_pubkey, false),
                AccountMeta::new_readonly(*mint_pubkey, false),
            ],
            owner_pubkey,
            signer_pubkeys,
        ),
    )
}

pub fn thaw_account(
    account_pubkey: &Pubkey,
    mint_pubkey: &Pubkey,
    owner_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
) -> Instruction {
    token_instruction(
        TokenInstruction::ThawAccount,
        with_authority(
            vec![
                AccountMeta::new(*account_pubkey, false),
                AccountMeta::new_readonly(*mint_pubkey, false),
            ],
            owner_pubkey,
            signer_pubkeys,
        ),
    )
}

/// Allocate a token account and initialize it, as one atomic pair of
/// instructions. `lamports` must cover rent exemption for
/// [`crate::state::Account::LEN`] bytes.
pub fn create_account_and_initialize(
    funder_pubkey: &Pubkey,
    account_pubkey: &Pubkey,
    mint_pubkey: &Pubkey,
    owner_pubkey: &Pubkey,
    lamports: u64,
) -> Vec<Instruction> {
    vec![
        system_instruction::create_account(
            funder_pubkey,
            account_pubkey,
            lamports,
            crate::state::Account::LEN as u64,
            &crate::id(),
        ),
        initialize_account(account_pubkey, mint_pubkey, owner_pubkey),
    ]
}

/// Allocate a mint account and initialize it.
pub fn create_mint_and_initialize(
    funder_pubkey: &Pubkey,
    mint_pubkey: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
    lamports: u64,
) -> Vec<Instruction> {
    vec![
        system_instruction::create_account(
            funder_pubkey,
            mint_pubkey,
            lamports,
            crate::state::Mint::LEN as u64,
            &crate::id(),
        ),
        initialize_mint(mint_pubkey, decimals, mint_authority, freeze_authority),
    ]
}

/// Allocate a multisig account and initialize it with `m` required
/// signatures out of `signer_pubkeys`.
pub fn create_multisig_and_initialize(
    funder_pubkey: &Pubkey,
    multisig_pubkey: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    m: u8,
    lamports: u64,
) -> Result<Vec<Instruction>, TokenError> {
    let initialize = initialize_multisig(multisig_pubkey, signer_pubkeys, m)?;
    Ok(vec![
        system_instruction::create_account(
            funder_pubkey,
            multisig_pubkey,
            lamports,
            crate::state::Multisig::LEN as u64,
            &crate::id(),
        ),
        initialize,
    ])
}
