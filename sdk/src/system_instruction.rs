//! Builders for the System program's instruction set, durable nonces
//! included.
//!
//! The instruction data is the bincode serialization of
//! [`SystemInstruction`]: a 4-byte little-endian discriminant followed by
//! the variant's fields (strings carry a u64 little-endian byte length).

use {
    crate::{
        instruction::{AccountMeta, Instruction},
        nonce,
        pubkey::Pubkey,
        system_program, sysvar,
    },
    serde::{Deserialize, Serialize},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum SystemInstruction {
    /// Create a new account.
    /// * account 0: funding account `(signer, writable)`
    /// * account 1: new account `(signer, writable)`
    CreateAccount {
        lamports: u64,
        space: u64,
        owner: Pubkey,
    },
    /// Assign an account to a program.
    /// * account 0: assigned account `(signer, writable)`
    Assign { owner: Pubkey },
    /// Move lamports.
    /// * account 0: funding account `(signer, writable)`
    /// * account 1: recipient `(writable)`
    Transfer { lamports: u64 },
    /// Create an account at an address derived from a base key and a seed
    /// string.
    /// * account 0: funding account `(signer, writable)`
    /// * account 1: created account `(writable)`
    /// * account 2: base account `(signer)`, unless the funder is the base
    CreateAccountWithSeed {
        base: Pubkey,
        seed: String,
        lamports: u64,
        space: u64,
        owner: Pubkey,
    },
    /// Consume the stored nonce, replacing it with a newer blockhash.
    /// * account 0: nonce account `(writable)`
    /// * account 1: RecentBlockhashes sysvar
    /// * account 2: nonce authority `(signer)`
    AdvanceNonceAccount,
    /// Withdraw lamports from a nonce account.
    /// * account 0: nonce account `(writable)`
    /// * account 1: recipient `(writable)`
    /// * account 2: RecentBlockhashes sysvar
    /// * account 3: Rent sysvar
    /// * account 4: nonce authority `(signer)`
    WithdrawNonceAccount(u64),
    /// Turn an account into an uninitialized nonce account.
    /// * account 0: nonce account `(writable)`
    /// * account 1: RecentBlockhashes sysvar
    /// * account 2: Rent sysvar
    InitializeNonceAccount(Pubkey),
    /// Change the entity authorized to advance or withdraw the nonce.
    /// * account 0: nonce account `(writable)`
    /// * account 1: nonce authority `(signer)`
    AuthorizeNonceAccount(Pubkey),
    /// Allocate space in a (possibly new) account without funding it.
    /// * account 0: account `(signer, writable)`
    Allocate { space: u64 },
    /// Allocate space for an account derived from a base key and seed.
    /// * account 0: allocated account `(writable)`
    /// * account 1: base account `(signer)`
    AllocateWithSeed {
        base: Pubkey,
        seed: String,
        space: u64,
        owner: Pubkey,
    },
    /// Assign a seed-derived account to a program.
    /// * account 0: assigned account `(writable)`
    /// * account 1: base account `(signer)`
    AssignWithSeed {
        base: Pubkey,
        seed: String,
        owner: Pubkey,
    },
    /// Transfer lamports from a seed-derived account.
    /// * account 0: funding account `(writable)`
    /// * account 1: base account `(signer)`
    /// * account 2: recipient `(writable)`
    TransferWithSeed {
        lamports: u64,
        from_seed: String,
        from_owner: Pubkey,
    },
}

pub fn create_account(
    from_pubkey: &Pubkey,
    to_pubkey: &Pubkey,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(*from_pubkey, true),
        AccountMeta::new(*to_pubkey, true),
    ];
    Instruction::new_with_bincode(
        system_program::id(),
        &SystemInstruction::CreateAccount {
            lamports,
            space,
            owner: *owner,
        },
        account_metas,
    )
}

pub fn create_account_with_seed(
    from_pubkey: &Pubkey,
    to_pubkey: &Pubkey,
    base: &Pubkey,
    seed: &str,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Instruction {
    let mut account_metas = vec![
        AccountMeta::new(*from_pubkey, true),
        AccountMeta::new(*to_pubkey, false),
    ];
    if base != from_pubkey {
        account_metas.push(AccountMeta::new_readonly(*base, true));
    }
    Instruction::new_with_bincode(
        system_program::id(),
        &SystemInstruction::CreateAccountWithSeed {
            base: *base,
            seed: seed.to_string(),
            lamports,
            space,
            owner: *owner,
        },
        account_metas,
    )
}

pub fn assign(pubkey: &Pubkey, owner: &Pubkey) -> Instruction {
    let account_metas = vec![AccountMeta::new(*pubkey, true)];
    Instruction::new_with_bincode(
        system_program::id(),
        &SystemInstruction::Assign { owner: *owner },
        account_metas,
    )
}

pub fn assign_with_seed(
    address: &Pubkey,
    base: &Pubkey,
    seed: &str,
    owner: &Pubkey,
) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(*address, false),
        AccountMeta::new_readonly(*base, true),
    ];
    Instruction::new_with_bincode(
        system_program::id(),
        &SystemInstruction::AssignWithSeed {
            base: *base,
            seed: seed.to_string(),
            owner: *owner,
        },
        account_metas,
    )
}

pub fn transfer(from_pubkey: &Pubkey, to_pubkey: &Pubkey, lamports: u64) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(*from_pubkey, true),
        AccountMeta::new(*to_pubkey, false),
    ];
    Instruction::new_with_bincode(
        system_program::id(),
        &SystemInstruction::Transfer { lamports },
        account_metas,
    )
}

pub fn transfer_with_seed(
    from_pubkey: &Pubkey,
    from_base: &Pubkey,
    from_seed: &str,
    from_owner: &Pubkey,
    to_pubkey: &Pubkey,
    lamports: u64,
) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(*from_pubkey, false),
        AccountMeta::new_readonly(*from_base, true),
        AccountMeta::new(*to_pubkey, false),
    ];
    Instruction::new_with_bincode(
        system_program::id(),
        &SystemInstruction::TransferWithSeed {
            lamports,
            from_seed: from_seed.to_string(),
            from_owner: *from_owner,
        },
        account_metas,
    )
}

pub fn allocate(pubkey: &Pubkey, space: u64) -> Instruction {
    let account_metas = vec![AccountMeta::new(*pubkey, true)];
    Instruction::new_with_bincode(
        system_program::id(),
        &SystemInstruction::Allocate { space },
        account_metas,
    )
}

pub fn allocate_with_seed(
    address: &Pubkey,
    base: &Pubkey,
    seed: &str,
    space: u64,
    owner: &Pubkey,
) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(*address, false),
        AccountMeta::new_readonly(*base, true),
    ];
    Instruction::new_with_bincode(
        system_program::id(),
        &SystemInstruction::AllocateWithSeed {
            base: *base,
            seed: seed.to_string(),
            space,
            owner: *owner,
        },
        account_metas,
    )
}

/// Create and initialize a nonce account in one transaction.
pub fn create_nonce_account(
    from_pubkey: &Pubkey,
    nonce_pubkey: &Pubkey,
    authority: &Pubkey,
    lamports: u64,
) -> Vec<Instruction> {
    vec![
        create_account(
            from_pubkey,
            nonce_pubkey,
            lamports,
            nonce::State::size() as u64,
            &system_program::id(),
        ),
        initialize_nonce_account(nonce_pubkey, authority),
    ]
}

/// [`create_nonce_account`] for a seed-derived nonce address.
pub fn create_nonce_account_with_seed(
    from_pubkey: &Pubkey,
    nonce_pubkey: &Pubkey,
    base: &Pubkey,
    seed: &str,
    authority: &Pubkey,
    lamports: u64,
) -> Vec<Instruction> {
    vec![
        create_account_with_seed(
            from_pubkey,
            nonce_pubkey,
            base,
            seed,
            lamports,
            nonce::State::size() as u64,
            &system_program::id(),
        ),
        initialize_nonce_account(nonce_pubkey, authority),
    ]
}

fn initialize_nonce_account(nonce_pubkey: &Pubkey, authority: &Pubkey) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(*nonce_pubkey, false),
        AccountMeta::new_readonly(sysvar::recent_blockhashes::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
    ];
    Instruction::new_with_bincode(
        system_program::id(),
        &SystemInstruction::InitializeNonceAccount(*authority),
        account_metas,
    )
}

pub fn advance_nonce_account(nonce_pubkey: &Pubkey, authorized_pubkey: &Pubkey) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(*nonce_pubkey, false),
        AccountMeta::new_readonly(sysvar::recent_blockhashes::id(), false),
        AccountMeta::new_readonly(*authorized_pubkey, true),
    ];
    Instruction::new_with_bincode(
        system_program::id(),
        &SystemInstruction::AdvanceNonceAccount,
        account_metas,
    )
}

pub fn withdraw_nonce_account(
    nonce_pubkey: &Pubkey,
    authorized_pubkey: &Pubkey,
    to_pubkey: &Pubkey,
    lamports: u64,
) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(*nonce_pubkey, false),
        AccountMeta::new(*to_pubkey, false),
        AccountMeta::new_readonly(sysvar::recent_blockhashes::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
        AccountMeta::new_readonly(*authorized_pubkey, true),
    ];
    Instruction::new_with_bincode(
        system_program::id(),
        &SystemInstruction::WithdrawNonceAccount(lamports),
        account_metas,
    )
}

pub fn authorize_nonce_account(
    nonce_pubkey: &Pubkey,
    authorized_pubkey: &Pubkey,
    new_authority: &Pubkey,
) -> Instruction {
    let account_metas = vec![
        AccountMeta::new(*nonce_pubkey, false),
        AccountMeta::new_readonly(*authorized_pubkey, true),
    ];
    Instruction::new_with_bincode(
        system_program::id(),
        &SystemInstruction::AuthorizeNonceAccount(*new_authority),
        account_metas,
    )
}
