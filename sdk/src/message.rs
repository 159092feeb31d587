//! Compilation of instructions into the wire-format message.
//!
//! A message is the signed portion of a transaction:
//!
//! ```text
//! message := header[3]
//!          || compact_array<pubkey[32]>
//!          || blockhash[32]
//!          || compact_array<instruction>
//! instruction := program_index:u8
//!              || compact_array<account_index:u8>
//!              || compact_array<u8>
//! ```
//!
//! The account table is ordered: fee payer first, then the remaining keys
//! partitioned signer+writable, signer+readonly, non-signer+writable,
//! non-signer+readonly. Signatures in the enclosing transaction appear in
//! the same order as their keys do here.

use {
    crate::{
        hash::{Hash, HASH_BYTES},
        instruction::{AccountMeta, CompiledInstruction, Instruction},
        pubkey::{Pubkey, PUBKEY_BYTES},
        short_vec::{self, ShortVecError},
    },
    itertools::Itertools,
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("account index overflowed during compilation")]
    AccountIndexOverflow,
}

/// Why a byte string failed to parse as a message or transaction.
///
/// No partial parse is ever observable; any failure discards everything.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("wire data ended early")]
    Truncated,
    #[error("malformed compact-u16 length prefix")]
    BadLengthPrefix,
    #[error("message header is inconsistent with the account table")]
    InvalidHeader,
    #[error("account index {0} is outside the account table")]
    AccountIndexOutOfRange(u8),
    #[error("{0} bytes left over after parsing")]
    TrailingBytes(usize),
}

impl From<ShortVecError> for ParseError {
    fn from(err: ShortVecError) -> Self {
        match err {
            ShortVecError::Truncated => Self::Truncated,
            ShortVecError::TooLong => Self::BadLengthPrefix,
        }
    }
}

/// A sequential reader over wire bytes.
pub(crate) struct WireReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, ParseError> {
        let byte = *self.bytes.get(self.pos).ok_or(ParseError::Truncated)?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        let end = self.pos.checked_add(len).ok_or(ParseError::Truncated)?;
        let slice = self.bytes.get(self.pos..end).ok_or(ParseError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn read_len(&mut self) -> Result<usize, ParseError> {
        let (len, size) = short_vec::decode_len(&self.bytes[self.pos.min(self.bytes.len())..])?;
        self.pos += size;
        Ok(len)
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(crate) fn finish(self) -> Result<(), ParseError> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(ParseError::TrailingBytes(self.remaining()))
        }
    }
}

/// The three-byte table of contents for the account partition.
#[derive(Serialize, Deserialize, Default, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    /// Total signers; signatures must match the first
    /// `num_required_signatures` account keys.
    pub num_required_signatures: u8,
    /// Trailing portion of the signer range that is read-only.
    pub num_readonly_signed_accounts: u8,
    /// Trailing portion of the non-signer range that is read-only.
    pub num_readonly_unsigned_accounts: u8,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Message {
    pub header: MessageHeader,
    /// All account keys used by this transaction, fee payer first.
    pub account_keys: Vec<Pubkey>,
    /// A recent blockhash, or a nonce account's stored nonce.
    pub recent_blockhash: Hash,
    /// Instructions, executed in order and committed atomically.
    pub instructions: Vec<CompiledInstruction>,
}

/// Order the accounts referenced by `instructions` into the final table.
///
/// Each instruction contributes its program id (as a read-only non-signer)
/// followed by its accounts. Entries matching the payer are dropped, the
/// rest are stably sorted signers-then-writables, and duplicates collapse
/// to their first post-sort occurrence, so an attribute granted anywhere
/// survives unless a stronger-ranked duplicate precedes it. The payer is
/// then placed first, always signer and writable.
fn compile_accounts(payer: &Pubkey, instructions: &[Instruction]) -> Vec<AccountMeta> {
    let mut metas: Vec<AccountMeta> = Vec::new();
    for ix in instructions {
        metas.push(AccountMeta::new_readonly(ix.program_id, false));
        metas.extend(ix.accounts.iter().cloned());
    }
    metas.retain(|meta| meta.pubkey != *payer);
    metas.sort_by(|a, b| {
        (b.is_signer, b.is_writable).cmp(&(a.is_signer, a.is_writable))
    });

    let mut table = vec![AccountMeta::new(*payer, true)];
    table.extend(metas.into_iter().unique_by(|meta| meta.pubkey));
    table
}

fn position(keys: &[Pubkey], key: &Pubkey) -> Result<u8, CompileError> {
    keys.iter()
        .position(|k| k == key)
        .and_then(|p| u8::try_from(p).ok())
        .ok_or(CompileError::AccountIndexOverflow)
}

impl Message {
    /// Compile `instructions` into a message paid for by `payer`.
    pub fn try_compile(
        payer: &Pubkey,
        instructions: &[Instruction],
        recent_blockhash: Hash,
    ) -> Result<Self, CompileError> {
        let table = compile_accounts(payer, instructions);
        if table.len() > u8::MAX as usize + 1 {
            return Err(CompileError::AccountIndexOverflow);
        }

        let num_required_signatures =
            table.iter().filter(|meta| meta.is_signer).count() as u8;
        let num_readonly_signed_accounts = table
            .iter()
            .filter(|meta| meta.is_signer && !meta.is_writable)
            .count() as u8;
        let num_readonly_unsigned_accounts = table
            .iter()
            .filter(|meta| !meta.is_signer && !meta.is_writable)
            .count() as u8;

        let account_keys: Vec<Pubkey> = table.iter().map(|meta| meta.pubkey).collect();

        let compiled = instructions
            .iter()
            .map(|ix| {
                Ok(CompiledInstruction {
                    program_id_index: position(&account_keys, &ix.program_id)?,
                    accounts: ix
                        .accounts
                        .iter()
                        .map(|meta| position(&account_keys, &meta.pubkey))
                        .collect::<Result<Vec<_>, _>>()?,
                    data: ix.data.clone(),
                })
            })
            .collect::<Result<Vec<_>, CompileError>>()?;

        Ok(Self {
            header: MessageHeader {
                num_required_signatures,
                num_readonly_signed_accounts,
                num_readonly_unsigned_accounts,
            },
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    /// The message bytes that get signed.
    pub fn serialize(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(
            3 + 1
                + PUBKEY_BYTES * self.account_keys.len()
                + HASH_BYTES
                + 1
                + self
                    .instructions
                    .iter()
                    .map(|ix| 4 + ix.accounts.len() + ix.data.len())
                    .sum::<usize>(),
        );
        wire.push(self.header.num_required_signatures);
        wire.push(self.header.num_readonly_signed_accounts);
        wire.push(self.header.num_readonly_unsigned_accounts);

        wire.extend_from_slice(&short_vec::encode_len(self.account_keys.len()));
        for key in &self.account_keys {
            wire.extend_from_slice(key.as_ref());
        }

        wire.extend_from_slice(self.recent_blockhash.as_ref());

        wire.extend_from_slice(&short_vec::encode_len(self.instructions.len()));
        for ix in &self.instructions {
            wire.push(ix.program_id_index);
            wire.extend_from_slice(&short_vec::encode_len(ix.accounts.len()));
            wire.extend_from_slice(&ix.accounts);
            wire.extend_from_slice(&short_vec::encode_len(ix.data.len()));
            wire.extend_from_slice(&ix.data);
        }
        wire
    }

    /// Parse a message, requiring that `bytes` contains nothing else.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut reader = WireReader::new(bytes);
        let message = Self::parse(&mut reader)?;
        reader.finish()?;
        Ok(message)
    }

    pub(crate) fn parse(reader: &mut WireReader) -> Result<Self, ParseError> {
        let header = MessageHeader {
            num_required_signatures: reader.read_u8()?,
            num_readonly_signed_accounts: reader.read_u8()?,
            num_readonly_unsigned_accounts: reader.read_u8()?,
        };

        let num_keys = reader.read_len()?;
        // lengths come off the wire; do not let them size allocations
        let mut account_keys = Vec::with_capacity(num_keys.min(reader.remaining() / PUBKEY_BYTES + 1));
        for _ in 0..num_keys {
            let key = reader.read_bytes(PUBKEY_BYTES)?;
            account_keys.push(Pubkey::try_from(key).map_err(|_| ParseError::Truncated)?);
        }

        let signers = header.num_required_signatures as usize;
        if signers > account_keys.len()
            || header.num_readonly_signed_accounts as usize > signers
            || header.num_readonly_unsigned_accounts as usize > account_keys.len() - signers
        {
            return Err(ParseError::InvalidHeader);
        }

        let blockhash = reader.read_bytes(HASH_BYTES)?;
        let recent_blockhash =
            Hash::try_from(blockhash).map_err(|_| ParseError::Truncated)?;

        let num_instructions = reader.read_len()?;
        let mut instructions = Vec::with_capacity(num_instructions.min(reader.remaining()));
        for _ in 0..num_instructions {
            let program_id_index = reader.read_u8()?;
            if program_id_index as usize >= account_keys.len() {
                return Err(ParseError::AccountIndexOutOfRange(program_id_index));
            }
            let num_accounts = reader.read_len()?;
            let accounts = reader.read_bytes(num_accounts)?.to_vec();
            if let Some(&bad) = accounts
                .iter()
                .find(|&&index| index as usize >= account_keys.len())
            {
                return Err(ParseError::AccountIndexOutOfRange(bad));
            }
            let data_len = reader.read_len()?;
            // absent data parses as an empty byte vector, never as a gap
            let data = reader.read_bytes(data_len)?.to_vec();
            instructions.push(CompiledInstruction {
                program_id_index,
                accounts,
                data,
            });
        }

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        })
    }

    /// The keys that must sign, in signature order. The payer is first.
    pub fn signer_keys(&self) -> &[Pubkey] {
        let num_signers = (self.header.num_required_signatures as usize).min(self.account_keys.len());
        &self.account_keys[..num_signers]
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < self.header.num_required_signatures as usize
    }

    pub fn is_writable(&self, index: usize) -> bool {
        let header = &self.header;
        let num_signers = header.num_required_signatures as usize;
        if index < num_signers {
            index < num_signers - header.num_readonly_signed_accounts as usize
        } else {
            index
                < self
                    .account_keys
                    .len()
                    .saturating_sub(header.num_readonly_unsigned_accounts as usize)
        }
    }

    /// Rebuild full [`Instruction`]s from the compiled form, recovering
    /// account flags from the table partition. Lossless except that flags
    /// collapsed during compilation stay collapsed.
    pub fn decompile_instructions(&self) -> Result<Vec<Instruction>, ParseError> {
        self.instructions
            .iter()
            .map(|ix| {
                let program_id = *self
                    .account_keys
                    .get(ix.program_id_index as usize)
                    .ok_or(ParseError::AccountIndexOutOfRange(ix.program_id_index))?;
                let accounts = ix
                    .accounts
                    .iter()
                    .map(|&index| {
                        let pubkey = *self
                            .account_keys
                            .get(index as usize)
                            .ok_or(ParseError::AccountIndexOutOfRange(index))?;
                        Ok(AccountMeta {
                            pubkey,
                            is_signer: self.is_signer(index as usize),
                            is_writable: self.is_writable(index as usize),
                        })
                    })
                    .collect::<Result<Vec<_>, ParseError>>()?;
                Ok(Instruction {
                    program_id,
                    accounts,
                    data: ix.data.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::system_program};

    fn meta_ix(program_id: Pubkey, accounts: Vec<AccountMeta>) -> Instruction {
        Instruction::new_with_bytes(program_id, &[9, 9], accounts)
    }

    #[test]
    fn test_account_table_partition() {
        let payer = Pubkey::new_unique();
        let writable = Pubkey::new_unique();
        let signer = Pubkey::new_unique();
        let read_only = Pubkey::new_unique();
        let program_id = Pubkey::new_unique();

        let message = Message::try_compile(
            &payer,
            &[meta_ix(
                program_id,
                vec![
                    AccountMeta::new(payer, true),
                    AccountMeta::new(writable, false),
                    AccountMeta::new_readonly(signer, true),
                    AccountMeta::new_readonly(read_only, false),
                ],
            )],
            Hash::default(),
        )
        .unwrap();

        // two signers, one of them read-only; two read-only non-signers
        // (the program among them)
        assert_eq!(
            message.header,
            MessageHeader {
                num_required_signatures: 2,
                num_readonly_signed_accounts: 1,
                num_readonly_unsigned_accounts: 2,
            }
        );
        assert_eq!(
            message.account_keys,
            vec![payer, signer, writable, program_id, read_only]
        );
        assert!(message.is_signer(0) && message.is_writable(0));
        assert!(message.is_signer(1) && !message.is_writable(1));
        assert!(!message.is_signer(2) && message.is_writable(2));
        assert!(!message.is_writable(3) && !message.is_writable(4));
    }

    #[test]
    fn test_duplicate_instructions_collapse() {
        let payer = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let ix = crate::system_instruction::transfer(&payer, &to, 42);

        let message =
            Message::try_compile(&payer, &[ix.clone(), ix], Hash::default()).unwrap();

        assert_eq!(message.account_keys.len(), 3);
        assert_eq!(message.header.num_required_signatures, 1);
        assert_eq!(message.instructions.len(), 2);
        assert_eq!(message.instructions[0], message.instructions[1]);
    }

    #[test]
    fn test_strongest_flags_survive_collapse() {
        let payer = Pubkey::new_unique();
        let key = Pubkey::new_unique();
        let program_id = Pubkey::new_unique();

        // key appears readonly-signer in one instruction and
        // writable-non-signer in another; the stronger-ranked signer
        // occurrence sorts first and wins
        let message = Message::try_compile(
            &payer,
            &[
                meta_ix(program_id, vec![AccountMeta::new(key, false)]),
                meta_ix(program_id, vec![AccountMeta::new_readonly(key, true)]),
            ],
            Hash::default(),
        )
        .unwrap();

        let index = message
            .account_keys
            .iter()
            .position(|k| *k == key)
            .unwrap();
        assert!(message.is_signer(index));
        assert!(!message.is_writable(index));
    }

    #[test]
    fn test_program_writability_inherited() {
        let payer = Pubkey::new_unique();
        let program_id = Pubkey::new_unique();

        // the program id also appears as a writable account elsewhere
        let message = Message::try_compile(
            &payer,
            &[
                meta_ix(program_id, vec![AccountMeta::new(program_id, false)]),
            ],
            Hash::default(),
        )
        .unwrap();

        let index = message
            .account_keys
            .iter()
            .position(|k| *k == program_id)
            .unwrap();
        assert!(message.is_writable(index));
    }

    #[test]
    fn test_payer_flags_override_weaker_mentions() {
        let payer = Pubkey::new_unique();
        let program_id = Pubkey::new_unique();

        let message = Message::try_compile(
            &payer,
            &[meta_ix(
                program_id,
                vec![AccountMeta::new_readonly(payer, false)],
            )],
            Hash::default(),
        )
        .unwrap();

        assert_eq!(message.account_keys[0], payer);
        assert!(message.is_signer(0) && message.is_writable(0));
        assert_eq!(message.header.num_required_signatures, 1);
    }

    #[test]
    fn test_every_program_id_in_table() {
        let payer = Pubkey::new_unique();
        let programs: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        let ixs: Vec<Instruction> = programs
            .iter()
            .map(|program_id| meta_ix(*program_id, vec![]))
            .collect();

        let message = Message::try_compile(&payer, &ixs, Hash::default()).unwrap();
        for program_id in &programs {
            assert!(message.account_keys.contains(program_id));
        }
        // no duplicates
        let mut keys = message.account_keys.clone();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), message.account_keys.len());
    }

    #[test]
    fn test_wire_round_trip() {
        let payer = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let blockhash = crate::hash::hash(b"recent");
        let message = Message::try_compile(
            &payer,
            &[
                crate::system_instruction::transfer(&payer, &to, 42),
                crate::system_instruction::allocate(&to, 165),
            ],
            blockhash,
        )
        .unwrap();

        let wire = message.serialize();
        assert_eq!(Message::deserialize(&wire), Ok(message.clone()));

        // header sits at the front
        assert_eq!(wire[0], message.header.num_required_signatures);
        assert_eq!(wire[1], message.header.num_readonly_signed_accounts);
        assert_eq!(wire[2], message.header.num_readonly_unsigned_accounts);

        // blockhash sits after the account table
        let offset = 3 + 1 + PUBKEY_BYTES * message.account_keys.len();
        assert_eq!(&wire[offset..offset + HASH_BYTES], blockhash.as_ref());
    }

    #[test]
    fn test_decompile_round_trips_instructions() {
        let payer = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let ixs = vec![
            crate::system_instruction::transfer(&payer, &to, 42),
            crate::system_instruction::transfer(&payer, &to, 42),
        ];
        let message = Message::try_compile(&payer, &ixs, Hash::default()).unwrap();
        let decompiled = message.decompile_instructions().unwrap();
        assert_eq!(decompiled, ixs);
    }

    #[test]
    fn test_parse_rejects_truncation() {
        let payer = Pubkey::new_unique();
        let message = Message::try_compile(
            &payer,
            &[crate::system_instruction::allocate(&payer, 1)],
            Hash::default(),
        )
        .unwrap();
        let wire = message.serialize();
        for len in 0..wire.len() {
            assert!(Message::deserialize(&wire[..len]).is_err(), "{len}");
        }
    }

    #[test]
    fn test_parse_rejects_trailing_bytes() {
        let payer = Pubkey::new_unique();
        let message = Message::try_compile(
            &payer,
            &[crate::system_instruction::allocate(&payer, 1)],
            Hash::default(),
        )
        .unwrap();
        let mut wire = message.serialize();
        wire.push(0);
        assert_eq!(
            Message::deserialize(&wire),
            Err(ParseError::TrailingBytes(1))
        );
    }

    #[test]
    fn test_parse_rejects_inconsistent_header() {
        let payer = Pubkey::new_unique();
        let message = Message::try_compile(
            &payer,
            &[crate::system_instruction::allocate(&payer, 1)],
            Hash::default(),
        )
        .unwrap();
        let mut wire = message.serialize();
        // claim more signers than there are accounts
        wire[0] = u8::MAX;
        assert_eq!(Message::deserialize(&wire), Err(ParseError::InvalidHeader));
    }

    #[test]
    fn test_parse_rejects_bad_account_index() {
        let payer = Pubkey::new_unique();
        let message = Message::try_compile(
            &payer,
            &[crate::system_instruction::transfer(
                &payer,
                &Pubkey::new_unique(),
                1,
            )],
            Hash::default(),
        )
        .unwrap();
        let mut wire = message.serialize();
        let len = wire.len();
        // the last instruction-data byte is preceded by account indices;
        // stomp the program index byte instead: it follows the instruction
        // count prefix
        let ix_start = len - (1 + 1 + 2 + 1 + message.instructions[0].data.len());
        wire[ix_start] = u8::MAX;
        assert_eq!(
            Message::deserialize(&wire),
            Err(ParseError::AccountIndexOutOfRange(u8::MAX))
        );
    }

    #[test]
    fn test_system_program_in_table_for_transfers() {
        let payer = Pubkey::new_unique();
        let message = Message::try_compile(
            &payer,
            &[crate::system_instruction::transfer(
                &payer,
                &Pubkey::new_unique(),
                1,
            )],
            Hash::default(),
        )
        .unwrap();
        assert!(message.account_keys.contains(&system_program::id()));
    }
}
