//! The composable [`Instruction`] type and its compiled, index-based form.

use {
    crate::pubkey::Pubkey,
    serde::{Deserialize, Serialize},
};

/// An account required by an instruction, with its access flags.
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct AccountMeta {
    /// The account's public key.
    pub pubkey: Pubkey,
    /// True if the transaction must carry a signature matching `pubkey`.
    pub is_signer: bool,
    /// True if the runtime may mutate the account during execution.
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A directive for a single invocation of an on-chain program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Instruction {
    /// The program that executes this instruction.
    pub program_id: Pubkey,
    /// Accounts passed to the program, in the order the program expects.
    pub accounts: Vec<AccountMeta>,
    /// Opaque data passed to the program; the layout is program-specific.
    pub data: Vec<u8>,
}

impl Instruction {
    /// Build an instruction whose data is the bincode serialization of
    /// `data`: a 4-byte little-endian discriminant followed by the
    /// variant's fields, which is the layout native programs expect.
    pub fn new_with_bincode<T: Serialize>(
        program_id: Pubkey,
        data: &T,
        accounts: Vec<AccountMeta>,
    ) -> Self {
        let data = bincode::serialize(data).unwrap();
        Self {
            program_id,
            accounts,
            data,
        }
    }

    pub fn new_with_bytes(program_id: Pubkey, data: &[u8], accounts: Vec<AccountMeta>) -> Self {
        Self {
            program_id,
            accounts,
            data: data.to_vec(),
        }
    }
}

/// An [`Instruction`] with its account references replaced by `u8` indices
/// into the enclosing message's account table.
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CompiledInstruction {
    /// Index into the message's account table of the program id.
    pub program_id_index: u8,
    /// Indices into the account table, in instruction order.
    pub accounts: Vec<u8>,
    /// The program input data.
    pub data: Vec<u8>,
}

pub mod data {
    //! Byte-level builder for program-specific instruction data.
    //!
    //! Programs that do not use bincode enums (SPL Token, Token Swap) lay
    //! their data out as a concatenation of primitive fields. [`Writer`]
    //! appends those fields in declaration order.

    /// Accumulates primitive fields into an instruction data blob.
    #[derive(Debug, Default)]
    pub struct Writer {
        buf: Vec<u8>,
    }

    impl Writer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_capacity(capacity: usize) -> Self {
            Self {
                buf: Vec::with_capacity(capacity),
            }
        }

        /// A single byte; also the encoding of bare small integers.
        pub fn u8(mut self, value: u8) -> Self {
            self.buf.push(value);
            self
        }

        /// A bool as one byte, `0` or `1`.
        pub fn bool(self, value: bool) -> Self {
            self.u8(value as u8)
        }

        pub fn u16_le(mut self, value: u16) -> Self {
            self.buf.extend_from_slice(&value.to_le_bytes());
            self
        }

        pub fn u32_le(mut self, value: u32) -> Self {
            self.buf.extend_from_slice(&value.to_le_bytes());
            self
        }

        pub fn u64_le(mut self, value: u64) -> Self {
            self.buf.extend_from_slice(&value.to_le_bytes());
            self
        }

        pub fn u16_be(mut self, value: u16) -> Self {
            self.buf.extend_from_slice(&value.to_be_bytes());
            self
        }

        pub fn u32_be(mut self, value: u32) -> Self {
            self.buf.extend_from_slice(&value.to_be_bytes());
            self
        }

        pub fn u64_be(mut self, value: u64) -> Self {
            self.buf.extend_from_slice(&value.to_be_bytes());
            self
        }

        /// Raw bytes, copied verbatim.
        pub fn bytes(mut self, value: &[u8]) -> Self {
            self.buf.extend_from_slice(value);
            self
        }

        /// A 32-byte public key, copied verbatim.
        pub fn pubkey(self, value: &crate::pubkey::Pubkey) -> Self {
            self.bytes(value.as_ref())
        }

        /// A seed-style string: a u64 little-endian byte length followed by
        /// the UTF-8 bytes. On the wire this reads as a u32 length plus
        /// four zero bytes; the full eight bytes are one length word.
        pub fn str_field(mut self, value: &str) -> Self {
            self.buf
                .extend_from_slice(&(value.len() as u64).to_le_bytes());
            self.buf.extend_from_slice(value.as_bytes());
            self
        }

        /// A borsh-style string: u32 little-endian byte length, then bytes.
        pub fn borsh_str(mut self, value: &str) -> Self {
            self.buf
                .extend_from_slice(&(value.len() as u32).to_le_bytes());
            self.buf.extend_from_slice(value.as_bytes());
            self
        }

        pub fn build(self) -> Vec<u8> {
            self.buf
        }
    }

}
