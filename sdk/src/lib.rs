//! Core types for talking to a Solana cluster from off-chain code.
//!
//! This crate owns everything that must be byte-exact: ed25519 keypairs and
//! signatures, base58-addressed public keys, program-derived addresses,
//! the compact-u16 wire encoding, and the compilation of instructions into
//! signed transactions in the exact layout the cluster expects.
//!
//! The RPC plumbing that ships those bytes lives in `lumos-client`; the SPL
//! Token instruction set lives in `lumos-token`.

pub mod bpf_loader;
pub mod commitment_config;
pub mod fee_calculator;
pub mod hash;
pub mod instruction;
pub mod message;
pub mod native_token;
pub mod nonce;
pub mod pubkey;
pub mod short_vec;
pub mod signature;
pub mod system_instruction;
pub mod system_program;
pub mod sysvar;
pub mod transaction;
