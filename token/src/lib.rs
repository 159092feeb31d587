//! Instruction builders for the SPL Token program and its companions: the
//! Associated Token Account program and the Token Swap program.
//!
//! Everything here produces plain [`Instruction`](lumos_sdk::instruction::Instruction)
//! values that compile into transactions via `lumos_sdk::transaction`.

pub mod associated_token;
pub mod instruction;
pub mod state;
pub mod swap;

lumos_sdk::declare_id!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
