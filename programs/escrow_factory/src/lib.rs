//! Escrow Factory Program (Native Solana)
//!
//! A single factory account, deployed once per program, provisions escrow
//! accounts on request. Each escrow records an arbiter, two players (id and
//! address) and the bet amount each player staked.
//!
//! ## Instructions
//!
//! - `InitializeFactory`: Create the factory PDA, payer becomes authority
//! - `CreateEscrow`: Provision a new escrow account and emit `EscrowCreated`
//!
//! Settlement of an escrow is handled elsewhere; this program only records
//! the creation request.

pub mod error;
pub mod events;
pub mod instruction;
pub mod processor;
pub mod state;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;

pub use solana_program;

// Re-export for tests and clients
pub use error::EscrowFactoryError;
pub use instruction::EscrowFactoryInstruction;
pub use state::{Escrow, EscrowFactory};

/// Maximum length of a player id in bytes (ids are stored NUL-padded)
pub const MAX_PLAYER_ID_LEN: usize = 32;
