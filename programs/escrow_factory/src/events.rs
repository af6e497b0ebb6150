//! Event definitions for the escrow factory program.
//!
//! Events are emitted via solana_program::msg! as `Name: key=value, ...` lines
//! and can be parsed from transaction logs. Argument order is part of the
//! interface: clients read arguments by position.

use solana_program::{msg, pubkey::Pubkey};

pub const FACTORY_INITIALIZED: &str = "FactoryInitialized";
pub const ESCROW_CREATED: &str = "EscrowCreated";

/// Position of the new escrow address in the `EscrowCreated` argument list.
pub const ESCROW_CREATED_ESCROW_ARG: usize = 4;

/// Emitted once when the factory account is created.
pub fn emit_factory_initialized(factory: &Pubkey, authority: &Pubkey) {
    msg!(
        "FactoryInitialized: factory={}, authority={}",
        factory,
        authority
    );
}

/// Emitted once per successful escrow creation.
#[allow(clippy::too_many_arguments)]
pub fn emit_escrow_created(
    factory: &Pubkey,
    arbiter: &Pubkey,
    player1: &Pubkey,
    player2: &Pubkey,
    escrow: &Pubkey,
    escrow_index: u64,
    player1_bet_amount: u64,
    player2_bet_amount: u64,
) {
    msg!(
        "EscrowCreated: factory={}, arbiter={}, player1={}, player2={}, escrow={}, escrow_index={}, player1_bet_amount={}, player2_bet_amount={}",
        factory,
        arbiter,
        player1,
        player2,
        escrow,
        escrow_index,
        player1_bet_amount,
        player2_bet_amount
    );
}
