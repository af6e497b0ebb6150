//! Instruction definitions

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::state::factory_address;

/// Parameters of a single escrow creation.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct EscrowCreationRequest {
    /// Third party that arbitrates the match
    pub arbiter: Pubkey,
    /// Player 1 external handle (e.g. "TARC#8646")
    pub player1_id: String,
    pub player1: Pubkey,
    /// Player 1 stake in lamports
    pub player1_bet_amount: u64,
    /// Player 2 external handle
    pub player2_id: String,
    pub player2: Pubkey,
    /// Player 2 stake in lamports
    pub player2_bet_amount: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum EscrowFactoryInstruction {
    /// Create the factory account. The payer becomes the factory authority.
    ///
    /// Accounts expected:
    /// 0. `[writable]` Factory account (PDA)
    /// 1. `[writable, signer]` Payer
    /// 2. `[]` System program
    InitializeFactory,

    /// Provision a new escrow account recording the request
    ///
    /// Accounts expected:
    /// 0. `[writable]` Factory account (PDA)
    /// 1. `[writable, signer]` New escrow account
    /// 2. `[writable, signer]` Payer
    /// 3. `[]` System program
    CreateEscrow(EscrowCreationRequest),
}

/// Build an `InitializeFactory` instruction.
pub fn initialize_factory(program_id: &Pubkey, payer: &Pubkey) -> Result<Instruction, ProgramError> {
    let (factory, _) = factory_address(program_id);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(factory, false),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: EscrowFactoryInstruction::InitializeFactory.try_to_vec()?,
    })
}

/// Build a `CreateEscrow` instruction. `escrow` must be a fresh keypair's address
/// and must sign the transaction.
pub fn create_escrow(
    program_id: &Pubkey,
    escrow: &Pubkey,
    payer: &Pubkey,
    request: EscrowCreationRequest,
) -> Result<Instruction, ProgramError> {
    let (factory, _) = factory_address(program_id);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(factory, false),
            AccountMeta::new(*escrow, true),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: EscrowFactoryInstruction::CreateEscrow(request).try_to_vec()?,
    })
}
