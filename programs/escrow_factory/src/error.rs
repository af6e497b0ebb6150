//! Error types

use solana_program::program_error::ProgramError;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum EscrowFactoryError {
    #[error("Invalid instruction data")]
    InvalidInstructionData,

    #[error("Invalid PDA")]
    InvalidPda,

    #[error("Invalid account owner")]
    InvalidAccountOwner,

    #[error("Factory not initialized")]
    FactoryNotInitialized,

    #[error("Factory already initialized")]
    FactoryAlreadyInitialized,

    #[error("Escrow account already in use")]
    EscrowAlreadyExists,

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid player id")]
    InvalidPlayerId,

    #[error("Escrow counter overflow")]
    EscrowCountOverflow,

    #[error("Invalid escrow account data")]
    InvalidEscrowData,
}

impl From<EscrowFactoryError> for ProgramError {
    fn from(e: EscrowFactoryError) -> Self {
        ProgramError::Custom(e as u32)
    }
}
