//! Gateway error types
//!
//! Submission failures (the network never accepted the transaction) are kept
//! apart from confirmation failures (a signature exists but the transaction
//! did not land successfully).

use solana_sdk::{program_error::ProgramError, pubkey::Pubkey, signature::Signature};
use thiserror::Error;

use crate::{events::EventParseError, rpc::RpcError};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid gateway configuration: {0}")]
    Config(String),

    #[error("failed to build instruction: {0}")]
    Instruction(#[from] ProgramError),

    #[error("transaction submission failed: {0}")]
    Submission(#[source] RpcError),

    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),

    #[error("RPC request failed: {0}")]
    Rpc(#[from] RpcError),

    #[error("account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("account {address} does not hold {expected} data")]
    InvalidAccountData {
        address: Pubkey,
        expected: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfirmationError {
    #[error("transaction {signature} failed: {reason}")]
    Rejected { signature: Signature, reason: String },

    #[error("transaction {signature} not confirmed after {polls} status checks")]
    Timeout { signature: Signature, polls: u32 },

    #[error("transaction {signature} confirmed without a {event} event")]
    MissingEvent {
        signature: Signature,
        event: &'static str,
    },

    #[error("transaction {signature} emitted a malformed event: {source}")]
    MalformedEvent {
        signature: Signature,
        #[source]
        source: EventParseError,
    },

    #[error("transaction {signature} created escrow {reported}, expected {submitted}")]
    EscrowMismatch {
        signature: Signature,
        submitted: Pubkey,
        reported: Pubkey,
    },

    #[error("status check for {signature} failed: {source}")]
    Status {
        signature: Signature,
        #[source]
        source: RpcError,
    },
}

impl GatewayError {
    /// True when the transaction never reached the network.
    pub fn is_submission(&self) -> bool {
        matches!(self, GatewayError::Submission(_))
    }

    /// True when the transaction was submitted but did not confirm successfully.
    pub fn is_confirmation(&self) -> bool {
        matches!(self, GatewayError::Confirmation(_))
    }
}
