//! Escrow factory gateway
//!
//! Client side of the escrow factory program: deploys the factory, submits
//! escrow creations, waits for confirmation, reads the creation event and
//! queries escrow accounts over Solana JSON-RPC.

pub mod amount;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod rpc;

// Re-export public types for convenience
pub use amount::{format_lamports, parse_sol_amount};
pub use config::GatewayConfig;
pub use error::{ConfirmationError, GatewayError};
pub use events::{EscrowCreated, FactoryInitialized, ProgramEvent};
pub use gateway::{ConfirmedCreation, EscrowFactoryGateway, EscrowHandle, PendingCreation};
pub use rpc::{Commitment, SvmRpcClient};

pub use escrow_factory::instruction::EscrowCreationRequest;
