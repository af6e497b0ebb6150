//! Account state definitions

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::{error::EscrowFactoryError, MAX_PLAYER_ID_LEN};

/// Factory account. One per program.
/// PDA seeds: ["factory"]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct EscrowFactory {
    /// Discriminator for account type
    pub discriminator: [u8; 8],
    /// Account that deployed the factory
    pub authority: Pubkey,
    /// Number of escrows created so far; also the index of the next escrow
    pub escrow_count: u64,
    /// PDA bump seed
    pub bump: u8,
}

impl EscrowFactory {
    pub const DISCRIMINATOR: [u8; 8] = [0x45, 0x53, 0x43, 0x46, 0x41, 0x43, 0x54, 0x59]; // "ESCFACTY"
    pub const LEN: usize = 8 + 32 + 8 + 1; // 49 bytes

    pub fn new(authority: Pubkey, bump: u8) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            authority,
            escrow_count: 0,
            bump,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.discriminator == Self::DISCRIMINATOR
    }
}

/// Escrow record written once by `CreateEscrow`.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Escrow {
    /// Discriminator for account type
    pub discriminator: [u8; 8],
    /// Factory that created this escrow
    pub factory: Pubkey,
    /// Third party that arbitrates the match
    pub arbiter: Pubkey,
    /// Player 1 external handle, NUL-padded
    pub player1_id: [u8; 32],
    pub player1: Pubkey,
    /// Player 1 stake in lamports
    pub player1_bet_amount: u64,
    /// Player 2 external handle, NUL-padded
    pub player2_id: [u8; 32],
    pub player2: Pubkey,
    /// Player 2 stake in lamports
    pub player2_bet_amount: u64,
    /// Position of this escrow in the factory's creation order
    pub escrow_index: u64,
    /// Unix timestamp at creation
    pub created_at: i64,
}

impl Escrow {
    pub const DISCRIMINATOR: [u8; 8] = [0x45, 0x53, 0x43, 0x52, 0x4f, 0x57, 0x42, 0x54]; // "ESCROWBT"
    pub const LEN: usize = 8 + 32 + 32 + 32 + 32 + 8 + 32 + 32 + 8 + 8 + 8; // 232 bytes

    pub fn player1_bet_amount(&self) -> u64 {
        self.player1_bet_amount
    }

    pub fn player2_bet_amount(&self) -> u64 {
        self.player2_bet_amount
    }

    pub fn player1_id(&self) -> String {
        decode_player_id(&self.player1_id)
    }

    pub fn player2_id(&self) -> String {
        decode_player_id(&self.player2_id)
    }

    /// Deserialize an escrow and check its discriminator.
    pub fn unpack(data: &[u8]) -> Result<Self, EscrowFactoryError> {
        let escrow =
            Self::try_from_slice(data).map_err(|_| EscrowFactoryError::InvalidEscrowData)?;
        if escrow.discriminator != Self::DISCRIMINATOR {
            return Err(EscrowFactoryError::InvalidEscrowData);
        }
        Ok(escrow)
    }
}

/// Encode a player id into its fixed-size on-chain form.
///
/// Ids must be 1..=32 bytes and must not contain NUL, which is the padding byte.
pub fn encode_player_id(id: &str) -> Result<[u8; MAX_PLAYER_ID_LEN], EscrowFactoryError> {
    let bytes = id.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_PLAYER_ID_LEN || bytes.contains(&0) {
        return Err(EscrowFactoryError::InvalidPlayerId);
    }
    let mut out = [0u8; MAX_PLAYER_ID_LEN];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

/// Decode a NUL-padded player id.
pub fn decode_player_id(raw: &[u8; MAX_PLAYER_ID_LEN]) -> String {
    let end = raw.iter().position(|b| *b == 0).unwrap_or(MAX_PLAYER_ID_LEN);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Seeds for PDA derivation
pub mod seeds {
    pub const FACTORY_SEED: &[u8] = b"factory";
}

/// Derive the factory PDA for a program.
pub fn factory_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::FACTORY_SEED], program_id)
}
