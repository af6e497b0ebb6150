//! Escrow Factory Gateway
//!
//! Deploys the factory, creates escrows and attaches to existing escrows.
//! Creation is split into two explicit steps: `submit_create_escrow` returns a
//! `PendingCreation` once the node accepts the transaction, and `confirm`
//! turns it into a `ConfirmedCreation` once the transaction lands and its
//! `EscrowCreated` event has been read from the logs.

use borsh::BorshDeserialize;
use escrow_factory::{
    events::{ESCROW_CREATED, FACTORY_INITIALIZED},
    instruction::{self as factory_ix, EscrowCreationRequest},
    state::{factory_address, Escrow, EscrowFactory},
};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    config::{ConfirmationConfig, GatewayConfig},
    error::{ConfirmationError, GatewayError},
    events::{first_event, parse_events, EscrowCreated, FactoryInitialized, ProgramEvent},
    rpc::{Commitment, SvmRpcClient, TransactionLogs},
};

/// A creation accepted by the network but not yet confirmed.
#[derive(Debug, Clone)]
pub struct PendingCreation {
    pub signature: Signature,
    /// Address the escrow account will live at once confirmed
    pub escrow: Pubkey,
}

/// A confirmed creation with its event.
#[derive(Debug, Clone)]
pub struct ConfirmedCreation {
    pub signature: Signature,
    pub slot: u64,
    /// Raw creation event, arguments in emission order
    pub event: ProgramEvent,
    pub created: EscrowCreated,
}

impl ConfirmedCreation {
    /// Address of the new escrow, taken from the creation event.
    pub fn escrow_address(&self) -> Pubkey {
        self.created.escrow
    }
}

pub struct EscrowFactoryGateway {
    rpc: SvmRpcClient,
    program_id: Pubkey,
    commitment: Commitment,
    poll_interval: Duration,
    max_polls: u32,
}

impl EscrowFactoryGateway {
    /// Creates a gateway from validated configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(EscrowFactoryGateway)` - Ready to submit transactions
    /// * `Err(GatewayError)` - Invalid program id or HTTP client failure
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let program_id = config
            .program_id()
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        let rpc = SvmRpcClient::new(&config.network.rpc_url, config.network.commitment)?;
        Ok(Self::with_rpc(rpc, program_id, &config.confirmation))
    }

    pub fn with_rpc(
        rpc: SvmRpcClient,
        program_id: Pubkey,
        confirmation: &ConfirmationConfig,
    ) -> Self {
        Self {
            commitment: rpc.commitment(),
            rpc,
            program_id,
            poll_interval: Duration::from_millis(confirmation.poll_interval_ms),
            max_polls: confirmation.max_polls,
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Address of the factory account for this program.
    pub fn factory_address(&self) -> Pubkey {
        factory_address(&self.program_id).0
    }

    // ========================================================================
    // DEPLOYMENT
    // ========================================================================

    /// Creates the factory account and waits for confirmation.
    ///
    /// # Returns
    ///
    /// * `Ok(Pubkey)` - Address of the deployed factory
    /// * `Err(GatewayError)` - Submission or confirmation failure
    pub async fn deploy(&self, payer: &Keypair) -> Result<Pubkey, GatewayError> {
        let ix = factory_ix::initialize_factory(&self.program_id, &payer.pubkey())?;
        let signature = self.submit(&[ix], payer, &[]).await?;
        info!("InitializeFactory submitted: {}", signature);

        let landed = self.wait_for_confirmation(&signature).await?;
        let events = parse_events(&landed.log_messages);
        let event = first_event(&events, FACTORY_INITIALIZED).ok_or(
            ConfirmationError::MissingEvent {
                signature,
                event: FACTORY_INITIALIZED,
            },
        )?;
        let initialized = FactoryInitialized::try_from(event)
            .map_err(|source| ConfirmationError::MalformedEvent { signature, source })?;

        info!(
            "Factory {} initialized by {} at slot {}",
            initialized.factory, initialized.authority, landed.slot
        );
        Ok(initialized.factory)
    }

    // ========================================================================
    // ESCROW CREATION
    // ========================================================================

    /// Submits a CreateEscrow transaction for a fresh escrow account.
    ///
    /// # Returns
    ///
    /// * `Ok(PendingCreation)` - Node accepted the transaction
    /// * `Err(GatewayError::Submission)` - Node rejected or was unreachable
    pub async fn submit_create_escrow(
        &self,
        payer: &Keypair,
        request: &EscrowCreationRequest,
    ) -> Result<PendingCreation, GatewayError> {
        let escrow = Keypair::new();
        let ix = factory_ix::create_escrow(
            &self.program_id,
            &escrow.pubkey(),
            &payer.pubkey(),
            request.clone(),
        )?;
        let signature = self.submit(&[ix], payer, &[&escrow]).await?;

        info!(
            "CreateEscrow submitted: signature={}, escrow={}, player1={}, player2={}",
            signature, escrow.pubkey(), request.player1_id, request.player2_id
        );
        Ok(PendingCreation {
            signature,
            escrow: escrow.pubkey(),
        })
    }

    /// Waits for a pending creation to land and reads its creation event.
    pub async fn confirm(
        &self,
        pending: &PendingCreation,
    ) -> Result<ConfirmedCreation, GatewayError> {
        let signature = pending.signature;
        let landed = self.wait_for_confirmation(&signature).await?;

        let events = parse_events(&landed.log_messages);
        let event = first_event(&events, ESCROW_CREATED)
            .cloned()
            .ok_or(ConfirmationError::MissingEvent {
                signature,
                event: ESCROW_CREATED,
            })?;
        let created = EscrowCreated::try_from(&event)
            .map_err(|source| ConfirmationError::MalformedEvent { signature, source })?;

        if created.escrow != pending.escrow {
            warn!(
                "EscrowCreated reports escrow {} but {} was submitted",
                created.escrow, pending.escrow
            );
            return Err(ConfirmationError::EscrowMismatch {
                signature,
                submitted: pending.escrow,
                reported: created.escrow,
            }
            .into());
        }
        info!(
            "Escrow {} confirmed at slot {} (index {})",
            created.escrow, landed.slot, created.escrow_index
        );

        Ok(ConfirmedCreation {
            signature,
            slot: landed.slot,
            event,
            created,
        })
    }

    /// Submits and confirms an escrow creation.
    pub async fn create_escrow(
        &self,
        payer: &Keypair,
        request: &EscrowCreationRequest,
    ) -> Result<ConfirmedCreation, GatewayError> {
        let pending = self.submit_create_escrow(payer, request).await?;
        self.confirm(&pending).await
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Attaches to an existing escrow account.
    pub fn attach(&self, escrow: Pubkey) -> EscrowHandle<'_> {
        EscrowHandle {
            gateway: self,
            address: escrow,
        }
    }

    /// Reads the factory account.
    pub async fn get_factory(&self) -> Result<EscrowFactory, GatewayError> {
        let address = self.factory_address();
        let data = self.read_program_account(&address).await?;
        EscrowFactory::try_from_slice(&data)
            .ok()
            .filter(EscrowFactory::is_initialized)
            .ok_or(GatewayError::InvalidAccountData {
                address,
                expected: "factory",
            })
    }

    async fn read_program_account(&self, address: &Pubkey) -> Result<Vec<u8>, GatewayError> {
        let account = self
            .rpc
            .get_account(address)
            .await?
            .ok_or(GatewayError::AccountNotFound(*address))?;
        if account.owner != self.program_id {
            return Err(GatewayError::InvalidAccountData {
                address: *address,
                expected: "escrow factory program",
            });
        }
        Ok(account.data)
    }

    // ========================================================================
    // TRANSACTION PLUMBING
    // ========================================================================

    async fn submit(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> Result<Signature, GatewayError> {
        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(GatewayError::Submission)?;

        let mut all_signers: Vec<&Keypair> = Vec::with_capacity(signers.len() + 1);
        all_signers.push(payer);
        all_signers.extend(signers.iter().copied());

        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            &all_signers,
            blockhash,
        );
        self.rpc
            .send_transaction(&tx)
            .await
            .map_err(GatewayError::Submission)
    }

    async fn wait_for_confirmation(
        &self,
        signature: &Signature,
    ) -> Result<TransactionLogs, ConfirmationError> {
        let status_error = |source| ConfirmationError::Status {
            signature: *signature,
            source,
        };

        for poll in 1..=self.max_polls {
            let status = self
                .rpc
                .get_signature_status(signature)
                .await
                .map_err(status_error)?;

            match status {
                Some(status) if status.err.is_some() => {
                    let reason = status.err.map(|e| e.to_string()).unwrap_or_default();
                    warn!("Transaction {} failed: {}", signature, reason);
                    return Err(ConfirmationError::Rejected {
                        signature: *signature,
                        reason,
                    });
                }
                Some(status) if status.reached(self.commitment) => {
                    if let Some(landed) = self
                        .rpc
                        .get_transaction_logs(signature)
                        .await
                        .map_err(status_error)?
                    {
                        if let Some(err) = &landed.err {
                            return Err(ConfirmationError::Rejected {
                                signature: *signature,
                                reason: err.to_string(),
                            });
                        }
                        return Ok(landed);
                    }
                    debug!("Transaction {} confirmed but not yet indexed", signature);
                }
                Some(status) => debug!(
                    "Transaction {} at {:?}, waiting for {} (poll {}/{})",
                    signature,
                    status.confirmation_status,
                    self.commitment.as_str(),
                    poll,
                    self.max_polls
                ),
                None => debug!(
                    "Transaction {} not yet seen (poll {}/{})",
                    signature, poll, self.max_polls
                ),
            }

            if poll < self.max_polls {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        Err(ConfirmationError::Timeout {
            signature: *signature,
            polls: self.max_polls,
        })
    }
}

/// Handle on a deployed escrow account.
pub struct EscrowHandle<'a> {
    gateway: &'a EscrowFactoryGateway,
    address: Pubkey,
}

impl EscrowHandle<'_> {
    pub fn address(&self) -> Pubkey {
        self.address
    }

    /// Reads the full escrow record.
    pub async fn fetch(&self) -> Result<Escrow, GatewayError> {
        let data = self.gateway.read_program_account(&self.address).await?;
        Escrow::unpack(&data).map_err(|_| GatewayError::InvalidAccountData {
            address: self.address,
            expected: "escrow",
        })
    }

    /// Player 1 stake in lamports.
    pub async fn player1_bet_amount(&self) -> Result<u64, GatewayError> {
        Ok(self.fetch().await?.player1_bet_amount())
    }

    /// Player 2 stake in lamports.
    pub async fn player2_bet_amount(&self) -> Result<u64, GatewayError> {
        Ok(self.fetch().await?.player2_bet_amount())
    }
}
