#![allow(dead_code)]

use borsh::BorshDeserialize;
use solana_program_test::{processor, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    instruction::{Instruction, InstructionError},
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::{Transaction, TransactionError},
};

use escrow_factory::{
    events::{ESCROW_CREATED, ESCROW_CREATED_ESCROW_ARG},
    instruction::{self as factory_ix, EscrowCreationRequest},
    state::{factory_address, Escrow, EscrowFactory},
    EscrowFactoryError,
};

// ============================================================================
// TEST PROGRAM ID
// ============================================================================

/// Fixed program ID for testing. Actual deployed program ID is determined by
/// the deployment keypair, not this value.
pub fn test_program_id() -> Pubkey {
    solana_sdk::pubkey!("Escrow11111111111111111111111111111111111111")
}

/// 0.69 SOL in lamports
pub const BET_0_69_SOL: u64 = LAMPORTS_PER_SOL * 69 / 100;

// ============================================================================
// TEST HARNESS HELPERS
// ============================================================================

/// Helper: Build a ProgramTest instance with the escrow factory
pub fn program_test() -> ProgramTest {
    ProgramTest::new(
        "escrow_factory",
        test_program_id(),
        processor!(escrow_factory::processor::Processor::process),
    )
}

/// Helper: Build and sign a transaction with a specific payer and signers
pub async fn build_tx(
    context: &mut ProgramTestContext,
    payer: &Keypair,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Transaction {
    let blockhash = context.banks_client.get_latest_blockhash().await.unwrap();
    let mut all_signers = Vec::with_capacity(signers.len() + 1);
    all_signers.push(payer);
    for signer in signers {
        if signer.pubkey() != payer.pubkey() {
            all_signers.push(*signer);
        }
    }

    Transaction::new_signed_with_payer(instructions, Some(&payer.pubkey()), &all_signers, blockhash)
}

/// Helper: Send a transaction and return the result
pub async fn try_send_tx(
    context: &mut ProgramTestContext,
    payer: &Keypair,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    let tx = build_tx(context, payer, instructions, signers).await;
    context.banks_client.process_transaction(tx).await
}

/// Helper: Send a transaction that must succeed
pub async fn send_tx(
    context: &mut ProgramTestContext,
    payer: &Keypair,
    instructions: &[Instruction],
    signers: &[&Keypair],
) {
    try_send_tx(context, payer, instructions, signers).await.unwrap();
}

/// Helper: Send a transaction that must succeed and return its log lines
pub async fn send_tx_with_logs(
    context: &mut ProgramTestContext,
    payer: &Keypair,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Vec<String> {
    let tx = build_tx(context, payer, instructions, signers).await;
    let outcome = context
        .banks_client
        .process_transaction_with_metadata(tx)
        .await
        .unwrap();
    outcome.result.unwrap();
    outcome.metadata.map(|m| m.log_messages).unwrap_or_default()
}

// ============================================================================
// PROGRAM HELPERS
// ============================================================================

/// Helper: Initialize the factory with `payer` as authority
pub async fn initialize_factory(context: &mut ProgramTestContext, payer: &Keypair) -> Pubkey {
    let ix = factory_ix::initialize_factory(&test_program_id(), &payer.pubkey()).unwrap();
    send_tx(context, payer, &[ix], &[]).await;
    factory_address(&test_program_id()).0
}

/// Helper: A valid creation request with 0.69 SOL bets and fresh addresses
pub fn sample_request() -> EscrowCreationRequest {
    EscrowCreationRequest {
        arbiter: Pubkey::new_unique(),
        player1_id: "TARC#8646".to_string(),
        player1: Pubkey::new_unique(),
        player1_bet_amount: BET_0_69_SOL,
        player2_id: "MANG#0".to_string(),
        player2: Pubkey::new_unique(),
        player2_bet_amount: BET_0_69_SOL,
    }
}

/// Helper: Build a CreateEscrow instruction for a new escrow keypair
pub fn create_escrow_ix(
    escrow: &Keypair,
    payer: &Keypair,
    request: EscrowCreationRequest,
) -> Instruction {
    factory_ix::create_escrow(&test_program_id(), &escrow.pubkey(), &payer.pubkey(), request)
        .unwrap()
}

/// Helper: Create an escrow and return the transaction logs
pub async fn create_escrow(
    context: &mut ProgramTestContext,
    payer: &Keypair,
    request: EscrowCreationRequest,
) -> Vec<String> {
    let escrow = Keypair::new();
    let ix = create_escrow_ix(&escrow, payer, request);
    send_tx_with_logs(context, payer, &[ix], &[&escrow]).await
}

/// Helper: Ordered argument lists of every `EscrowCreated` log line
pub fn escrow_created_events(logs: &[String]) -> Vec<Vec<(String, String)>> {
    let marker = format!("{ESCROW_CREATED}: ");
    logs.iter()
        .filter_map(|line| line.split_once(&marker).map(|(_, args)| args))
        .map(|args| {
            args.split(", ")
                .filter_map(|kv| kv.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

/// Helper: Escrow address taken from the first creation event
pub fn created_escrow_address(logs: &[String]) -> Pubkey {
    let events = escrow_created_events(logs);
    let (key, value) = &events[0][ESCROW_CREATED_ESCROW_ARG];
    assert_eq!(key, "escrow");
    value.parse().unwrap()
}

/// Helper: Read an escrow account
pub async fn read_escrow(context: &mut ProgramTestContext, address: Pubkey) -> Escrow {
    let account = context
        .banks_client
        .get_account(address)
        .await
        .unwrap()
        .expect("escrow account missing");
    assert_eq!(account.owner, test_program_id());
    Escrow::unpack(&account.data).unwrap()
}

/// Helper: Read the factory account
pub async fn read_factory(context: &mut ProgramTestContext) -> EscrowFactory {
    let account = context
        .banks_client
        .get_account(factory_address(&test_program_id()).0)
        .await
        .unwrap()
        .expect("factory account missing");
    EscrowFactory::try_from_slice(&account.data).unwrap()
}

// ============================================================================
// ERROR CHECKING HELPERS
// ============================================================================

/// Helper: Assert a failed transaction carries the given program error
pub fn assert_factory_error(result: Result<(), BanksClientError>, expected: EscrowFactoryError) {
    let err = result.expect_err("Should have thrown an error");
    assert_eq!(
        err.unwrap(),
        TransactionError::InstructionError(0, InstructionError::Custom(expected as u32))
    );
}
