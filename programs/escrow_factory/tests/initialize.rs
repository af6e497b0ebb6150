#![allow(deprecated)]

mod common;

use common::{initialize_factory, program_test, read_factory, test_program_id, try_send_tx};
use escrow_factory::{instruction as factory_ix, state::factory_address, EscrowFactoryError};
use solana_sdk::{pubkey::Pubkey, signature::Signer};

/// 1. Test: Factory Deployment
/// Verifies that InitializeFactory creates the factory at its PDA with an empty counter.
/// Why: Every escrow creation depends on a deployed factory; the address it yields is what operators record.
#[tokio::test]
async fn test_initialize_factory_creates_factory_account() {
    let mut context = program_test().start_with_context().await;
    let payer = context.payer.insecure_clone();

    let factory = initialize_factory(&mut context, &payer).await;

    assert_ne!(factory, Pubkey::default());
    assert_eq!(factory, factory_address(&test_program_id()).0);

    let account = context
        .banks_client
        .get_account(factory)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.owner, test_program_id());

    let state = read_factory(&mut context).await;
    assert!(state.is_initialized());
    assert_eq!(state.authority, payer.pubkey());
    assert_eq!(state.escrow_count, 0);
    assert_eq!(state.bump, factory_address(&test_program_id()).1);
}

/// 2. Test: Factory Initialized Event
/// Verifies that InitializeFactory logs the factory address exactly once.
/// Why: Operators learn the deployed address from this line.
#[tokio::test]
async fn test_initialize_factory_logs_address_once() {
    let mut context = program_test().start_with_context().await;
    let payer = context.payer.insecure_clone();

    let ix = factory_ix::initialize_factory(&test_program_id(), &payer.pubkey()).unwrap();
    let logs = common::send_tx_with_logs(&mut context, &payer, &[ix], &[]).await;

    let factory = factory_address(&test_program_id()).0;
    let lines: Vec<&String> = logs
        .iter()
        .filter(|l| l.contains("FactoryInitialized:"))
        .collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(&format!("factory={factory}")));
    assert!(lines[0].contains(&format!("authority={}", payer.pubkey())));
}

/// 3. Test: Double Initialization Rejection
/// Verifies that the factory cannot be initialized twice.
/// Why: Re-initialization would reset the escrow counter and hand authority to another account.
#[tokio::test]
async fn test_reject_second_initialization() {
    let mut context = program_test().start_with_context().await;
    let payer = context.payer.insecure_clone();
    initialize_factory(&mut context, &payer).await;

    // Different payer so the transaction is not a duplicate of the first one
    let other = solana_sdk::signature::Keypair::new();
    let fund_ix =
        solana_sdk::system_instruction::transfer(&payer.pubkey(), &other.pubkey(), 1_000_000_000);
    common::send_tx(&mut context, &payer, &[fund_ix], &[]).await;

    let ix = factory_ix::initialize_factory(&test_program_id(), &other.pubkey()).unwrap();
    let result = try_send_tx(&mut context, &other, &[ix], &[]).await;
    common::assert_factory_error(result, EscrowFactoryError::FactoryAlreadyInitialized);

    let state = read_factory(&mut context).await;
    assert_eq!(state.authority, payer.pubkey());
    assert_eq!(state.escrow_count, 0);
}

/// 4. Test: Pre-Funded Factory Address
/// Verifies that InitializeFactory succeeds after lamports were sent to the factory PDA.
/// Why: The PDA is known before deployment; a transfer to it must not block initialization.
#[tokio::test]
async fn test_initialize_factory_after_prefund() {
    let mut context = program_test().start_with_context().await;
    let payer = context.payer.insecure_clone();
    let factory = factory_address(&test_program_id()).0;

    let fund_ix = solana_sdk::system_instruction::transfer(&payer.pubkey(), &factory, 1_000_000);
    common::send_tx(&mut context, &payer, &[fund_ix], &[]).await;

    let ix = factory_ix::initialize_factory(&test_program_id(), &payer.pubkey()).unwrap();
    try_send_tx(&mut context, &payer, &[ix], &[])
        .await
        .expect("initialize should succeed on a pre-funded PDA");

    let account = context
        .banks_client
        .get_account(factory)
        .await
        .unwrap()
        .unwrap();
    let rent = context.banks_client.get_rent().await.unwrap();
    assert_eq!(account.owner, test_program_id());
    assert_eq!(account.data.len(), escrow_factory::EscrowFactory::LEN);
    assert!(account.lamports >= rent.minimum_balance(escrow_factory::EscrowFactory::LEN));

    let state = read_factory(&mut context).await;
    assert!(state.is_initialized());
    assert_eq!(state.authority, payer.pubkey());
    assert_eq!(state.escrow_count, 0);
}
