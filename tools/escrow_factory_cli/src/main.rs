//! Escrow Factory CLI
//!
//! Deploys the escrow factory, creates escrows and reads escrow state.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin escrow-factory -- --config config/escrow_factory.toml deploy
//!
//! cargo run --bin escrow-factory -- create-escrow \
//!   --arbiter <pubkey> \
//!   --player1-id "TARC#8646" --player1 <pubkey> --player1-bet 0.69 \
//!   --player2-id "MANG#0" --player2 <pubkey> --player2-bet 0.69
//! ```
//!
//! Or set the config path via environment variable:
//!
//! ```bash
//! ESCROW_FACTORY_CONFIG_PATH=escrow_factory.toml cargo run --bin escrow-factory -- get-factory
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use escrow_factory_cli::config::ConfigOverrides;
use escrow_factory_cli::{
    format_lamports, parse_sol_amount, EscrowCreationRequest, EscrowFactoryGateway, GatewayConfig,
};
use solana_sdk::{pubkey::Pubkey, signature::Signer};
use std::str::FromStr;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "escrow-factory")]
#[command(about = "Deploy the escrow factory and create per-match escrows")]
struct Cli {
    /// Path to configuration file (default: config/escrow_factory.toml or ESCROW_FACTORY_CONFIG_PATH env var)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override network.rpc_url
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Override program.program_id
    #[arg(long, global = true)]
    program_id: Option<String>,

    /// Override signer.keypair_path
    #[arg(long, global = true)]
    keypair: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize the factory account and print its address
    Deploy,

    /// Create a new escrow for a match between two players
    CreateEscrow {
        /// Arbiter pubkey
        #[arg(long)]
        arbiter: String,
        /// Player 1 external id (1-32 bytes)
        #[arg(long)]
        player1_id: String,
        /// Player 1 pubkey
        #[arg(long)]
        player1: String,
        /// Player 1 bet in SOL (e.g. 0.69)
        #[arg(long)]
        player1_bet: String,
        /// Player 2 external id (1-32 bytes)
        #[arg(long)]
        player2_id: String,
        /// Player 2 pubkey
        #[arg(long)]
        player2: String,
        /// Player 2 bet in SOL (e.g. 0.69)
        #[arg(long)]
        player2_bet: String,
    },

    /// Print the record stored in an escrow account
    GetEscrow {
        /// Escrow account address
        #[arg(long)]
        escrow: String,
    },

    /// Print the factory account
    GetFactory,
}

#[tokio::main]
async fn main() {
    // Parse command line arguments first (before initializing logging)
    let cli = Cli::parse();

    // Initialize structured logging
    tracing_subscriber::fmt::init();

    if let Err(e) = run(cli).await {
        error!("escrow-factory failed: {:?}", e);
        eprintln!("[escrow-factory] Error: {:?}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let overrides = ConfigOverrides {
        rpc_url: cli.rpc_url,
        program_id: cli.program_id,
        keypair_path: cli.keypair,
    };
    let config = GatewayConfig::load_with_overrides(cli.config.as_deref(), overrides)?;
    info!("RPC URL: {}", config.network.rpc_url);
    info!("Program id: {}", config.program.program_id);

    let gateway = EscrowFactoryGateway::new(&config)?;

    match cli.command {
        Command::Deploy => {
            let payer = config.load_keypair()?;
            info!("Deploying factory with authority {}", payer.pubkey());
            let factory = gateway
                .deploy(&payer)
                .await
                .context("Factory deployment failed")?;
            println!("EscrowFactory deployed to: {}", factory);
        }
        Command::CreateEscrow {
            arbiter,
            player1_id,
            player1,
            player1_bet,
            player2_id,
            player2,
            player2_bet,
        } => {
            let request = EscrowCreationRequest {
                arbiter: parse_pubkey("arbiter", &arbiter)?,
                player1_id,
                player1: parse_pubkey("player1", &player1)?,
                player1_bet_amount: parse_sol_amount(&player1_bet)
                    .context("Invalid --player1-bet")?,
                player2_id,
                player2: parse_pubkey("player2", &player2)?,
                player2_bet_amount: parse_sol_amount(&player2_bet)
                    .context("Invalid --player2-bet")?,
            };
            let payer = config.load_keypair()?;
            let confirmed = gateway
                .create_escrow(&payer, &request)
                .await
                .context("Escrow creation failed")?;

            println!("Escrow: {}", confirmed.escrow_address());
            println!("Escrow index: {}", confirmed.created.escrow_index);
            println!("Signature: {}", confirmed.signature);
            println!("Slot: {}", confirmed.slot);
        }
        Command::GetEscrow { escrow } => {
            let address = parse_pubkey("escrow", &escrow)?;
            let record = gateway.attach(address).fetch().await?;

            println!("Escrow: {}", address);
            println!("Factory: {}", record.factory);
            println!("Arbiter: {}", record.arbiter);
            println!("Escrow index: {}", record.escrow_index);
            println!("Created at: {}", record.created_at);
            println!(
                "Player 1: {} ({}) bet {} SOL",
                record.player1_id(),
                record.player1,
                format_lamports(record.player1_bet_amount())
            );
            println!(
                "Player 2: {} ({}) bet {} SOL",
                record.player2_id(),
                record.player2,
                format_lamports(record.player2_bet_amount())
            );
        }
        Command::GetFactory => {
            let factory = gateway.get_factory().await?;
            println!("Factory: {}", gateway.factory_address());
            println!("Authority: {}", factory.authority);
            println!("Escrow count: {}", factory.escrow_count);
        }
    }

    Ok(())
}

fn parse_pubkey(name: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).with_context(|| format!("Invalid --{} pubkey: {}", name, value))
}
