//! GreenFi client CLI

use alloy::primitives::U256;
use alloy::primitives::utils::{format_ether, parse_ether};
use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use ethereum::{
    ActionReport, ClientConfig, ConsolePresenter, ContractClient, MirrorClient, Orchestrator,
    ProjectDraft,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "greenfi-client")]
#[command(about = "GreenFi client - create projects, stake and withdraw, mirrored to the API")]
struct Cli {
    /// JSON-RPC endpoint of the node
    #[arg(long, global = true, env = "RPC_URL", default_value = "http://localhost:8545")]
    rpc_url: String,

    /// Private key of the acting account
    #[arg(long, global = true, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Deployed GreenFi contract address
    #[arg(long, global = true, env = "CONTRACT_ADDRESS")]
    contract_address: Option<String>,

    /// Base URL of the mirror API
    #[arg(long, global = true, env = "API_URL", default_value = ethereum::config::DEFAULT_API_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a project owned by the signing account
    CreateProject {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Funding goal in wei
        #[arg(long)]
        funding_goal: Option<U256>,
    },

    /// Stake ETH into a project
    Stake {
        #[arg(long)]
        project_id: U256,

        /// Amount in ether, e.g. 0.5
        #[arg(long, conflicts_with = "amount_wei", required_unless_present = "amount_wei")]
        amount: Option<String>,

        /// Amount in wei
        #[arg(long)]
        amount_wei: Option<U256>,
    },

    /// Withdraw a project's funds (owner only)
    Withdraw {
        #[arg(long)]
        project_id: U256,
    },
}

fn print_report(report: &ActionReport) {
    let tx = report
        .tx_hash()
        .map(|hash| hash.to_string())
        .unwrap_or_else(|| "-".to_string());
    info!(
        "{} on project {}: {} (tx {})",
        report.action,
        report.project_id,
        report.state.name(),
        tx
    );
    if let Some(amount) = report.amount {
        info!("Amount: {} ETH", format_ether(amount));
    }
    if let Some(marked) = report.milestone_marked {
        info!("Milestone marked: {}", marked);
    }
    if report.mirror_out_of_sync() {
        warn!("⚠️ Transaction is on-chain but missing from the mirror; re-submit it to the API");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let _log_guard = monitoring::init_logging()?;

    let private_key = cli
        .private_key
        .ok_or_else(|| anyhow!("PRIVATE_KEY is required"))?;
    let contract_address = cli
        .contract_address
        .ok_or_else(|| anyhow!("CONTRACT_ADDRESS is required"))?;

    let config =
        ClientConfig::new(cli.rpc_url, private_key, contract_address).with_api_url(cli.api_url);
    let contract = ContractClient::new(&config)?;
    let mirror = MirrorClient::new(config.api_url.clone());
    let mut orchestrator = Orchestrator::new(contract, mirror, ConsolePresenter);

    orchestrator.connect_wallet().await?;

    let report = match cli.command {
        Commands::CreateProject {
            name,
            description,
            funding_goal,
        } => {
            orchestrator
                .create_project(ProjectDraft {
                    name,
                    description,
                    funding_goal,
                })
                .await?
        }
        Commands::Stake {
            project_id,
            amount,
            amount_wei,
        } => {
            let wei = match (amount, amount_wei) {
                (_, Some(wei)) => wei,
                (Some(ether), None) => parse_ether(&ether)
                    .map_err(|e| anyhow!("Invalid amount '{}': {}", ether, e))?,
                (None, None) => return Err(anyhow!("Please enter an amount")),
            };
            orchestrator.stake(project_id, wei).await?
        }
        Commands::Withdraw { project_id } => orchestrator.withdraw(project_id).await?,
    };

    print_report(&report);
    Ok(())
}
