use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use vault_dashboard::chain::{AccountAddress, VaultChainClient};
use vault_dashboard::config::load_config;

#[derive(Parser)]
#[command(name = "vault-cli")]
#[command(about = "Drive on-chain vault operations for integration testing", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; VAULT_* environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show network, vault and signer information
    Info,
    /// Read the full vault state
    State,
    /// Check whether the vault is initialized
    Initialized,
    /// Vault shares held by an address
    Shares { address: String },
    /// Native coin balance in octas (defaults to the signer)
    Balance { address: Option<String> },
    /// Call a vault view function
    View {
        function: String,
        #[arg(long = "arg")]
        args: Vec<String>,
        #[arg(long = "type-arg")]
        type_args: Vec<String>,
    },
    /// Submit an entry function (bare vault name or address::module::function)
    Submit {
        function: String,
        #[arg(long = "arg")]
        args: Vec<String>,
    },
    /// Initialize the vault
    Initialize,
    /// Deposit an amount of the asset token
    Deposit { amount: u64 },
    /// Withdraw a number of shares
    Withdraw { shares: u64 },
    /// Trigger a rebalance
    Rebalance,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vault_dashboard=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let client = VaultChainClient::new(config.chain)?;

    match cli.command {
        Commands::Info => {
            let ledger = client.ledger_info().await?;
            print_json(&json!({
                "network": client.config().network,
                "rpc_url": client.config().rpc_url,
                "chain_id": ledger.chain_id,
                "ledger_version": ledger.ledger_version,
                "vault_address": client.vault_address(),
                "signer": client.signer_address(),
            }))?;
        }
        Commands::State => {
            let state = client.get_vault_state().await?;
            let share_price = state.share_price();
            print_json(&json!({ "state": state, "share_price": share_price }))?;
        }
        Commands::Initialized => {
            print_json(&json!({ "initialized": client.is_vault_initialized().await }))?;
        }
        Commands::Shares { address } => {
            let address: AccountAddress = address.parse()?;
            let shares = client.get_user_shares(&address).await;
            print_json(&json!({ "address": address, "shares": shares }))?;
        }
        Commands::Balance { address } => {
            let address = match address {
                Some(a) => a.parse::<AccountAddress>()?,
                None => client
                    .signer_address()
                    .ok_or("no address given and no signer configured")?,
            };
            let balance = client.get_account_balance(&address).await;
            print_json(&json!({ "address": address, "balance": balance }))?;
        }
        Commands::View {
            function,
            args,
            type_args,
        } => {
            let args = args.iter().map(|a| parse_cli_arg(a)).collect();
            let result = client.call_view(&function, args, type_args).await?;
            print_json(&result)?;
        }
        Commands::Submit { function, args } => {
            let args = args.iter().map(|a| parse_cli_arg(a)).collect();
            print_json(&client.submit_transaction(&function, args).await?)?;
        }
        Commands::Initialize => print_json(&client.initialize_vault().await?)?,
        Commands::Deposit { amount } => print_json(&client.deposit(amount).await?)?,
        Commands::Withdraw { shares } => print_json(&client.withdraw(shares).await?)?,
        Commands::Rebalance => print_json(&client.rebalance().await?)?,
    }

    Ok(())
}

/// `true`/`false` become booleans; everything else is passed as a string,
/// which is how the node expects u64 and address arguments.
fn parse_cli_arg(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
