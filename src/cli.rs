//! Definitions of CLI arguments and commands for the deploy scripts

use clap::{Args, Parser, Subcommand};

use crate::{
    commands,
    constants::{
        ARTIFACTS_BASE_PATH, DEFAULT_CONFIG_PATH, DEFAULT_DEPLOYMENT_OUTPUT_PATH, DEFAULT_RPC_URL,
        DEFAULT_TOKEN_DECIMALS, DEFAULT_TOKEN_NAME, DEFAULT_TOKEN_SYMBOL, PRIV_KEY_ENV_VAR,
    },
    errors::ScriptError,
};

/// CLI tool for deploying the EncryptedERC token and its supporting contracts
#[derive(Parser)]
#[command(name = "eerc-deploy", version, about)]
pub struct Cli {
    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The deploy-script subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Write a deploy configuration file
    Init(InitArgs),
    /// Deploy the EncryptedERC token and all required contracts
    Deploy(DeployArgs),
}

impl Command {
    /// Run the command
    pub async fn run(self) -> Result<(), ScriptError> {
        match self {
            Command::Init(args) => commands::init(args),
            Command::Deploy(args) => commands::deploy(args).await,
        }
    }
}

/// Write a deploy configuration file with the given token parameters
#[derive(Args)]
pub struct InitArgs {
    /// Network RPC URL
    #[arg(short, long, default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Token name
    #[arg(long, default_value = DEFAULT_TOKEN_NAME)]
    pub name: String,

    /// Token symbol
    #[arg(long, default_value = DEFAULT_TOKEN_SYMBOL)]
    pub symbol: String,

    /// Token decimals
    #[arg(long, default_value_t = DEFAULT_TOKEN_DECIMALS)]
    pub decimals: u8,

    /// Configure the token as a converter wrapping an existing ERC20
    #[arg(long)]
    pub converter: bool,

    /// Path to write the configuration file to
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: String,

    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

/// Deploy the contract suite described by the configuration file
#[derive(Args)]
pub struct DeployArgs {
    /// Private key of the deployer
    #[arg(short, long, env = PRIV_KEY_ENV_VAR)]
    pub priv_key: String,

    /// Path to the deploy configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: String,

    /// Path the deployment record is written to
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENT_OUTPUT_PATH)]
    pub output_path: String,

    /// Directory containing the compiled contract artifacts
    #[arg(long, default_value = ARTIFACTS_BASE_PATH)]
    pub artifacts_path: String,

    /// Estimate gas and predict addresses without submitting transactions
    #[arg(long)]
    pub dry_run: bool,

    /// Accept every offered reuse of an existing address without prompting
    #[arg(short, long)]
    pub yes: bool,
}
