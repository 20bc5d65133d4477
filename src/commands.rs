//! Implementations of the deploy-script commands

use std::{collections::BTreeMap, path::Path};

use tracing::{info, warn};

use crate::{
    artifacts::{ArtifactSource, HardhatArtifacts},
    chain,
    cli::{DeployArgs, InitArgs},
    config::DeployConfig,
    deployer::Deployer,
    errors::ScriptError,
    reuse::{AcceptAll, PromptReuse},
    types::{ContractName, DeploymentRecord},
};

/// Write a deploy configuration file with the given token parameters
pub fn init(args: InitArgs) -> Result<(), ScriptError> {
    let path = Path::new(&args.config_path);
    if path.exists() && !args.force {
        return Err(ScriptError::WriteConfig(format!(
            "{} already exists, pass --force to overwrite it",
            path.display()
        )));
    }

    let config = DeployConfig {
        rpc_url: args.rpc_url,
        name: args.name,
        symbol: args.symbol,
        decimals: args.decimals,
        is_converter: args.converter,
        existing_addresses: BTreeMap::new(),
    };
    config.save(path)?;

    info!("configuration written to {}", path.display());
    Ok(())
}

/// Deploy the contract suite described by the configuration file
pub async fn deploy(args: DeployArgs) -> Result<(), ScriptError> {
    let config = DeployConfig::load(Path::new(&args.config_path))?;

    let artifacts = HardhatArtifacts::new(&args.artifacts_path);
    artifacts.validate_all(&ContractName::ALL)?;
    info!("all required artifacts found");

    let client = chain::setup_client(&args.priv_key, &config.rpc_url).await?;

    if args.dry_run {
        warn!("running in dry-run mode, no contracts will be deployed");
    }

    let record = if args.yes {
        Deployer::new(&artifacts, &client, &AcceptAll)
            .deploy_all(&config, args.dry_run)
            .await?
    } else {
        Deployer::new(&artifacts, &client, &PromptReuse)
            .deploy_all(&config, args.dry_run)
            .await?
    };

    log_addresses(&record);

    if args.dry_run {
        info!("dry run complete, the addresses above are predictions and nothing was persisted");
        return Ok(());
    }

    record.save(Path::new(&args.output_path))?;
    info!("deployment details saved to {}", args.output_path);
    Ok(())
}

/// Log the address table of a completed run
fn log_addresses(record: &DeploymentRecord) {
    for (contract, address) in &record.contracts {
        info!("{contract}: {address}");
    }
}
