//! The deployment orchestrator: sequencing, reuse decisions, bytecode
//! linking, and dry-run address prediction for the contract suite

use std::collections::BTreeMap;

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolConstructor;
use tracing::{info, warn};

use crate::{
    artifacts::{ArtifactSource, ContractArtifact},
    chain::ChainBackend,
    config::DeployConfig,
    constants::HEX_PREFIX,
    errors::ScriptError,
    graph::{DependencyGraph, DeploymentPlan, DeploymentStep},
    linker, predictor,
    reuse::ReusePolicy,
    solidity,
    types::{ContractName, DeploymentRecord},
};

/// The deployment orchestrator for one run of the deploy scripts.
///
/// A run owns its record and every intermediate value; nothing is retained
/// between runs, so independent runs against different networks share no
/// mutable state.
pub struct Deployer<'a, A, C, P> {
    /// Artifact lookup
    artifacts: &'a A,
    /// Network operations
    chain: &'a C,
    /// The reuse decision capability
    reuse: &'a P,
}

impl<'a, A: ArtifactSource, C: ChainBackend, P: ReusePolicy> Deployer<'a, A, C, P> {
    /// Create an orchestrator from its collaborators
    pub fn new(artifacts: &'a A, chain: &'a C, reuse: &'a P) -> Self {
        Self {
            artifacts,
            chain,
            reuse,
        }
    }

    /// Deploy (or reuse) every contract in the suite in dependency order,
    /// returning the completed record.
    ///
    /// In dry-run mode no transaction is submitted: gas is estimated and the
    /// address each contract would be created at is derived from the
    /// deployer account's transaction count. Any failure aborts the
    /// remaining steps; the caller may re-run with `existing_addresses`
    /// populated from a previous record to skip the contracts that
    /// succeeded.
    pub async fn deploy_all(
        &self,
        config: &DeployConfig,
        dry_run: bool,
    ) -> Result<DeploymentRecord, ScriptError> {
        info!("initializing deployment");
        let chain_id = self.chain.chain_id().await?;
        let mut record = DeploymentRecord::new(chain_id, dry_run);
        let plan = DeploymentPlan::new(&DependencyGraph::standard(), &config.existing_addresses)?;

        // The on-chain count never advances during a dry run; predictions
        // instead offset the count fetched here by the number of deployments
        // already planned, yielding the nonces a live run would consume
        let base_nonce = if dry_run {
            self.chain.transaction_count(self.chain.sender()).await?
        } else {
            0
        };
        let mut planned = 0u64;

        info!(chain_id, "deploying dependencies");
        for step in &plan.steps {
            let address = self
                .run_step(step, &record, config, dry_run, base_nonce, &mut planned)
                .await?;
            record.record(step.contract, address);
        }

        info!("finalizing deployment");
        Ok(record)
    }

    /// Resolve one step of the plan to an address, either by reusing an
    /// offered existing deployment or by deploying (or predicting) a fresh
    /// one
    async fn run_step(
        &self,
        step: &DeploymentStep,
        record: &DeploymentRecord,
        config: &DeployConfig,
        dry_run: bool,
        base_nonce: u64,
        planned: &mut u64,
    ) -> Result<Address, ScriptError> {
        let contract = step.contract;

        if !dry_run {
            if let Some(candidate) = step.existing {
                if self.reuse.offer_reuse(contract, candidate) {
                    return Ok(candidate);
                }
                // A declined offer is a normal control path: fall through to
                // a fresh deployment
                info!("declined reuse of {contract}, deploying fresh");
            }
        }

        if contract.always_fresh() {
            info!("deploying main contract");
        }

        let artifact = self.artifacts.load(contract)?;
        let bytecode = self.link_libraries(contract, &artifact, record)?;

        let mut init_code = hex::decode(bytecode.trim_start_matches(HEX_PREFIX)).map_err(|e| {
            ScriptError::ArtifactMalformed(format!("{contract}: bytecode is not valid hex: {e}"))
        })?;
        init_code.extend(constructor_calldata(contract, record, config)?);
        let init_code = Bytes::from(init_code);

        let gas = self.chain.estimate_gas(&init_code).await?;
        info!(gas, "estimated deployment gas for {contract}");

        if dry_run {
            let predicted = predictor::contract_address(self.chain.sender(), base_nonce + *planned);
            *planned += 1;
            info!("{contract} would be deployed to {predicted}");
            return Ok(predicted);
        }

        let address = self.chain.deploy(init_code).await.map_err(|e| match e {
            ScriptError::TransactionFailed(msg) => {
                ScriptError::TransactionFailed(format!("{contract}: {msg}"))
            }
            other => other,
        })?;
        info!("{contract} deployed to {address}");
        Ok(address)
    }

    /// Resolve library references in an artifact's bytecode against the
    /// addresses recorded so far.
    ///
    /// The offset table is authoritative; an artifact carrying placeholders
    /// without one is flagged and linked through the legacy textual
    /// substitution.
    fn link_libraries(
        &self,
        contract: ContractName,
        artifact: &ContractArtifact,
        record: &DeploymentRecord,
    ) -> Result<String, ScriptError> {
        if !artifact.link_references.is_empty() {
            info!("linking libraries into {contract}");
            let libraries = resolved_libraries(record);
            return linker::link_bytecode(&artifact.bytecode, &artifact.link_references, &libraries);
        }

        if linker::contains_placeholder(&artifact.bytecode) {
            warn!(
                "artifact for {contract} carries placeholders but no link-reference table, \
                 falling back to legacy substitution"
            );
            let library = record.address_of(ContractName::BabyJubJub).ok_or_else(|| {
                ScriptError::UnresolvedLibrary(format!(
                    "{contract} requires the BabyJubJub library, which is not yet deployed"
                ))
            })?;
            return Ok(linker::link_bytecode_legacy(&artifact.bytecode, library));
        }

        Ok(artifact.bytecode.clone())
    }
}

/// The fully-qualified-name -> address map of every library deployed so far
fn resolved_libraries(record: &DeploymentRecord) -> BTreeMap<String, Address> {
    ContractName::ALL
        .iter()
        .filter_map(|&name| {
            let qualified = name.qualified_library_name()?;
            let address = record.address_of(name)?;
            Some((qualified.to_string(), address))
        })
        .collect()
}

/// ABI-encode the constructor arguments of the given contract from the
/// addresses resolved so far and the token configuration
fn constructor_calldata(
    contract: ContractName,
    record: &DeploymentRecord,
    config: &DeployConfig,
) -> Result<Vec<u8>, ScriptError> {
    match contract {
        ContractName::Registrar => {
            let call = solidity::Registrar::constructorCall {
                registrationVerifier: resolved(record, ContractName::RegistrationVerifier)?,
            };
            Ok(call.abi_encode())
        }
        ContractName::EncryptedERC => {
            let params = solidity::CreateEncryptedERCParams {
                registrar: resolved(record, ContractName::Registrar)?,
                mintVerifier: resolved(record, ContractName::MintVerifier)?,
                withdrawVerifier: resolved(record, ContractName::WithdrawVerifier)?,
                transferVerifier: resolved(record, ContractName::TransferVerifier)?,
                name: config.name.clone(),
                symbol: config.symbol.clone(),
                decimals: config.decimals,
                isConverter: config.is_converter,
            };
            Ok(solidity::EncryptedERC::constructorCall { params }.abi_encode())
        }
        _ => Ok(Vec::new()),
    }
}

/// Read a dependency's resolved address from the record
fn resolved(record: &DeploymentRecord, contract: ContractName) -> Result<Address, ScriptError> {
    record.address_of(contract).ok_or_else(|| {
        ScriptError::CalldataConstruction(format!("{contract} address is not yet resolved"))
    })
}
