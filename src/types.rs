//! Type definitions used throughout the deploy scripts

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    fs,
    path::Path,
};

use alloy_primitives::Address;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{constants::BABYJUBJUB_QUALIFIED_NAME, errors::ScriptError};

/// The contracts making up the EncryptedERC suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContractName {
    /// The registration proof verifier
    RegistrationVerifier,
    /// The mint proof verifier
    MintVerifier,
    /// The withdraw / burn proof verifier
    WithdrawVerifier,
    /// The transfer proof verifier
    TransferVerifier,
    /// The shared BabyJubJub elliptic-curve library
    BabyJubJub,
    /// The user registrar
    Registrar,
    /// The EncryptedERC token contract
    EncryptedERC,
}

impl ContractName {
    /// Every contract in the suite, listed in canonical deployment order
    pub const ALL: [ContractName; 7] = [
        ContractName::RegistrationVerifier,
        ContractName::MintVerifier,
        ContractName::WithdrawVerifier,
        ContractName::TransferVerifier,
        ContractName::BabyJubJub,
        ContractName::Registrar,
        ContractName::EncryptedERC,
    ];

    /// The fully qualified name under which this contract appears in
    /// link-reference tables, if it is a linked library
    pub fn qualified_library_name(self) -> Option<&'static str> {
        match self {
            ContractName::BabyJubJub => Some(BABYJUBJUB_QUALIFIED_NAME),
            _ => None,
        }
    }

    /// Whether reuse of a previously deployed address is never offered for
    /// this contract.
    ///
    /// The token contract binds the registrar, verifier, and library
    /// addresses immutably in its constructor, so it must be redeployed
    /// whenever the suite is deployed.
    pub fn always_fresh(self) -> bool {
        matches!(self, ContractName::EncryptedERC)
    }
}

impl Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContractName::RegistrationVerifier => "RegistrationVerifier",
            ContractName::MintVerifier => "MintVerifier",
            ContractName::WithdrawVerifier => "WithdrawVerifier",
            ContractName::TransferVerifier => "TransferVerifier",
            ContractName::BabyJubJub => "BabyJubJub",
            ContractName::Registrar => "Registrar",
            ContractName::EncryptedERC => "EncryptedERC",
        };
        write!(f, "{name}")
    }
}

/// The record of a single deployment run: which network it ran against, when,
/// and the address resolved for each contract.
///
/// A record is owned by exactly one orchestrator run and persisted by the
/// caller on success; failed runs never persist one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// The chain id of the network deployed to
    pub chain_id: u64,
    /// The ISO-8601 time the run started
    pub timestamp: String,
    /// Whether the run was a dry run, in which case the addresses are
    /// predictions rather than deployed contracts
    pub dry_run: bool,
    /// The resolved address of each contract
    pub contracts: BTreeMap<ContractName, Address>,
}

impl DeploymentRecord {
    /// Create an empty record for a run starting now
    pub fn new(chain_id: u64, dry_run: bool) -> Self {
        Self {
            chain_id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            dry_run,
            contracts: BTreeMap::new(),
        }
    }

    /// Record a contract's resolved address.
    ///
    /// Addresses are write-once within a run; later steps read them but
    /// never overwrite them.
    pub fn record(&mut self, contract: ContractName, address: Address) {
        debug_assert!(
            !self.contracts.contains_key(&contract),
            "{contract} already recorded"
        );
        self.contracts.entry(contract).or_insert(address);
    }

    /// The resolved address of the given contract, if one has been recorded
    pub fn address_of(&self, contract: ContractName) -> Option<Address> {
        self.contracts.get(&contract).copied()
    }

    /// Write the record to the given path as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), ScriptError> {
        let encoded = serde_json::to_string_pretty(self)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        fs::write(path, encoded).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::{ContractName, DeploymentRecord};

    #[test]
    fn test_record_addresses_are_write_once() {
        let mut record = DeploymentRecord::new(1, false);
        let first = Address::repeat_byte(0x01);
        record.record(ContractName::Registrar, first);
        assert_eq!(record.address_of(ContractName::Registrar), Some(first));
    }

    #[test]
    fn test_record_serializes_with_contract_name_keys() {
        let mut record = DeploymentRecord::new(43113, true);
        record.record(ContractName::BabyJubJub, Address::repeat_byte(0xbb));

        let encoded = serde_json::to_string(&record).unwrap();
        assert!(encoded.contains("\"chainId\":43113"));
        assert!(encoded.contains("\"dryRun\":true"));
        assert!(encoded.contains("\"BabyJubJub\""));
    }
}
