//! The deploy configuration file: token parameters, RPC endpoint, and
//! optionally the addresses of contracts deployed by a previous run

use std::{collections::BTreeMap, fs, path::Path};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_RPC_URL, DEFAULT_TOKEN_DECIMALS, DEFAULT_TOKEN_NAME, DEFAULT_TOKEN_SYMBOL},
    errors::ScriptError,
    types::ContractName,
};

/// The deploy configuration, read from `eerc.config.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    /// The RPC endpoint of the network to deploy to
    pub rpc_url: String,
    /// The token name
    pub name: String,
    /// The token symbol
    pub symbol: String,
    /// The number of token decimals
    pub decimals: u8,
    /// Whether the token wraps an existing ERC20 as a converter
    pub is_converter: bool,
    /// Addresses of contracts deployed by a previous run, offered for reuse
    /// instead of redeploying
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub existing_addresses: BTreeMap<ContractName, Address>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            name: DEFAULT_TOKEN_NAME.to_string(),
            symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            decimals: DEFAULT_TOKEN_DECIMALS,
            is_converter: false,
            existing_addresses: BTreeMap::new(),
        }
    }
}

impl DeployConfig {
    /// Read the configuration from the given path
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ScriptError::ReadConfig(format!("{}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| ScriptError::ReadConfig(format!("{}: {}", path.display(), e)))
    }

    /// Write the configuration to the given path as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), ScriptError> {
        let encoded = serde_json::to_string_pretty(self)
            .map_err(|e| ScriptError::WriteConfig(e.to_string()))?;
        fs::write(path, encoded).map_err(|e| ScriptError::WriteConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy_primitives::Address;

    use super::DeployConfig;
    use crate::types::ContractName;

    #[test]
    fn test_parses_original_config_shape() {
        let raw = r#"{
            "rpcUrl": "http://localhost:8545",
            "name": "Encrypted Token",
            "symbol": "EERC",
            "decimals": 18,
            "isConverter": false
        }"#;

        let config: DeployConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.symbol, "EERC");
        assert_eq!(config.decimals, 18);
        assert!(!config.is_converter);
        assert!(config.existing_addresses.is_empty());
    }

    #[test]
    fn test_parses_existing_addresses() {
        let raw = r#"{
            "rpcUrl": "http://localhost:8545",
            "name": "Encrypted Token",
            "symbol": "EERC",
            "decimals": 18,
            "isConverter": true,
            "existingAddresses": {
                "Registrar": "0x00000000000000000000000000000000000000aa"
            }
        }"#;

        let config: DeployConfig = serde_json::from_str(raw).unwrap();
        let registrar = config.existing_addresses[&ContractName::Registrar];
        assert_eq!(
            registrar,
            Address::from_str("0x00000000000000000000000000000000000000aa").unwrap()
        );
    }

    #[test]
    fn test_round_trips_through_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eerc.config.json");

        let config = DeployConfig::default();
        config.save(&path).unwrap();
        let reloaded = DeployConfig::load(&path).unwrap();

        assert_eq!(reloaded.rpc_url, config.rpc_url);
        assert_eq!(reloaded.name, config.name);
        assert_eq!(reloaded.decimals, config.decimals);
    }
}
