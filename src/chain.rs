//! The network operations the deploy scripts require, and their RPC
//! implementation
//!
//! The trait abstraction exists primarily to enable mocks for orchestrator
//! tests; live runs use [`HttpChain`] over an alloy HTTP provider with a
//! local private-key signer.

use std::str::FromStr;

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, Bytes};

use crate::errors::ScriptError;

/// The chain operations the deploy scripts require of a network provider
#[allow(async_fn_in_trait)]
pub trait ChainBackend {
    /// The address deployment transactions are sent from
    fn sender(&self) -> Address;

    /// The chain id of the connected network
    async fn chain_id(&self) -> Result<u64, ScriptError>;

    /// The number of transactions `address` has sent
    async fn transaction_count(&self, address: Address) -> Result<u64, ScriptError>;

    /// Estimate the gas cost of a deployment carrying `init_code`
    async fn estimate_gas(&self, init_code: &Bytes) -> Result<u64, ScriptError>;

    /// Submit a deployment transaction carrying `init_code`, wait for it to
    /// be mined, and return the created contract's address
    async fn deploy(&self, init_code: Bytes) -> Result<Address, ScriptError>;
}

/// A [`ChainBackend`] over an HTTP JSON-RPC provider with a local signer
pub struct HttpChain<P> {
    /// The underlying provider
    provider: P,
    /// The signer's address
    sender: Address,
}

/// Set up an RPC client from the deployer's private key and an RPC url
pub async fn setup_client(
    priv_key: &str,
    rpc_url: &str,
) -> Result<HttpChain<impl Provider>, ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let sender = signer.address();

    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);

    Ok(HttpChain { provider, sender })
}

impl<P: Provider> HttpChain<P> {
    /// The deployment transaction carrying the given init code
    fn deploy_transaction(&self, init_code: Bytes) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.sender)
            .with_deploy_code(init_code)
    }
}

impl<P: Provider> ChainBackend for HttpChain<P> {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn chain_id(&self) -> Result<u64, ScriptError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::NetworkUnavailable(e.to_string()))
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, ScriptError> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(|e| ScriptError::NetworkUnavailable(e.to_string()))
    }

    async fn estimate_gas(&self, init_code: &Bytes) -> Result<u64, ScriptError> {
        let tx = self.deploy_transaction(init_code.clone());
        self.provider
            .estimate_gas(&tx)
            .await
            .map_err(|e| ScriptError::NetworkUnavailable(e.to_string()))
    }

    async fn deploy(&self, init_code: Bytes) -> Result<Address, ScriptError> {
        let tx = self.deploy_transaction(init_code);
        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::TransactionFailed(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| ScriptError::TransactionFailed(e.to_string()))?;

        if !receipt.status() {
            return Err(ScriptError::TransactionFailed(format!(
                "deployment transaction {} reverted",
                receipt.transaction_hash
            )));
        }

        receipt.contract_address.ok_or_else(|| {
            ScriptError::TransactionFailed("deployment receipt carries no contract address".into())
        })
    }
}
