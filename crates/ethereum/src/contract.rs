//! GreenFi contract bindings and provider construction

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::{OrchestratorError, Result};
use crate::project_id::ProjectCounter;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IGreenFi {
        event ProjectCreated(uint256 indexed projectId, address indexed owner);
        event Staked(uint256 indexed projectId, address indexed staker, uint256 amount);
        event MilestoneMarked(uint256 indexed projectId);
        event Withdrawn(uint256 indexed projectId, address indexed owner, uint256 amount);

        function projectCount() external view returns (uint256);
        function projects(uint256 projectId)
            external
            view
            returns (address owner, uint256 funds, bool milestoneReached);

        function createProject() external;
        function stake(uint256 projectId) external payable;
        function markMilestone(uint256 projectId) external;
        function withdraw(uint256 projectId) external;
    }
}

/// Contract connection details; providers are built per action
pub struct ContractClient {
    contract_address: Address,
    rpc_url: String,
    signer: PrivateKeySigner,
}

impl ContractClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            contract_address: config.contract_address()?,
            rpc_url: config.rpc_url.clone(),
            signer: config.signer()?,
        })
    }

    pub fn contract_address(&self) -> &Address {
        &self.contract_address
    }

    /// Account that signs every transaction
    pub fn account(&self) -> Address {
        self.signer.address()
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Chain id reported by the node
    pub async fn chain_id(&self) -> Result<u64> {
        let provider = self.create_provider()?;
        provider
            .get_chain_id()
            .await
            .map_err(|e| OrchestratorError::Rpc(e.to_string()))
    }

    /// Read-only provider for `call()` operations
    pub fn create_provider(&self) -> Result<impl Provider + use<>> {
        let rpc_url = self
            .rpc_url
            .parse()
            .map_err(|e| OrchestratorError::Configuration(format!("Invalid RPC URL: {}", e)))?;

        Ok(ProviderBuilder::new().connect_http(rpc_url))
    }

    /// Provider with the local wallet attached for `send()` operations
    pub fn create_provider_with_signer(&self) -> Result<impl Provider + use<>> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let rpc_url = self
            .rpc_url
            .parse()
            .map_err(|e| OrchestratorError::Configuration(format!("Invalid RPC URL: {}", e)))?;

        Ok(ProviderBuilder::new().wallet(wallet).connect_http(rpc_url))
    }
}

#[async_trait]
impl ProjectCounter for ContractClient {
    async fn project_count(&self) -> Result<U256> {
        let provider = self.create_provider()?;
        let greenfi = IGreenFi::new(self.contract_address, &provider);
        greenfi
            .projectCount()
            .call()
            .await
            .map_err(|e| OrchestratorError::ContractCall(e.to_string()))
    }
}
