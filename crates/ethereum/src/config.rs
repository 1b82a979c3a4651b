//! Client configuration

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::str::FromStr;
use url::Url;

use crate::error::{OrchestratorError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Connection details for the node, the signer and the mirror API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// JSON-RPC endpoint of the node
    pub rpc_url: String,
    /// Hex private key of the acting account
    pub private_key: String,
    /// Address of the deployed GreenFi contract
    pub contract_address: String,
    /// Base URL of the mirror API, including the `/api` prefix
    pub api_url: String,
}

impl ClientConfig {
    pub fn new(
        rpc_url: impl Into<String>,
        private_key: impl Into<String>,
        contract_address: impl Into<String>,
    ) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            private_key: private_key.into(),
            contract_address: contract_address.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Validate every field without touching the network
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.rpc_url).map_err(|e| {
            OrchestratorError::Configuration(format!("Invalid RPC URL '{}': {}", self.rpc_url, e))
        })?;
        Url::parse(&self.api_url).map_err(|e| {
            OrchestratorError::Configuration(format!("Invalid API URL '{}': {}", self.api_url, e))
        })?;
        self.contract_address()?;
        self.signer()?;
        Ok(())
    }

    pub fn contract_address(&self) -> Result<Address> {
        Address::from_str(self.contract_address.trim()).map_err(|e| {
            OrchestratorError::Configuration(format!(
                "Invalid contract address '{}': {}",
                self.contract_address, e
            ))
        })
    }

    pub fn signer(&self) -> Result<PrivateKeySigner> {
        self.private_key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|e| OrchestratorError::Configuration(format!("Invalid private key: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Anvil's first development account
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn config() -> ClientConfig {
        ClientConfig::new("http://localhost:8545", DEV_KEY, CONTRACT)
    }

    #[test]
    fn test_valid_config() {
        let config = config();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(
            config.signer().unwrap().address(),
            Address::from_str(DEV_ADDRESS).unwrap()
        );
    }

    #[test]
    fn test_invalid_fields() {
        let bad_contract = ClientConfig::new("http://localhost:8545", DEV_KEY, "invalid");
        assert!(matches!(
            bad_contract.validate(),
            Err(OrchestratorError::Configuration(_))
        ));

        let bad_key = ClientConfig::new("http://localhost:8545", "0x1234", CONTRACT);
        assert!(bad_key.validate().is_err());

        let bad_rpc = ClientConfig::new("not a url", DEV_KEY, CONTRACT);
        assert!(bad_rpc.validate().is_err());

        let bad_api = config().with_api_url("::");
        assert!(bad_api.validate().is_err());
    }
}
