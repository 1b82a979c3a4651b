//! Error types for the client orchestrator

use thiserror::Error;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Errors that can occur while running a user action end to end
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// User input rejected before anything was sent
    #[error("{0}")]
    InvalidInput(String),

    /// The signer refused to sign or submit the transaction
    #[error("Transaction rejected by wallet: {0}")]
    WalletRejected(String),

    /// The transaction reverted, either in simulation or on-chain
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// RPC connection or network error
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Contract call (read operation) failed
    #[error("Contract call failed: {0}")]
    ContractCall(String),

    /// Neither the receipt logs nor the project counter yielded an id
    #[error("Project id unavailable: {0}")]
    ProjectIdUnavailable(String),

    /// The mirror API refused or failed the write
    #[error("Mirror write failed: {0}")]
    Mirror(String),

    /// An action flow was driven out of order
    #[error("Invalid transition from {from} on {event}")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },

    /// Withdraw attempted by an account that does not own the project
    #[error("You are not the project owner!")]
    NotOwner,
}

impl OrchestratorError {
    /// Classify a failed `send()` by what the node or signer reported
    pub fn from_send_error(err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        let lowered = message.to_lowercase();
        if lowered.contains("revert") {
            Self::Reverted(message)
        } else if lowered.contains("rejected") || lowered.contains("denied") {
            Self::WalletRejected(message)
        } else {
            Self::Rpc(message)
        }
    }
}

impl From<reqwest::Error> for OrchestratorError {
    fn from(err: reqwest::Error) -> Self {
        Self::Mirror(err.to_string())
    }
}
