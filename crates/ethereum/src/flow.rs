//! Per-action lifecycle: wallet signature, block confirmation, mirror write
//!
//! Every user action runs through the same states:
//!
//! ```text
//! Idle -> AwaitingWalletConfirmation -> AwaitingBlockConfirmation
//!      -> PersistingToMirror -> Done
//! ```
//!
//! and can fail from any non-terminal state. A failure while persisting is
//! soft: the transaction is already on-chain and cannot be rolled back, so the
//! confirmed transaction is kept alongside the failure reason.

use alloy::primitives::TxHash;
use serde::Serialize;
use std::fmt;

use crate::error::{OrchestratorError, Result};

/// The three user actions the client drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateProject,
    Stake,
    Withdraw,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::CreateProject => "create project",
            ActionKind::Stake => "stake",
            ActionKind::Withdraw => "withdraw",
        };
        f.write_str(name)
    }
}

/// A transaction with at least one confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedTx {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    AwaitingWalletConfirmation,
    AwaitingBlockConfirmation {
        tx_hash: TxHash,
    },
    PersistingToMirror(ConfirmedTx),
    Done(ConfirmedTx),
    Failed {
        reason: String,
        confirmed: Option<ConfirmedTx>,
    },
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::AwaitingWalletConfirmation => "awaiting-wallet-confirmation",
            FlowState::AwaitingBlockConfirmation { .. } => "awaiting-block-confirmation",
            FlowState::PersistingToMirror(_) => "persisting-to-mirror",
            FlowState::Done(_) => "done",
            FlowState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Done(_) | FlowState::Failed { .. })
    }

    /// Failed after the transaction was confirmed on-chain
    pub fn is_soft_failure(&self) -> bool {
        matches!(
            self,
            FlowState::Failed {
                confirmed: Some(_),
                ..
            }
        )
    }

    /// The confirmed transaction, if the flow got that far
    pub fn confirmed(&self) -> Option<&ConfirmedTx> {
        match self {
            FlowState::PersistingToMirror(tx) | FlowState::Done(tx) => Some(tx),
            FlowState::Failed { confirmed, .. } => confirmed.as_ref(),
            _ => None,
        }
    }
}

/// State machine for a single action, recording every state it passed through
#[derive(Debug, Clone)]
pub struct ActionFlow {
    kind: ActionKind,
    state: FlowState,
    history: Vec<FlowState>,
}

impl ActionFlow {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            state: FlowState::Idle,
            history: vec![FlowState::Idle],
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn history(&self) -> &[FlowState] {
        &self.history
    }

    /// The signed transaction request was dispatched to the wallet
    pub fn submit(&mut self) -> Result<&FlowState> {
        match self.state {
            FlowState::Idle => self.advance(FlowState::AwaitingWalletConfirmation),
            _ => Err(self.invalid("submit")),
        }
    }

    /// The transaction entered the pending pool
    pub fn accepted(&mut self, tx_hash: TxHash) -> Result<&FlowState> {
        match self.state {
            FlowState::AwaitingWalletConfirmation => {
                self.advance(FlowState::AwaitingBlockConfirmation { tx_hash })
            }
            _ => Err(self.invalid("accepted")),
        }
    }

    /// A receipt was obtained; one confirmation is enough
    pub fn confirmed(&mut self, block_number: Option<u64>) -> Result<&FlowState> {
        match self.state {
            FlowState::AwaitingBlockConfirmation { tx_hash } => {
                self.advance(FlowState::PersistingToMirror(ConfirmedTx {
                    tx_hash,
                    block_number,
                }))
            }
            _ => Err(self.invalid("confirmed")),
        }
    }

    /// The mirror accepted the write
    pub fn persisted(&mut self) -> Result<&FlowState> {
        match &self.state {
            FlowState::PersistingToMirror(tx) => {
                let tx = tx.clone();
                self.advance(FlowState::Done(tx))
            }
            _ => Err(self.invalid("persisted")),
        }
    }

    /// Fail from any non-terminal state
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<&FlowState> {
        if self.state.is_terminal() {
            return Err(self.invalid("fail"));
        }
        let confirmed = match &self.state {
            FlowState::PersistingToMirror(tx) => Some(tx.clone()),
            _ => None,
        };
        self.advance(FlowState::Failed {
            reason: reason.into(),
            confirmed,
        })
    }

    fn advance(&mut self, next: FlowState) -> Result<&FlowState> {
        self.history.push(next.clone());
        self.state = next;
        Ok(&self.state)
    }

    fn invalid(&self, event: &'static str) -> OrchestratorError {
        OrchestratorError::InvalidTransition {
            from: self.state.name(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash() -> TxHash {
        TxHash::repeat_byte(0xab)
    }

    #[test]
    fn test_happy_path() {
        let mut flow = ActionFlow::new(ActionKind::Stake);
        flow.submit().unwrap();
        flow.accepted(hash()).unwrap();
        flow.confirmed(Some(42)).unwrap();
        let state = flow.persisted().unwrap().clone();

        assert_eq!(
            state,
            FlowState::Done(ConfirmedTx {
                tx_hash: hash(),
                block_number: Some(42)
            })
        );
        let names: Vec<_> = flow.history().iter().map(FlowState::name).collect();
        assert_eq!(
            names,
            vec![
                "idle",
                "awaiting-wallet-confirmation",
                "awaiting-block-confirmation",
                "persisting-to-mirror",
                "done"
            ]
        );
    }

    #[test]
    fn test_rejection_before_broadcast_is_hard_failure() {
        let mut flow = ActionFlow::new(ActionKind::CreateProject);
        flow.submit().unwrap();
        let state = flow.fail("user rejected").unwrap();
        assert!(state.is_terminal());
        assert!(!state.is_soft_failure());
        assert!(state.confirmed().is_none());
    }

    #[test]
    fn test_mirror_failure_is_soft() {
        let mut flow = ActionFlow::new(ActionKind::Withdraw);
        flow.submit().unwrap();
        flow.accepted(hash()).unwrap();
        flow.confirmed(None).unwrap();
        let state = flow.fail("mirror unavailable").unwrap();
        assert!(state.is_soft_failure());
        assert_eq!(state.confirmed().map(|tx| tx.tx_hash), Some(hash()));
    }

    #[test]
    fn test_out_of_order_transitions_rejected() {
        let mut flow = ActionFlow::new(ActionKind::Stake);
        assert!(matches!(
            flow.confirmed(Some(1)),
            Err(OrchestratorError::InvalidTransition {
                from: "idle",
                event: "confirmed"
            })
        ));
        assert!(flow.persisted().is_err());

        flow.submit().unwrap();
        assert!(flow.submit().is_err());
        flow.fail("reverted").unwrap();
        assert!(matches!(
            flow.fail("again"),
            Err(OrchestratorError::InvalidTransition { from: "failed", .. })
        ));
        assert_eq!(flow.history().len(), 3);
    }

    #[test]
    fn test_action_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ActionKind::CreateProject).unwrap(),
            "\"create_project\""
        );
        assert_eq!(ActionKind::Withdraw.to_string(), "withdraw");
    }
}
