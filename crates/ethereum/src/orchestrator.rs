//! Runs create / stake / withdraw end to end: send, wait for the receipt, write
//! to the mirror. Mirror failures after confirmation are reported, never undone.

use alloy::network::Ethereum;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::PendingTransactionBuilder;
use alloy::rpc::types::TransactionReceipt;
use tracing::{info, warn};

use crate::contract::{ContractClient, IGreenFi};
use crate::error::{OrchestratorError, Result};
use crate::flow::{ActionFlow, ActionKind, FlowState};
use crate::mirror_client::{MirrorAck, MirrorClient, ProjectPayload, StakePayload, WithdrawalPayload};
use crate::project_id::{IdSource, resolve_project_id};
use crate::wallet::{PresentationAdapter, SessionChange, WalletEvent, WalletSession, short_address};

/// Off-chain details of a new project; the contract only records the owner
#[derive(Debug, Clone)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub funding_goal: Option<U256>,
}

/// Outcome of one action, including the states it went through
#[derive(Debug, Clone)]
pub struct ActionReport {
    pub action: ActionKind,
    pub project_id: U256,
    pub state: FlowState,
    pub history: Vec<FlowState>,
    pub id_source: Option<IdSource>,
    pub amount: Option<U256>,
    pub milestone_marked: Option<bool>,
}

impl ActionReport {
    fn from_flow(flow: &ActionFlow, project_id: U256) -> Self {
        Self {
            action: flow.kind(),
            project_id,
            state: flow.state().clone(),
            history: flow.history().to_vec(),
            id_source: None,
            amount: None,
            milestone_marked: None,
        }
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        self.state.confirmed().map(|tx| tx.tx_hash)
    }

    /// On-chain effect happened but the mirror does not know about it
    pub fn mirror_out_of_sync(&self) -> bool {
        self.state.is_soft_failure()
    }
}

pub struct Orchestrator<P: PresentationAdapter> {
    contract: ContractClient,
    mirror: MirrorClient,
    presenter: P,
    session: WalletSession,
}

impl<P: PresentationAdapter> Orchestrator<P> {
    pub fn new(contract: ContractClient, mirror: MirrorClient, presenter: P) -> Self {
        Self {
            contract,
            mirror,
            presenter,
            session: WalletSession::new(),
        }
    }

    pub fn account(&self) -> Address {
        self.contract.account()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    /// Connect the signing account on the node's chain
    pub async fn connect_wallet(&mut self) -> Result<SessionChange> {
        let chain_id = self.contract.chain_id().await?;
        let event = WalletEvent::Connected {
            account: self.contract.account(),
            chain_id,
        };
        Ok(self.handle_wallet_event(&event))
    }

    /// Feed a wallet event to the session and the presenter
    pub fn handle_wallet_event(&mut self, event: &WalletEvent) -> SessionChange {
        let change = self.session.apply(event);
        self.presenter.on_wallet_event(event);
        change
    }

    fn ensure_connected(&self) -> Result<()> {
        if !self.session.is_connected() {
            return Err(OrchestratorError::InvalidInput(
                "Connect wallet first".to_string(),
            ));
        }
        if self.session.reload_required() {
            return Err(OrchestratorError::InvalidInput(
                "Chain changed, reconnect the wallet".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn create_project(&mut self, draft: ProjectDraft) -> Result<ActionReport> {
        self.ensure_connected()?;
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "Please enter a project name".to_string(),
            ));
        }

        let provider = self.contract.create_provider_with_signer()?;
        let greenfi = IGreenFi::new(*self.contract.contract_address(), &provider);
        let mut flow = ActionFlow::new(ActionKind::CreateProject);

        info!("📝 Creating project: {}", name);
        self.submit(&mut flow)?;
        let pending = match greenfi.createProject().send().await {
            Ok(pending) => pending,
            Err(e) => return Err(self.abort(&mut flow, OrchestratorError::from_send_error(e))),
        };
        let receipt = self.confirm(&mut flow, pending).await?;

        let (project_id, id_source) =
            match resolve_project_id(receipt.inner.logs(), &self.contract).await {
                Ok(resolved) => resolved,
                Err(e) => return Err(self.abort(&mut flow, e)),
            };
        info!("🎊 Project id: {}", project_id);

        let payload = ProjectPayload {
            id: project_id.to_string(),
            owner: self.account().to_string().to_lowercase(),
            name,
            description: draft.description.trim().to_string(),
            funds: "0".to_string(),
            milestone_reached: false,
            tx_hash: receipt.transaction_hash.to_string(),
            block_number: receipt.block_number,
            funding_goal: draft.funding_goal.map(|goal| goal.to_string()),
        };
        let written = self.mirror.save_project(&payload).await;
        self.persist(&mut flow, written)?;

        let mut report = ActionReport::from_flow(&flow, project_id);
        report.id_source = Some(id_source);
        Ok(report)
    }

    pub async fn stake(&mut self, project_id: U256, amount: U256) -> Result<ActionReport> {
        self.ensure_connected()?;
        if amount.is_zero() {
            return Err(OrchestratorError::InvalidInput(
                "Please enter a positive amount".to_string(),
            ));
        }

        let provider = self.contract.create_provider_with_signer()?;
        let greenfi = IGreenFi::new(*self.contract.contract_address(), &provider);
        let mut flow = ActionFlow::new(ActionKind::Stake);

        info!("💰 Staking {} wei in project {}", amount, project_id);
        self.submit(&mut flow)?;
        let pending = match greenfi.stake(project_id).value(amount).send().await {
            Ok(pending) => pending,
            Err(e) => return Err(self.abort(&mut flow, OrchestratorError::from_send_error(e))),
        };
        let receipt = self.confirm(&mut flow, pending).await?;

        let payload = StakePayload {
            project_id: project_id.to_string(),
            staker: self.account().to_string().to_lowercase(),
            amount: amount.to_string(),
            tx_hash: receipt.transaction_hash.to_string(),
            block_number: receipt.block_number,
        };
        let written = self.mirror.save_stake(&payload).await;
        if let Ok(ack) = &written {
            if ack.milestone_reached == Some(true) {
                info!("🎯 Project {} has reached its funding goal", project_id);
            }
        }
        self.persist(&mut flow, written)?;

        let mut report = ActionReport::from_flow(&flow, project_id);
        report.amount = Some(amount);
        Ok(report)
    }

    /// Owner-only: optionally latches the milestone on-chain, then withdraws.
    /// The withdrawn amount recorded in the mirror is the on-chain balance read
    /// before the withdrawal.
    pub async fn withdraw(&mut self, project_id: U256) -> Result<ActionReport> {
        self.ensure_connected()?;
        let provider = self.contract.create_provider_with_signer()?;
        let greenfi = IGreenFi::new(*self.contract.contract_address(), &provider);
        let mut flow = ActionFlow::new(ActionKind::Withdraw);

        let project = match greenfi.projects(project_id).call().await {
            Ok(project) => project,
            Err(e) => {
                let err = OrchestratorError::ContractCall(e.to_string());
                return Err(self.abort(&mut flow, err));
            }
        };
        if project.owner != self.account() {
            warn!(
                "Project {} is owned by {}, not {}",
                project_id,
                short_address(&project.owner),
                short_address(&self.account())
            );
            return Err(self.abort(&mut flow, OrchestratorError::NotOwner));
        }
        let funds = project.funds;

        // The contract may refuse when the goal is unmet or already marked
        let milestone_marked = match greenfi.markMilestone(project_id).send().await {
            Ok(pending) => match pending.get_receipt().await {
                Ok(receipt) => receipt.status(),
                Err(e) => {
                    warn!("⚠️ markMilestone not confirmed: {}", e);
                    false
                }
            },
            Err(e) => {
                warn!("⚠️ markMilestone failed, continuing with withdraw: {}", e);
                false
            }
        };

        info!("💸 Withdrawing {} wei from project {}", funds, project_id);
        self.submit(&mut flow)?;
        let pending = match greenfi.withdraw(project_id).send().await {
            Ok(pending) => pending,
            Err(e) => return Err(self.abort(&mut flow, OrchestratorError::from_send_error(e))),
        };
        let receipt = self.confirm(&mut flow, pending).await?;

        let payload = WithdrawalPayload {
            project_id: project_id.to_string(),
            withdrawer: self.account().to_string().to_lowercase(),
            amount: funds.to_string(),
            milestone: milestone_marked,
            tx_hash: receipt.transaction_hash.to_string(),
            block_number: receipt.block_number,
        };
        let written = self.mirror.save_withdrawal(&payload).await;
        self.persist(&mut flow, written)?;

        let mut report = ActionReport::from_flow(&flow, project_id);
        report.amount = Some(funds);
        report.milestone_marked = Some(milestone_marked);
        Ok(report)
    }

    fn render(&mut self, flow: &ActionFlow) {
        self.presenter.render_frame(flow.kind(), flow.state());
    }

    fn submit(&mut self, flow: &mut ActionFlow) -> Result<()> {
        flow.submit()?;
        self.render(flow);
        Ok(())
    }

    /// Move the flow to failed, render it, and hand the error back
    fn abort(&mut self, flow: &mut ActionFlow, err: OrchestratorError) -> OrchestratorError {
        if flow.fail(err.to_string()).is_ok() {
            self.render(flow);
        }
        err
    }

    async fn confirm(
        &mut self,
        flow: &mut ActionFlow,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<TransactionReceipt> {
        flow.accepted(*pending.tx_hash())?;
        self.render(flow);

        let receipt = match pending.get_receipt().await {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.abort(flow, OrchestratorError::Rpc(e.to_string()))),
        };
        if !receipt.status() {
            let err = OrchestratorError::Reverted(format!(
                "transaction {} reverted",
                receipt.transaction_hash
            ));
            return Err(self.abort(flow, err));
        }

        flow.confirmed(receipt.block_number)?;
        self.render(flow);
        Ok(receipt)
    }

    /// A failed mirror write leaves the flow soft-failed instead of erroring
    fn persist(&mut self, flow: &mut ActionFlow, written: Result<MirrorAck>) -> Result<()> {
        match written {
            Ok(_) => {
                flow.persisted()?;
            }
            Err(e) => {
                warn!("⚠️ {} confirmed but failed to save to mirror: {}", flow.kind(), e);
                flow.fail(e.to_string())?;
            }
        }
        self.render(flow);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    #[derive(Default)]
    struct RecordingPresenter {
        frames: Vec<(ActionKind, &'static str)>,
        wallet_events: Vec<WalletEvent>,
    }

    impl PresentationAdapter for RecordingPresenter {
        fn render_frame(&mut self, action: ActionKind, state: &FlowState) {
            self.frames.push((action, state.name()));
        }

        fn on_wallet_event(&mut self, event: &WalletEvent) {
            self.wallet_events.push(event.clone());
        }
    }

    fn orchestrator() -> Orchestrator<RecordingPresenter> {
        let config = ClientConfig::new("http://localhost:8545", DEV_KEY, CONTRACT);
        let contract = ContractClient::new(&config).unwrap();
        let mirror = MirrorClient::new(config.api_url.clone());
        Orchestrator::new(contract, mirror, RecordingPresenter::default())
    }

    #[tokio::test]
    async fn test_actions_require_connected_wallet() {
        let mut orchestrator = orchestrator();

        let err = orchestrator
            .stake(U256::from(1u64), U256::from(10u64))
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidInput(ref m) if m == "Connect wallet first"));
        assert!(orchestrator.withdraw(U256::ZERO).await.is_err());
        assert!(orchestrator.presenter().frames.is_empty());
    }

    #[tokio::test]
    async fn test_wallet_events_reach_session_and_presenter() {
        let mut orchestrator = orchestrator();
        let account = orchestrator.account();

        let change = orchestrator.handle_wallet_event(&WalletEvent::Connected {
            account,
            chain_id: 31337,
        });
        assert_eq!(change, SessionChange::Connected(account));
        assert_eq!(orchestrator.session().account(), Some(account));

        // connected, so validation now gets past the session check
        let err = orchestrator
            .stake(U256::from(1u64), U256::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidInput(ref m) if m == "Please enter a positive amount"));

        orchestrator.handle_wallet_event(&WalletEvent::ChainChanged(1));
        let err = orchestrator
            .create_project(ProjectDraft {
                name: "Wind".to_string(),
                description: String::new(),
                funding_goal: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidInput(_)));

        let change = orchestrator.handle_wallet_event(&WalletEvent::AccountsChanged(vec![]));
        assert_eq!(change, SessionChange::Disconnected);
        assert_eq!(orchestrator.presenter().wallet_events.len(), 3);
    }
}
