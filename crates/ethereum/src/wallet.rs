//! Wallet session bookkeeping and the presentation seam
//!
//! Nothing here talks to the mirror; the presenter only sees flow states and
//! wallet events.

use alloy::primitives::Address;
use tracing::{info, warn};

use crate::flow::{ActionKind, FlowState};

/// Events a wallet provider emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    Connected { account: Address, chain_id: u64 },
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
    Disconnected,
}

/// What the session did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    Connected(Address),
    AccountSwitched(Address),
    Disconnected,
    ReloadRequired,
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct WalletSession {
    account: Option<Address>,
    chain_id: Option<u64>,
    reload_required: bool,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    /// Set after a chain switch; contract handles must be rebuilt
    pub fn reload_required(&self) -> bool {
        self.reload_required
    }

    pub fn apply(&mut self, event: &WalletEvent) -> SessionChange {
        match event {
            WalletEvent::Connected { account, chain_id } => {
                self.account = Some(*account);
                self.chain_id = Some(*chain_id);
                self.reload_required = false;
                SessionChange::Connected(*account)
            }
            WalletEvent::AccountsChanged(accounts) => match accounts.first() {
                None => self.disconnect(),
                Some(account) if self.account == Some(*account) => SessionChange::Unchanged,
                Some(account) => {
                    self.account = Some(*account);
                    SessionChange::AccountSwitched(*account)
                }
            },
            WalletEvent::ChainChanged(chain_id) => {
                if self.chain_id == Some(*chain_id) {
                    return SessionChange::Unchanged;
                }
                self.chain_id = Some(*chain_id);
                self.reload_required = true;
                SessionChange::ReloadRequired
            }
            WalletEvent::Disconnected => self.disconnect(),
        }
    }

    fn disconnect(&mut self) -> SessionChange {
        if self.account.is_none() {
            return SessionChange::Unchanged;
        }
        self.account = None;
        self.chain_id = None;
        self.reload_required = false;
        SessionChange::Disconnected
    }
}

/// `0x1234...abcd`
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Rendering surface for action progress and wallet changes
pub trait PresentationAdapter: Send {
    fn render_frame(&mut self, action: ActionKind, state: &FlowState);
    fn on_wallet_event(&mut self, event: &WalletEvent);
}

/// Presenter that writes progress to the log
#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl PresentationAdapter for ConsolePresenter {
    fn render_frame(&mut self, action: ActionKind, state: &FlowState) {
        match state {
            FlowState::Idle => {}
            FlowState::AwaitingWalletConfirmation => {
                info!("⏳ {}: please confirm the transaction", action)
            }
            FlowState::AwaitingBlockConfirmation { tx_hash } => {
                info!("⏳ {}: transaction sent {}", action, tx_hash)
            }
            FlowState::PersistingToMirror(tx) => {
                info!("💾 {}: confirmed in block {:?}, saving to mirror", action, tx.block_number)
            }
            FlowState::Done(tx) => info!("✅ {} complete: {}", action, tx.tx_hash),
            FlowState::Failed {
                reason,
                confirmed: Some(tx),
            } => warn!(
                "⚠️ {} confirmed on-chain ({}) but not saved to mirror: {}",
                action, tx.tx_hash, reason
            ),
            FlowState::Failed {
                reason,
                confirmed: None,
            } => warn!("❌ {} failed: {}", action, reason),
        }
    }

    fn on_wallet_event(&mut self, event: &WalletEvent) {
        match event {
            WalletEvent::Connected { account, chain_id } => {
                info!("🔗 Connected {} on chain {}", short_address(account), chain_id)
            }
            WalletEvent::AccountsChanged(accounts) => match accounts.first() {
                Some(account) => info!("🔄 Account changed to {}", short_address(account)),
                None => info!("Wallet disconnected"),
            },
            WalletEvent::ChainChanged(chain_id) => info!("🔄 Chain changed to {}", chain_id),
            WalletEvent::Disconnected => info!("Wallet disconnected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

    #[test]
    fn test_account_switch_and_empty_list_disconnects() {
        let mut session = WalletSession::new();
        assert_eq!(
            session.apply(&WalletEvent::Connected {
                account: ALICE,
                chain_id: 31337
            }),
            SessionChange::Connected(ALICE)
        );
        assert_eq!(
            session.apply(&WalletEvent::AccountsChanged(vec![ALICE])),
            SessionChange::Unchanged
        );
        assert_eq!(
            session.apply(&WalletEvent::AccountsChanged(vec![BOB, ALICE])),
            SessionChange::AccountSwitched(BOB)
        );
        assert_eq!(session.account(), Some(BOB));

        assert_eq!(
            session.apply(&WalletEvent::AccountsChanged(vec![])),
            SessionChange::Disconnected
        );
        assert!(!session.is_connected());
        assert_eq!(session.apply(&WalletEvent::Disconnected), SessionChange::Unchanged);
    }

    #[test]
    fn test_chain_change_requires_reload() {
        let mut session = WalletSession::new();
        session.apply(&WalletEvent::Connected {
            account: ALICE,
            chain_id: 1,
        });
        assert_eq!(session.apply(&WalletEvent::ChainChanged(1)), SessionChange::Unchanged);
        assert!(!session.reload_required());

        assert_eq!(
            session.apply(&WalletEvent::ChainChanged(11155111)),
            SessionChange::ReloadRequired
        );
        assert!(session.reload_required());
        assert_eq!(session.chain_id(), Some(11155111));
    }

    #[test]
    fn test_short_address() {
        assert_eq!(short_address(&ALICE), "0xf39F...2266");
    }
}
