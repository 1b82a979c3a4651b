//! Write requests accepted by the mirror

use alloy::primitives::U256;

use crate::amount::parse_amount;
use crate::error::{MirrorError, Result};

pub const PROJECT_REQUIRED: &str = "Missing required fields: id, owner, name";
pub const STAKE_REQUIRED: &str = "Missing required fields: project_id, staker, amount";
pub const WITHDRAWAL_REQUIRED: &str = "Missing required fields: project_id, withdrawer, amount";

/// Addresses are compared case-insensitively
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Project creation fact reported by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    /// Seed funds in wei, zero when omitted
    pub funds: Option<String>,
    pub milestone_reached: bool,
    pub tx_hash: Option<String>,
    pub block_number: Option<i64>,
    /// Funding goal in wei, zero when omitted
    pub funding_goal: Option<String>,
}

impl NewProject {
    pub fn new(id: i64, owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            owner: owner.into(),
            name: name.into(),
            description: None,
            funds: None,
            milestone_reached: false,
            tx_hash: None,
            block_number: None,
            funding_goal: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_funding_goal(mut self, goal: impl Into<String>) -> Self {
        self.funding_goal = Some(goal.into());
        self
    }

    pub fn with_funds(mut self, funds: impl Into<String>) -> Self {
        self.funds = Some(funds.into());
        self
    }

    pub fn with_milestone_reached(mut self, reached: bool) -> Self {
        self.milestone_reached = reached;
        self
    }

    pub fn with_transaction(mut self, tx_hash: impl Into<String>, block_number: Option<i64>) -> Self {
        self.tx_hash = Some(tx_hash.into());
        self.block_number = block_number;
        self
    }

    /// Check required fields and parse `(funds, funding_goal)`
    pub fn validate(&self) -> Result<(U256, U256)> {
        if is_blank(&self.owner) || is_blank(&self.name) {
            return Err(MirrorError::validation(PROJECT_REQUIRED));
        }
        if self.id < 0 {
            return Err(MirrorError::validation(format!(
                "Project id must be non-negative, got {}",
                self.id
            )));
        }
        Ok((
            optional_amount(self.funds.as_deref())?,
            optional_amount(self.funding_goal.as_deref())?,
        ))
    }
}

/// Stake fact reported by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStake {
    pub project_id: i64,
    pub staker: String,
    /// Amount in wei
    pub amount: String,
    pub tx_hash: Option<String>,
    pub block_number: Option<i64>,
}

impl NewStake {
    pub fn new(project_id: i64, staker: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            project_id,
            staker: staker.into(),
            amount: amount.into(),
            tx_hash: None,
            block_number: None,
        }
    }

    pub fn with_transaction(mut self, tx_hash: impl Into<String>, block_number: Option<i64>) -> Self {
        self.tx_hash = Some(tx_hash.into());
        self.block_number = block_number;
        self
    }

    pub fn validate(&self) -> Result<U256> {
        if is_blank(&self.staker) || is_blank(&self.amount) {
            return Err(MirrorError::validation(STAKE_REQUIRED));
        }
        parse_amount(&self.amount)
    }
}

/// Withdrawal fact reported by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWithdrawal {
    pub project_id: i64,
    pub withdrawer: String,
    /// Amount in wei
    pub amount: String,
    /// Caller asserts the milestone was marked alongside this withdrawal
    pub milestone_marked: bool,
    pub tx_hash: Option<String>,
    pub block_number: Option<i64>,
}

impl NewWithdrawal {
    pub fn new(project_id: i64, withdrawer: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            project_id,
            withdrawer: withdrawer.into(),
            amount: amount.into(),
            milestone_marked: false,
            tx_hash: None,
            block_number: None,
        }
    }

    pub fn with_milestone_marked(mut self, marked: bool) -> Self {
        self.milestone_marked = marked;
        self
    }

    pub fn with_transaction(mut self, tx_hash: impl Into<String>, block_number: Option<i64>) -> Self {
        self.tx_hash = Some(tx_hash.into());
        self.block_number = block_number;
        self
    }

    pub fn validate(&self) -> Result<U256> {
        if is_blank(&self.withdrawer) || is_blank(&self.amount) {
            return Err(MirrorError::validation(WITHDRAWAL_REQUIRED));
        }
        parse_amount(&self.amount)
    }
}

fn optional_amount(raw: Option<&str>) -> Result<U256> {
    match raw {
        Some(value) if !is_blank(value) => parse_amount(value),
        _ => Ok(U256::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address("  0xAbCd  "), "0xabcd");
    }

    #[test]
    fn test_project_requires_owner_and_name() {
        let missing_name = NewProject::new(1, "0xaa", "  ");
        let err = missing_name.validate().unwrap_err();
        assert_eq!(err.to_string(), PROJECT_REQUIRED);

        let missing_owner = NewProject::new(1, "", "Solar");
        assert!(matches!(
            missing_owner.validate(),
            Err(MirrorError::Validation(_))
        ));
    }

    #[test]
    fn test_project_defaults_amounts_to_zero() {
        let (funds, goal) = NewProject::new(1, "0xaa", "Solar").validate().unwrap();
        assert_eq!(funds, U256::ZERO);
        assert_eq!(goal, U256::ZERO);

        let (_, goal) = NewProject::new(1, "0xaa", "Solar")
            .with_funding_goal("1000")
            .validate()
            .unwrap();
        assert_eq!(goal, U256::from(1000u64));
    }

    #[test]
    fn test_project_rejects_fractional_goal() {
        let project = NewProject::new(1, "0xaa", "Solar").with_funding_goal("1.5");
        assert!(matches!(
            project.validate(),
            Err(MirrorError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_stake_requires_amount() {
        let stake = NewStake::new(1, "0xbb", "");
        assert_eq!(stake.validate().unwrap_err().to_string(), STAKE_REQUIRED);
    }

    #[test]
    fn test_withdrawal_parses_amount() {
        let withdrawal = NewWithdrawal::new(1, "0xaa", "0x3e8").with_milestone_marked(true);
        assert_eq!(withdrawal.validate().unwrap(), U256::from(1000u64));
    }
}
