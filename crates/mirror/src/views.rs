//! Read models returned by the mirror

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{projects, stakes, withdrawals};
use crate::milestone::MilestoneOutcome;

/// Project row with aggregates over its stakes and withdrawals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: projects::Model,
    pub total_staked: String,
    /// Distinct staker addresses
    pub staker_count: u64,
    pub withdrawal_count: u64,
    pub total_withdrawn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeWithProject {
    #[serde(flatten)]
    pub stake: stakes::Model,
    pub project_name: Option<String>,
    pub project_owner: Option<String>,
    pub project_milestone_reached: Option<bool>,
    pub project_funding_goal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalWithProject {
    #[serde(flatten)]
    pub withdrawal: withdrawals::Model,
    pub project_name: Option<String>,
    pub project_owner: Option<String>,
}

/// Platform-wide totals; amounts are wei decimal strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_projects: u64,
    /// Projects still below their milestone
    pub active_projects: u64,
    pub completed_projects: u64,
    pub total_stakes: u64,
    pub total_funds_raised: String,
    pub total_funding_goal: String,
    /// Percentage with two decimals, `"0"` when no goal is set
    pub funding_progress: String,
    pub total_withdrawals: u64,
    pub total_withdrawn: String,
    /// Raised minus withdrawn, may be negative
    pub net_funds: String,
    pub unique_investors: u64,
    pub avg_investment: String,
}

/// Totals for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_projects: u64,
    pub active_projects: u64,
    pub total_investments: u64,
    pub total_invested: String,
    pub total_withdrawals: u64,
    pub total_withdrawn: String,
    pub net_contribution: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Stake,
    Withdrawal,
    ProjectCreated,
}

/// One entry of the recent activity feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub activity_type: ActivityKind,
    pub project_id: i64,
    pub project_name: Option<String>,
    pub actor: String,
    /// Wei amount; absent for project creation
    pub amount: Option<String>,
    pub description: String,
    pub tx_hash: Option<String>,
    pub block_number: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

/// Result of a milestone check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneReport {
    pub project_id: i64,
    pub milestone_reached: bool,
    pub newly_reached: bool,
    pub current_funds: String,
    pub funding_goal: String,
    /// Percentage in `0..=100`
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub project: projects::Model,
    pub created: bool,
    pub milestone: MilestoneOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeRecorded {
    pub stake: stakes::Model,
    /// Project funds after recomputation
    pub funds: String,
    pub milestone: MilestoneOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRecorded {
    pub withdrawal: withdrawals::Model,
    pub milestone_reached: bool,
}
