//! GreenFi ledger mirror
//!
//! Keeps an off-chain copy of projects, stakes and withdrawals reported by clients
//! after on-chain confirmation. Project funds are always recomputed from the stake
//! rows, and the milestone flag is a one-way latch.

pub mod amount;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod milestone;
pub mod records;
pub mod schema;
pub mod views;

pub use config::MirrorConfig;
pub use database::MirrorDatabase;
pub use error::{MirrorError, Result};
pub use milestone::MilestoneOutcome;
pub use records::{NewProject, NewStake, NewWithdrawal};
pub use views::{
    Activity, ActivityKind, MilestoneReport, PlatformStats, ProjectSummary, StakeRecorded,
    StakeWithProject, UpsertOutcome, UserStats, WithdrawalRecorded, WithdrawalWithProject,
};
