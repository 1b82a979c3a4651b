//! Milestone evaluation
//!
//! A project reaches its milestone once mirrored funds are at least its funding goal.
//! The flag is a latch: once set it never returns to false, whatever happens to funds.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Result of re-evaluating a project's milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneOutcome {
    /// The threshold was crossed by this evaluation
    NewlyReached,
    /// The latch was already set
    AlreadyReached,
    NotReached,
}

impl MilestoneOutcome {
    pub fn is_reached(self) -> bool {
        !matches!(self, MilestoneOutcome::NotReached)
    }

    pub fn is_newly_reached(self) -> bool {
        matches!(self, MilestoneOutcome::NewlyReached)
    }
}

/// Decide the milestone state for `funds` against `goal`.
///
/// A zero goal never reaches the milestone on its own; only the latch or a
/// caller-asserted withdrawal can set it.
pub fn evaluate(funds: U256, goal: U256, already_reached: bool) -> MilestoneOutcome {
    if already_reached {
        MilestoneOutcome::AlreadyReached
    } else if !goal.is_zero() && funds >= goal {
        MilestoneOutcome::NewlyReached
    } else {
        MilestoneOutcome::NotReached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossing_threshold() {
        let goal = U256::from(1000u64);
        assert_eq!(
            evaluate(U256::from(600u64), goal, false),
            MilestoneOutcome::NotReached
        );
        assert_eq!(
            evaluate(U256::from(1000u64), goal, false),
            MilestoneOutcome::NewlyReached
        );
        assert_eq!(
            evaluate(U256::from(1500u64), goal, false),
            MilestoneOutcome::NewlyReached
        );
    }

    #[test]
    fn test_latch_survives_lower_funds() {
        let outcome = evaluate(U256::ZERO, U256::from(1000u64), true);
        assert_eq!(outcome, MilestoneOutcome::AlreadyReached);
        assert!(outcome.is_reached());
        assert!(!outcome.is_newly_reached());
    }

    #[test]
    fn test_zero_goal_never_reached() {
        assert_eq!(
            evaluate(U256::from(5u64), U256::ZERO, false),
            MilestoneOutcome::NotReached
        );
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let json = serde_json::to_string(&MilestoneOutcome::NewlyReached).unwrap();
        assert_eq!(json, "\"newly_reached\"");
    }
}
