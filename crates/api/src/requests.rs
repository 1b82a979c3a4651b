//! Request bodies accepted by the write endpoints
//!
//! The browser client sends ids, block numbers and wei amounts either as JSON
//! numbers or as decimal strings, so every numeric field accepts both.

use mirror::records::{PROJECT_REQUIRED, STAKE_REQUIRED, WITHDRAWAL_REQUIRED};
use mirror::{NewProject, NewStake, NewWithdrawal};
use serde::Deserialize;

use crate::error::{ApiError, Result};

/// A JSON number or a string holding one
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(serde_json::Number),
    Text(String),
}

impl Numeric {
    fn as_i64(&self, field: &str) -> Result<i64> {
        let parsed = match self {
            Numeric::Number(n) => n.as_i64(),
            Numeric::Text(s) => s.trim().parse::<i64>().ok(),
        };
        parsed.ok_or_else(|| ApiError::validation(format!("Invalid {}: expected an integer", field)))
    }

    /// Raw text of an amount; range and format are checked by the mirror.
    /// JSON numbers past u64 arrive as floats and would lose precision.
    fn as_amount(&self, field: &str) -> Result<String> {
        match self {
            Numeric::Number(n) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
            Numeric::Number(n) => Err(ApiError::validation(format!(
                "Invalid {}: {} is not an integer wei amount; amounts above 2^64 must be sent as decimal strings",
                field, n
            ))),
            Numeric::Text(s) => Ok(s.trim().to_string()),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Numeric::Text(s) if s.trim().is_empty())
    }
}

fn optional_i64(value: Option<&Numeric>, field: &str) -> Result<Option<i64>> {
    match value {
        Some(v) if !v.is_blank() => v.as_i64(field).map(Some),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectRequest {
    pub id: Option<Numeric>,
    pub owner: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub funds: Option<Numeric>,
    pub milestone_reached: Option<bool>,
    pub tx_hash: Option<String>,
    pub block_number: Option<Numeric>,
    #[serde(alias = "goal")]
    pub funding_goal: Option<Numeric>,
}

impl ProjectRequest {
    pub fn into_record(self) -> Result<NewProject> {
        let (Some(id), Some(owner), Some(name)) = (self.id.as_ref(), self.owner, self.name) else {
            return Err(ApiError::validation(PROJECT_REQUIRED));
        };
        if id.is_blank() {
            return Err(ApiError::validation(PROJECT_REQUIRED));
        }

        Ok(NewProject {
            id: id.as_i64("id")?,
            owner,
            name,
            description: self.description,
            funds: self
                .funds
                .as_ref()
                .map(|funds| funds.as_amount("funds"))
                .transpose()?,
            milestone_reached: self.milestone_reached.unwrap_or(false),
            tx_hash: self.tx_hash,
            block_number: optional_i64(self.block_number.as_ref(), "block_number")?,
            funding_goal: self
                .funding_goal
                .as_ref()
                .map(|goal| goal.as_amount("funding_goal"))
                .transpose()?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StakeRequest {
    pub project_id: Option<Numeric>,
    pub staker: Option<String>,
    pub amount: Option<Numeric>,
    pub tx_hash: Option<String>,
    pub block_number: Option<Numeric>,
}

impl StakeRequest {
    pub fn into_record(self) -> Result<NewStake> {
        let (Some(project_id), Some(staker), Some(amount)) =
            (self.project_id, self.staker, self.amount)
        else {
            return Err(ApiError::validation(STAKE_REQUIRED));
        };
        if project_id.is_blank() || staker.trim().is_empty() || amount.is_blank() {
            return Err(ApiError::validation(STAKE_REQUIRED));
        }

        Ok(NewStake {
            project_id: project_id.as_i64("project_id")?,
            staker,
            amount: amount.as_amount("amount")?,
            tx_hash: self.tx_hash,
            block_number: optional_i64(self.block_number.as_ref(), "block_number")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WithdrawalRequest {
    pub project_id: Option<Numeric>,
    pub withdrawer: Option<String>,
    pub amount: Option<Numeric>,
    #[serde(alias = "milestone_marked")]
    pub milestone: Option<bool>,
    pub tx_hash: Option<String>,
    pub block_number: Option<Numeric>,
}

impl WithdrawalRequest {
    pub fn into_record(self) -> Result<NewWithdrawal> {
        let (Some(project_id), Some(withdrawer), Some(amount)) =
            (self.project_id, self.withdrawer, self.amount)
        else {
            return Err(ApiError::validation(WITHDRAWAL_REQUIRED));
        };
        if project_id.is_blank() || withdrawer.trim().is_empty() || amount.is_blank() {
            return Err(ApiError::validation(WITHDRAWAL_REQUIRED));
        }

        Ok(NewWithdrawal {
            project_id: project_id.as_i64("project_id")?,
            withdrawer,
            amount: amount.as_amount("amount")?,
            milestone_marked: self.milestone.unwrap_or(false),
            tx_hash: self.tx_hash,
            block_number: optional_i64(self.block_number.as_ref(), "block_number")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_accepts_string_id_and_goal_alias() {
        let request: ProjectRequest = serde_json::from_value(json!({
            "id": "12",
            "owner": "0xAA",
            "name": "Reforestation",
            "goal": "5000000000000000000",
            "block_number": 77
        }))
        .unwrap();

        let record = request.into_record().unwrap();
        assert_eq!(record.id, 12);
        assert_eq!(record.funding_goal.as_deref(), Some("5000000000000000000"));
        assert_eq!(record.block_number, Some(77));
        assert!(!record.milestone_reached);
    }

    #[test]
    fn test_project_missing_fields() {
        let request: ProjectRequest =
            serde_json::from_value(json!({"owner": "0xAA", "name": "x"})).unwrap();
        let err = request.into_record().unwrap_err();
        assert_eq!(err.public_message(), PROJECT_REQUIRED);
    }

    #[test]
    fn test_project_id_zero_is_present() {
        let request: ProjectRequest =
            serde_json::from_value(json!({"id": 0, "owner": "0xAA", "name": "x"})).unwrap();
        assert_eq!(request.into_record().unwrap().id, 0);
    }

    #[test]
    fn test_stake_numeric_amount() {
        let request: StakeRequest = serde_json::from_value(json!({
            "project_id": 3,
            "staker": "0xBB",
            "amount": 1000
        }))
        .unwrap();
        let record = request.into_record().unwrap();
        assert_eq!(record.project_id, 3);
        assert_eq!(record.amount, "1000");
    }

    #[test]
    fn test_amount_beyond_u64_must_be_a_string() {
        let request: StakeRequest = serde_json::from_str(
            r#"{"project_id": 3, "staker": "0xBB", "amount": 5000000000000000000000}"#,
        )
        .unwrap();
        let err = request.into_record().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(err.public_message().contains("must be sent as decimal strings"));

        let request: ProjectRequest = serde_json::from_value(json!({
            "id": 1,
            "owner": "0xAA",
            "name": "x",
            "funding_goal": 2.5
        }))
        .unwrap();
        let err = request.into_record().unwrap_err();
        assert!(err.public_message().starts_with("Invalid funding_goal"));

        let request: StakeRequest = serde_json::from_value(json!({
            "project_id": 3,
            "staker": "0xBB",
            "amount": "5000000000000000000000"
        }))
        .unwrap();
        assert_eq!(request.into_record().unwrap().amount, "5000000000000000000000");
    }

    #[test]
    fn test_stake_missing_amount() {
        let request: StakeRequest =
            serde_json::from_value(json!({"project_id": 3, "staker": "0xBB"})).unwrap();
        assert_eq!(
            request.into_record().unwrap_err().public_message(),
            STAKE_REQUIRED
        );
    }

    #[test]
    fn test_withdrawal_milestone_alias() {
        let request: WithdrawalRequest = serde_json::from_value(json!({
            "project_id": "3",
            "withdrawer": "0xAA",
            "amount": "10",
            "milestone_marked": true
        }))
        .unwrap();
        assert!(request.into_record().unwrap().milestone_marked);
    }

    #[test]
    fn test_non_integer_project_id() {
        let request: WithdrawalRequest = serde_json::from_value(json!({
            "project_id": "abc",
            "withdrawer": "0xAA",
            "amount": "10"
        }))
        .unwrap();
        let err = request.into_record().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
