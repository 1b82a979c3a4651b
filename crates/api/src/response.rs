//! Success envelope: `{"success": true, ...payload}`

use axum::Json;
use axum::response::{IntoResponse, Response};
use mirror::entity::{stakes, withdrawals};
use mirror::{
    Activity, PlatformStats, ProjectSummary, StakeWithProject, UserStats, WithdrawalWithProject,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            payload,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSaved {
    pub message: &'static str,
    pub project_id: i64,
    pub created: bool,
    pub milestone_reached: bool,
}

#[derive(Debug, Serialize)]
pub struct StakeSaved {
    pub message: &'static str,
    pub funds: String,
    pub milestone_reached: bool,
    pub newly_reached: bool,
}

#[derive(Debug, Serialize)]
pub struct WithdrawalSaved {
    pub message: &'static str,
    pub milestone_reached: bool,
}

#[derive(Debug, Serialize)]
pub struct Projects {
    pub projects: Vec<ProjectSummary>,
}

#[derive(Debug, Serialize)]
pub struct SingleProject {
    pub project: ProjectSummary,
}

#[derive(Debug, Serialize)]
pub struct ProjectStakes {
    pub stakes: Vec<stakes::Model>,
}

#[derive(Debug, Serialize)]
pub struct UserStakes {
    pub stakes: Vec<StakeWithProject>,
}

#[derive(Debug, Serialize)]
pub struct ProjectWithdrawals {
    pub withdrawals: Vec<withdrawals::Model>,
}

#[derive(Debug, Serialize)]
pub struct UserWithdrawals {
    pub withdrawals: Vec<WithdrawalWithProject>,
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub stats: PlatformStats,
}

#[derive(Debug, Serialize)]
pub struct UserStatsBody {
    pub stats: UserStats,
}

#[derive(Debug, Serialize)]
pub struct Activities {
    pub activities: Vec<Activity>,
}
