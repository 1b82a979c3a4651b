//! Reconciliation endpoint handlers
//!
//! Every handler returns either a success envelope or an [`ApiError`], which
//! renders as `{"success": false, "error": ...}` with the matching status code.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ApiError, ENDPOINT_NOT_FOUND, Result};
use crate::requests::{ProjectRequest, StakeRequest, WithdrawalRequest};
use crate::response::{
    Activities, Envelope, Health, ProjectSaved, ProjectStakes, ProjectWithdrawals, Projects,
    SingleProject, StakeSaved, Stats, UserStakes, UserStatsBody, UserWithdrawals,
    WithdrawalSaved,
};
use crate::state::AppState;
use mirror::MilestoneReport;

pub const DEFAULT_ACTIVITY_LIMIT: u64 = 20;
pub const MAX_ACTIVITY_LIMIT: u64 = 100;

fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::validation(format!("Invalid project id: {}", raw)))
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

fn record_milestone(newly_reached: bool) {
    if newly_reached {
        monitoring::record_milestone_reached();
    }
}

pub async fn health() -> Envelope<Health> {
    Envelope::ok(Health {
        status: "OK",
        message: "GreenFi API is running",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub async fn check_milestone(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Envelope<MilestoneReport>> {
    let report = state.db.check_milestone(parse_id(&project_id)?).await?;
    record_milestone(report.newly_reached);
    Ok(Envelope::ok(report))
}

pub async fn save_project(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProjectRequest>, JsonRejection>,
) -> Result<Envelope<ProjectSaved>> {
    let record = json_body(payload)?.into_record()?;
    let outcome = state.db.upsert_project(record).await?;

    monitoring::record_mirror_write("project");
    record_milestone(outcome.milestone.is_newly_reached());

    Ok(Envelope::ok(ProjectSaved {
        message: "Project saved successfully",
        project_id: outcome.project.id,
        created: outcome.created,
        milestone_reached: outcome.project.milestone_reached,
    }))
}

pub async fn list_projects(State(state): State<AppState>) -> Result<Envelope<Projects>> {
    let projects = state.db.list_projects().await?;
    debug!("Fetched {} projects", projects.len());
    Ok(Envelope::ok(Projects { projects }))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<SingleProject>> {
    let project = state.db.get_project(parse_id(&id)?).await?;
    Ok(Envelope::ok(SingleProject { project }))
}

pub async fn projects_by_owner(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Envelope<Projects>> {
    let projects = state.db.list_projects_by_owner(&address).await?;
    Ok(Envelope::ok(Projects { projects }))
}

pub async fn search_projects(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Envelope<Projects>> {
    let projects = state.db.search_projects(&query).await?;
    info!("🔍 Found {} projects for search: {:?}", projects.len(), query);
    Ok(Envelope::ok(Projects { projects }))
}

pub async fn save_stake(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StakeRequest>, JsonRejection>,
) -> Result<Envelope<StakeSaved>> {
    let record = json_body(payload)?.into_record()?;
    let recorded = state.db.record_stake(record).await?;

    monitoring::record_mirror_write("stake");
    record_milestone(recorded.milestone.is_newly_reached());

    Ok(Envelope::ok(StakeSaved {
        message: "Stake recorded successfully",
        funds: recorded.funds,
        milestone_reached: recorded.milestone.is_reached(),
        newly_reached: recorded.milestone.is_newly_reached(),
    }))
}

pub async fn stakes_by_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<ProjectStakes>> {
    let stakes = state.db.list_stakes_by_project(parse_id(&id)?).await?;
    Ok(Envelope::ok(ProjectStakes { stakes }))
}

pub async fn stakes_by_user(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Envelope<UserStakes>> {
    let stakes = state.db.list_stakes_by_staker(&address).await?;
    Ok(Envelope::ok(UserStakes { stakes }))
}

pub async fn save_withdrawal(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WithdrawalRequest>, JsonRejection>,
) -> Result<Envelope<WithdrawalSaved>> {
    let record = json_body(payload)?.into_record()?;
    let recorded = state.db.record_withdrawal(record).await?;

    monitoring::record_mirror_write("withdrawal");

    Ok(Envelope::ok(WithdrawalSaved {
        message: "Withdrawal recorded successfully",
        milestone_reached: recorded.milestone_reached,
    }))
}

pub async fn withdrawals_by_user(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Envelope<UserWithdrawals>> {
    let withdrawals = state.db.list_withdrawals_by_withdrawer(&address).await?;
    Ok(Envelope::ok(UserWithdrawals { withdrawals }))
}

pub async fn withdrawals_by_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<ProjectWithdrawals>> {
    let withdrawals = state.db.list_withdrawals_by_project(parse_id(&id)?).await?;
    Ok(Envelope::ok(ProjectWithdrawals { withdrawals }))
}

pub async fn platform_stats(State(state): State<AppState>) -> Result<Envelope<Stats>> {
    let stats = state.db.platform_stats().await?;
    Ok(Envelope::ok(Stats { stats }))
}

pub async fn user_stats(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Envelope<UserStatsBody>> {
    let stats = state.db.user_stats(&address).await?;
    Ok(Envelope::ok(UserStatsBody { stats }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<String>,
}

impl ActivityQuery {
    /// Requested limit, falling back to the default when absent or unparsable
    pub fn effective_limit(&self) -> u64 {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
            .min(MAX_ACTIVITY_LIMIT)
    }
}

pub async fn recent_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Envelope<Activities>> {
    let activities = state.db.recent_activity(query.effective_limit()).await?;
    info!("📈 Fetched {} recent activities", activities.len());
    Ok(Envelope::ok(Activities { activities }))
}

/// Fallback for unknown `/api/*` paths
pub async fn api_not_found() -> ApiError {
    ApiError::NotFound(ENDPOINT_NOT_FOUND.to_string())
}
