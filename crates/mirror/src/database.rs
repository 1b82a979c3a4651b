//! Mirror database: connection handling, writes that keep derived fields consistent,
//! and the read queries behind the reconciliation API

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use alloy::primitives::U256;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectOptions, ConnectionTrait,
    Database as SeaOrmDatabase, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};
use tracing::{debug, error, info, warn};

use crate::amount::{
    average, format_ether, parse_stored_amount, progress_label, progress_percent,
    signed_difference, sum_amounts,
};
use crate::config::MirrorConfig;
use crate::entity::{projects, stakes, withdrawals};
use crate::error::{MirrorError, Result};
use crate::milestone::{self, MilestoneOutcome};
use crate::records::{normalize_address, NewProject, NewStake, NewWithdrawal};
use crate::schema;
use crate::views::{
    Activity, ActivityKind, MilestoneReport, PlatformStats, ProjectSummary, StakeRecorded,
    StakeWithProject, UpsertOutcome, UserStats, WithdrawalRecorded, WithdrawalWithProject,
};

/// Decimals shown in activity descriptions
const ACTIVITY_PRECISION: usize = 4;

/// Attempts for a write that loses a lock race (busy database, deadlock victim)
const MAX_WRITE_ATTEMPTS: u32 = 5;
const WRITE_RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

fn short(address: &str) -> &str {
    address.get(..6).unwrap_or(address)
}

/// Pooled connection to the mirror tables
pub struct MirrorDatabase {
    connection: DatabaseConnection,
}

impl MirrorDatabase {
    /// Connect with bounded retries
    pub async fn new(database_url: &str, config: &MirrorConfig) -> Result<Self> {
        config.validate().map_err(MirrorError::Validation)?;
        info!("Connecting to mirror database...");

        let mut attempts = 0;
        loop {
            attempts += 1;

            let mut opt = ConnectOptions::new(database_url.to_string());
            opt.max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .connect_timeout(config.connect_timeout)
                .acquire_timeout(config.acquire_timeout)
                .idle_timeout(config.idle_timeout)
                .sqlx_logging(config.sqlx_logging);

            match SeaOrmDatabase::connect(opt).await {
                Ok(connection) => {
                    info!(
                        "✅ Connected to mirror database (pool max: {}, min: {})",
                        config.max_connections, config.min_connections
                    );
                    return Ok(Self { connection });
                }
                Err(e) if attempts < config.connect_attempts => {
                    warn!(
                        "Failed to connect to mirror database (attempt {}/{}): {}",
                        attempts, config.connect_attempts, e
                    );
                    tokio::time::sleep(config.retry_delay).await;
                }
                Err(e) => {
                    error!(
                        "Failed to connect to mirror database after {} attempts",
                        config.connect_attempts
                    );
                    return Err(MirrorError::Persistence(e));
                }
            }
        }
    }

    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Create tables and indexes if missing
    pub async fn init_schema(&self) -> Result<()> {
        schema::create_schema(&self.connection).await
    }

    pub async fn health_check(&self) -> Result<()> {
        self.connection.ping().await?;
        Ok(())
    }

    /// Close the underlying pool
    pub async fn close(&self) -> Result<()> {
        self.connection.clone().close().await?;
        info!("Mirror database connection closed");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------------

    /// Insert a project, or refresh funds, goal and milestone of an existing one.
    ///
    /// Identity columns (owner, name, description, creation tx) are never overwritten.
    /// The milestone column is OR-ed with the stored value.
    pub async fn upsert_project(&self, input: NewProject) -> Result<UpsertOutcome> {
        let (funds, goal) = input.validate()?;
        self.retry_on_contention("upsert project", || self.upsert_project_once(&input, funds, goal))
            .await
    }

    async fn upsert_project_once(
        &self,
        input: &NewProject,
        funds: U256,
        goal: U256,
    ) -> Result<UpsertOutcome> {
        let now = Utc::now();

        let txn = self.connection.begin().await?;
        let existing = lock_project(&txn, input.id).await?;

        let (project, created) = match existing {
            Some(current) => {
                let latched = current.milestone_reached || input.milestone_reached;
                let mut active: projects::ActiveModel = current.into();
                active.funds = Set(funds.to_string());
                active.funding_goal = Set(goal.to_string());
                active.milestone_reached = Set(latched);
                active.updated_at = Set(now);
                (active.update(&txn).await?, false)
            }
            None => {
                let active = projects::ActiveModel {
                    id: Set(input.id),
                    owner: Set(normalize_address(&input.owner)),
                    name: Set(input.name.trim().to_string()),
                    description: Set(input.description.clone()),
                    funds: Set(funds.to_string()),
                    milestone_reached: Set(input.milestone_reached),
                    tx_hash: Set(input.tx_hash.clone()),
                    funding_goal: Set(goal.to_string()),
                    block_number: Set(input.block_number),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                (active.insert(&txn).await?, true)
            }
        };

        let (project, milestone) = recheck_milestone(&txn, project).await?;
        txn.commit().await?;

        info!(
            "📝 Project {} {} (owner: {}..., goal: {})",
            project.id,
            if created { "created" } else { "updated" },
            short(&project.owner),
            project.funding_goal
        );

        Ok(UpsertOutcome {
            project,
            created,
            milestone,
        })
    }

    /// Append a stake and recompute the project's funds from all of its stakes
    pub async fn record_stake(&self, input: NewStake) -> Result<StakeRecorded> {
        let amount = input.validate()?;
        self.retry_on_contention("record stake", || self.record_stake_once(&input, amount))
            .await
    }

    async fn record_stake_once(&self, input: &NewStake, amount: U256) -> Result<StakeRecorded> {
        let txn = self.connection.begin().await?;
        let project = lock_project(&txn, input.project_id)
            .await?
            .ok_or(MirrorError::ProjectNotFound(input.project_id))?;

        let stake = stakes::ActiveModel {
            project_id: Set(project.id),
            staker: Set(normalize_address(&input.staker)),
            amount: Set(amount.to_string()),
            tx_hash: Set(input.tx_hash.clone()),
            block_number: Set(input.block_number),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let amounts: Vec<String> = stakes::Entity::find()
            .select_only()
            .column(stakes::Column::Amount)
            .filter(stakes::Column::ProjectId.eq(project.id))
            .into_tuple()
            .all(&txn)
            .await?;
        let funds = sum_amounts(amounts.iter().map(String::as_str))?;

        let mut active: projects::ActiveModel = project.into();
        active.funds = Set(funds.to_string());
        active.updated_at = Set(Utc::now());
        let project = active.update(&txn).await?;

        let (project, milestone) = recheck_milestone(&txn, project).await?;
        txn.commit().await?;

        info!(
            "💰 Stake {} on project {} by {}... (funds now {})",
            stake.amount,
            project.id,
            short(&stake.staker),
            project.funds
        );

        Ok(StakeRecorded {
            stake,
            funds: project.funds,
            milestone,
        })
    }

    /// Append a withdrawal; a caller-asserted milestone latches the project flag
    pub async fn record_withdrawal(&self, input: NewWithdrawal) -> Result<WithdrawalRecorded> {
        let amount = input.validate()?;
        self.retry_on_contention("record withdrawal", || {
            self.record_withdrawal_once(&input, amount)
        })
        .await
    }

    async fn record_withdrawal_once(
        &self,
        input: &NewWithdrawal,
        amount: U256,
    ) -> Result<WithdrawalRecorded> {
        let txn = self.connection.begin().await?;
        let project = lock_project(&txn, input.project_id)
            .await?
            .ok_or(MirrorError::ProjectNotFound(input.project_id))?;

        let mut milestone_reached = project.milestone_reached;
        if input.milestone_marked && !milestone_reached {
            let mut active: projects::ActiveModel = project.into();
            active.milestone_reached = Set(true);
            active.updated_at = Set(Utc::now());
            active.update(&txn).await?;
            milestone_reached = true;
            debug!("Milestone asserted by withdrawal on project {}", input.project_id);
        }

        let withdrawal = withdrawals::ActiveModel {
            project_id: Set(input.project_id),
            withdrawer: Set(normalize_address(&input.withdrawer)),
            amount: Set(amount.to_string()),
            milestone_marked: Set(input.milestone_marked),
            tx_hash: Set(input.tx_hash.clone()),
            block_number: Set(input.block_number),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(
            "💸 Withdrawal {} from project {} by {}...",
            withdrawal.amount,
            withdrawal.project_id,
            short(&withdrawal.withdrawer)
        );

        Ok(WithdrawalRecorded {
            withdrawal,
            milestone_reached,
        })
    }

    /// Run a write transaction, retrying with backoff while it loses lock races
    async fn retry_on_contention<T, F, Fut>(&self, operation: &str, mut write: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match write().await {
                Err(MirrorError::Persistence(e))
                    if attempt < MAX_WRITE_ATTEMPTS && is_lock_contention(&e) =>
                {
                    warn!(
                        "Lock contention on {}, retrying ({}/{}): {}",
                        operation, attempt, MAX_WRITE_ATTEMPTS, e
                    );
                    tokio::time::sleep(WRITE_RETRY_BASE_DELAY * attempt).await;
                }
                result => return result,
            }
        }
    }

    /// Re-run the milestone rule for one project and report its progress
    pub async fn check_milestone(&self, project_id: i64) -> Result<MilestoneReport> {
        let project = projects::Entity::find_by_id(project_id)
            .one(&self.connection)
            .await?
            .ok_or(MirrorError::ProjectNotFound(project_id))?;

        let (project, outcome) = recheck_milestone(&self.connection, project).await?;
        let funds = parse_stored_amount(&project.funds)?;
        let goal = parse_stored_amount(&project.funding_goal)?;

        Ok(MilestoneReport {
            project_id: project.id,
            milestone_reached: project.milestone_reached,
            newly_reached: outcome.is_newly_reached(),
            current_funds: project.funds,
            funding_goal: project.funding_goal,
            progress: progress_percent(funds, goal),
        })
    }

    // ---------------------------------------------------------------------
    // Project reads
    // ---------------------------------------------------------------------

    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let projects = projects::Entity::find()
            .order_by_desc(projects::Column::CreatedAt)
            .order_by_desc(projects::Column::Id)
            .all(&self.connection)
            .await?;
        self.summarize(projects).await
    }

    pub async fn get_project(&self, project_id: i64) -> Result<ProjectSummary> {
        let project = projects::Entity::find_by_id(project_id)
            .one(&self.connection)
            .await?
            .ok_or(MirrorError::ProjectNotFound(project_id))?;

        self.summarize(vec![project])
            .await?
            .pop()
            .ok_or(MirrorError::ProjectNotFound(project_id))
    }

    pub async fn list_projects_by_owner(&self, owner: &str) -> Result<Vec<ProjectSummary>> {
        let projects = projects::Entity::find()
            .filter(projects::Column::Owner.eq(normalize_address(owner)))
            .order_by_desc(projects::Column::CreatedAt)
            .order_by_desc(projects::Column::Id)
            .all(&self.connection)
            .await?;
        self.summarize(projects).await
    }

    /// Substring match on name, description or owner
    pub async fn search_projects(&self, query: &str) -> Result<Vec<ProjectSummary>> {
        let query = query.trim();
        let projects = projects::Entity::find()
            .filter(
                Condition::any()
                    .add(projects::Column::Name.contains(query))
                    .add(projects::Column::Description.contains(query))
                    .add(projects::Column::Owner.contains(query.to_ascii_lowercase())),
            )
            .order_by_desc(projects::Column::CreatedAt)
            .order_by_desc(projects::Column::Id)
            .all(&self.connection)
            .await?;

        debug!("Search {:?} matched {} projects", query, projects.len());
        self.summarize(projects).await
    }

    /// Attach stake and withdrawal aggregates; projects without activity get zeros
    async fn summarize(&self, projects: Vec<projects::Model>) -> Result<Vec<ProjectSummary>> {
        if projects.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = projects.iter().map(|p| p.id).collect();

        let stake_rows: Vec<(i64, String, String)> = stakes::Entity::find()
            .select_only()
            .column(stakes::Column::ProjectId)
            .column(stakes::Column::Staker)
            .column(stakes::Column::Amount)
            .filter(stakes::Column::ProjectId.is_in(ids.clone()))
            .into_tuple()
            .all(&self.connection)
            .await?;

        let withdrawal_rows: Vec<(i64, String)> = withdrawals::Entity::find()
            .select_only()
            .column(withdrawals::Column::ProjectId)
            .column(withdrawals::Column::Amount)
            .filter(withdrawals::Column::ProjectId.is_in(ids))
            .into_tuple()
            .all(&self.connection)
            .await?;

        #[derive(Default)]
        struct Totals<'a> {
            staked: U256,
            stakers: HashSet<&'a str>,
            withdrawals: u64,
            withdrawn: U256,
        }

        let overflow = || MirrorError::InvalidAmount("sum exceeds 256 bits".to_string());
        let mut totals: HashMap<i64, Totals> = HashMap::new();

        for (project_id, staker, amount) in &stake_rows {
            let entry = totals.entry(*project_id).or_default();
            entry.staked = entry
                .staked
                .checked_add(parse_stored_amount(amount)?)
                .ok_or_else(overflow)?;
            entry.stakers.insert(staker.as_str());
        }
        for (project_id, amount) in &withdrawal_rows {
            let entry = totals.entry(*project_id).or_default();
            entry.withdrawals += 1;
            entry.withdrawn = entry
                .withdrawn
                .checked_add(parse_stored_amount(amount)?)
                .ok_or_else(overflow)?;
        }

        Ok(projects
            .into_iter()
            .map(|project| {
                let t = totals.remove(&project.id).unwrap_or_default();
                ProjectSummary {
                    total_staked: t.staked.to_string(),
                    staker_count: t.stakers.len() as u64,
                    withdrawal_count: t.withdrawals,
                    total_withdrawn: t.withdrawn.to_string(),
                    project,
                }
            })
            .collect())
    }

    // ---------------------------------------------------------------------
    // Stake and withdrawal reads
    // ---------------------------------------------------------------------

    pub async fn list_stakes_by_project(&self, project_id: i64) -> Result<Vec<stakes::Model>> {
        Ok(stakes::Entity::find()
            .filter(stakes::Column::ProjectId.eq(project_id))
            .order_by_desc(stakes::Column::CreatedAt)
            .order_by_desc(stakes::Column::Id)
            .all(&self.connection)
            .await?)
    }

    pub async fn list_stakes_by_staker(&self, staker: &str) -> Result<Vec<StakeWithProject>> {
        let rows = stakes::Entity::find()
            .find_also_related(projects::Entity)
            .filter(stakes::Column::Staker.eq(normalize_address(staker)))
            .order_by_desc(stakes::Column::CreatedAt)
            .order_by_desc(stakes::Column::Id)
            .all(&self.connection)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(stake, project)| StakeWithProject {
                stake,
                project_name: project.as_ref().map(|p| p.name.clone()),
                project_owner: project.as_ref().map(|p| p.owner.clone()),
                project_milestone_reached: project.as_ref().map(|p| p.milestone_reached),
                project_funding_goal: project.map(|p| p.funding_goal),
            })
            .collect())
    }

    pub async fn list_withdrawals_by_project(
        &self,
        project_id: i64,
    ) -> Result<Vec<withdrawals::Model>> {
        Ok(withdrawals::Entity::find()
            .filter(withdrawals::Column::ProjectId.eq(project_id))
            .order_by_desc(withdrawals::Column::CreatedAt)
            .order_by_desc(withdrawals::Column::Id)
            .all(&self.connection)
            .await?)
    }

    pub async fn list_withdrawals_by_withdrawer(
        &self,
        withdrawer: &str,
    ) -> Result<Vec<WithdrawalWithProject>> {
        let rows = withdrawals::Entity::find()
            .find_also_related(projects::Entity)
            .filter(withdrawals::Column::Withdrawer.eq(normalize_address(withdrawer)))
            .order_by_desc(withdrawals::Column::CreatedAt)
            .order_by_desc(withdrawals::Column::Id)
            .all(&self.connection)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(withdrawal, project)| WithdrawalWithProject {
                withdrawal,
                project_name: project.as_ref().map(|p| p.name.clone()),
                project_owner: project.map(|p| p.owner),
            })
            .collect())
    }

    // ---------------------------------------------------------------------
    // Aggregates
    // ---------------------------------------------------------------------

    pub async fn platform_stats(&self) -> Result<PlatformStats> {
        let projects: Vec<(bool, String)> = projects::Entity::find()
            .select_only()
            .column(projects::Column::MilestoneReached)
            .column(projects::Column::FundingGoal)
            .into_tuple()
            .all(&self.connection)
            .await?;

        let stake_rows: Vec<(String, String)> = stakes::Entity::find()
            .select_only()
            .column(stakes::Column::Staker)
            .column(stakes::Column::Amount)
            .into_tuple()
            .all(&self.connection)
            .await?;

        let withdrawn_amounts: Vec<String> = withdrawals::Entity::find()
            .select_only()
            .column(withdrawals::Column::Amount)
            .into_tuple()
            .all(&self.connection)
            .await?;

        let completed = projects.iter().filter(|(reached, _)| *reached).count() as u64;
        let total_goal = sum_amounts(projects.iter().map(|(_, goal)| goal.as_str()))?;
        let raised = sum_amounts(stake_rows.iter().map(|(_, amount)| amount.as_str()))?;
        let withdrawn = sum_amounts(withdrawn_amounts.iter().map(String::as_str))?;
        let investors: HashSet<&str> = stake_rows.iter().map(|(s, _)| s.as_str()).collect();
        let total_stakes = stake_rows.len() as u64;

        Ok(PlatformStats {
            total_projects: projects.len() as u64,
            active_projects: projects.len() as u64 - completed,
            completed_projects: completed,
            total_stakes,
            total_funds_raised: raised.to_string(),
            total_funding_goal: total_goal.to_string(),
            funding_progress: progress_label(raised, total_goal),
            total_withdrawals: withdrawn_amounts.len() as u64,
            total_withdrawn: withdrawn.to_string(),
            net_funds: signed_difference(raised, withdrawn),
            unique_investors: investors.len() as u64,
            avg_investment: average(raised, total_stakes).to_string(),
        })
    }

    pub async fn user_stats(&self, address: &str) -> Result<UserStats> {
        let address = normalize_address(address);

        let owned: Vec<bool> = projects::Entity::find()
            .select_only()
            .column(projects::Column::MilestoneReached)
            .filter(projects::Column::Owner.eq(address.as_str()))
            .into_tuple()
            .all(&self.connection)
            .await?;

        let invested: Vec<String> = stakes::Entity::find()
            .select_only()
            .column(stakes::Column::Amount)
            .filter(stakes::Column::Staker.eq(address.as_str()))
            .into_tuple()
            .all(&self.connection)
            .await?;

        let withdrawn: Vec<String> = withdrawals::Entity::find()
            .select_only()
            .column(withdrawals::Column::Amount)
            .filter(withdrawals::Column::Withdrawer.eq(address.as_str()))
            .into_tuple()
            .all(&self.connection)
            .await?;

        let total_invested = sum_amounts(invested.iter().map(String::as_str))?;
        let total_withdrawn = sum_amounts(withdrawn.iter().map(String::as_str))?;

        Ok(UserStats {
            user_projects: owned.len() as u64,
            active_projects: owned.iter().filter(|reached| !**reached).count() as u64,
            total_investments: invested.len() as u64,
            total_invested: total_invested.to_string(),
            total_withdrawals: withdrawn.len() as u64,
            total_withdrawn: total_withdrawn.to_string(),
            net_contribution: signed_difference(total_invested, total_withdrawn),
        })
    }

    /// Newest stakes, withdrawals and project creations, merged by timestamp
    pub async fn recent_activity(&self, limit: u64) -> Result<Vec<Activity>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let stake_rows = stakes::Entity::find()
            .find_also_related(projects::Entity)
            .order_by_desc(stakes::Column::CreatedAt)
            .order_by_desc(stakes::Column::Id)
            .limit(limit)
            .all(&self.connection)
            .await?;

        let withdrawal_rows = withdrawals::Entity::find()
            .find_also_related(projects::Entity)
            .order_by_desc(withdrawals::Column::CreatedAt)
            .order_by_desc(withdrawals::Column::Id)
            .limit(limit)
            .all(&self.connection)
            .await?;

        let project_rows = projects::Entity::find()
            .order_by_desc(projects::Column::CreatedAt)
            .order_by_desc(projects::Column::Id)
            .limit(limit)
            .all(&self.connection)
            .await?;

        let mut activities = Vec::with_capacity(stake_rows.len() + withdrawal_rows.len() + project_rows.len());

        for (stake, project) in stake_rows {
            let amount = parse_stored_amount(&stake.amount)?;
            activities.push(Activity {
                activity_type: ActivityKind::Stake,
                project_id: stake.project_id,
                project_name: project.map(|p| p.name),
                actor: stake.staker,
                description: format!("Staked {} ETH", format_ether(amount, ACTIVITY_PRECISION)),
                amount: Some(stake.amount),
                tx_hash: stake.tx_hash,
                block_number: stake.block_number,
                timestamp: stake.created_at,
            });
        }

        for (withdrawal, project) in withdrawal_rows {
            let amount = parse_stored_amount(&withdrawal.amount)?;
            activities.push(Activity {
                activity_type: ActivityKind::Withdrawal,
                project_id: withdrawal.project_id,
                project_name: project.map(|p| p.name),
                actor: withdrawal.withdrawer,
                description: format!("Withdrew {} ETH", format_ether(amount, ACTIVITY_PRECISION)),
                amount: Some(withdrawal.amount),
                tx_hash: withdrawal.tx_hash,
                block_number: withdrawal.block_number,
                timestamp: withdrawal.created_at,
            });
        }

        for project in project_rows {
            activities.push(Activity {
                activity_type: ActivityKind::ProjectCreated,
                project_id: project.id,
                description: format!("Created project: {}", project.name),
                project_name: Some(project.name),
                actor: project.owner,
                amount: None,
                tx_hash: project.tx_hash,
                block_number: project.block_number,
                timestamp: project.created_at,
            });
        }

        // stable sort keeps stake, withdrawal, creation order on equal timestamps
        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        activities.truncate(limit as usize);
        Ok(activities)
    }
}

/// Read a project while holding the write lock on it for the rest of the transaction.
///
/// MySQL takes a `SELECT ... FOR UPDATE` row lock. SQLite has no row locks, so a
/// no-op update claims the database write lock first; later writers then wait
/// on the busy timeout instead of failing a read-to-write lock upgrade.
async fn lock_project(txn: &DatabaseTransaction, id: i64) -> Result<Option<projects::Model>> {
    let query = projects::Entity::find_by_id(id);
    let project = match txn.get_database_backend() {
        DbBackend::Sqlite => {
            projects::Entity::update_many()
                .col_expr(
                    projects::Column::UpdatedAt,
                    Expr::col(projects::Column::UpdatedAt).into(),
                )
                .filter(projects::Column::Id.eq(id))
                .exec(txn)
                .await?;
            query.one(txn).await?
        }
        _ => query.lock_exclusive().one(txn).await?,
    };
    Ok(project)
}

/// Busy database, lock wait timeout or deadlock victim; safe to run again
fn is_lock_contention(err: &DbErr) -> bool {
    let message = err.to_string().to_lowercase();
    ["database is locked", "database is busy", "deadlock", "lock wait timeout"]
        .iter()
        .any(|needle| message.contains(needle))
}

/// Apply the milestone rule to a freshly read project and persist a new latch
async fn recheck_milestone<C: ConnectionTrait>(
    db: &C,
    project: projects::Model,
) -> Result<(projects::Model, MilestoneOutcome)> {
    let funds = parse_stored_amount(&project.funds)?;
    let goal = parse_stored_amount(&project.funding_goal)?;
    let outcome = milestone::evaluate(funds, goal, project.milestone_reached);

    if !outcome.is_newly_reached() {
        return Ok((project, outcome));
    }

    let mut active: projects::ActiveModel = project.into();
    active.milestone_reached = Set(true);
    active.updated_at = Set(Utc::now());
    let project = active.update(db).await?;

    info!("🎯 Milestone reached for project {}", project.id);
    Ok((project, outcome))
}
