use std::sync::Arc;

use mirror::entity::{projects, stakes, withdrawals};
use mirror::{
    ActivityKind, MilestoneOutcome, MirrorConfig, MirrorDatabase, MirrorError, NewProject,
    NewStake, NewWithdrawal,
};
use sea_orm::{EntityTrait, PaginatorTrait};

const OWNER: &str = "0xAAaa000000000000000000000000000000000001";
const STAKER: &str = "0xBBbb000000000000000000000000000000000002";
const OTHER_STAKER: &str = "0xcccc000000000000000000000000000000000003";

async fn setup() -> MirrorDatabase {
    // in-memory SQLite lives as long as its single connection
    let config = MirrorConfig::new()
        .with_max_connections(1)
        .with_min_connections(1);
    let db = MirrorDatabase::new("sqlite::memory:", &config)
        .await
        .expect("in-memory database");
    db.init_schema().await.expect("schema");
    db
}

/// File-backed SQLite with a real pool, so writes can overlap
async fn setup_pooled(name: &str) -> Arc<MirrorDatabase> {
    let path = std::env::temp_dir().join(format!(
        "greenfi-mirror-{}-{}.db",
        std::process::id(),
        name
    ));
    let _ = std::fs::remove_file(&path);

    let config = MirrorConfig::new()
        .with_max_connections(8)
        .with_min_connections(1);
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = MirrorDatabase::new(&url, &config)
        .await
        .expect("file database");
    db.init_schema().await.expect("schema");
    Arc::new(db)
}

async fn create_project(db: &MirrorDatabase, id: i64, goal: &str) {
    db.upsert_project(
        NewProject::new(id, OWNER, format!("Solar Farm {}", id))
            .with_description("Community solar panels")
            .with_funding_goal(goal)
            .with_transaction("0xabc", Some(100)),
    )
    .await
    .expect("project created");
}

#[tokio::test]
async fn test_stakes_reach_milestone() {
    let db = setup().await;
    create_project(&db, 1, "1000").await;

    let first = db.record_stake(NewStake::new(1, STAKER, "600")).await.unwrap();
    assert_eq!(first.funds, "600");
    assert_eq!(first.milestone, MilestoneOutcome::NotReached);

    let project = db.get_project(1).await.unwrap();
    assert!(!project.project.milestone_reached);

    let second = db.record_stake(NewStake::new(1, OTHER_STAKER, "400")).await.unwrap();
    assert_eq!(second.funds, "1000");
    assert_eq!(second.milestone, MilestoneOutcome::NewlyReached);

    let project = db.get_project(1).await.unwrap();
    assert_eq!(project.project.funds, "1000");
    assert!(project.project.milestone_reached);
    assert_eq!(project.total_staked, "1000");
    assert_eq!(project.staker_count, 2);
}

#[tokio::test]
async fn test_funds_equal_exact_sum_of_stakes() {
    let db = setup().await;
    create_project(&db, 7, "0").await;

    let big = "115792089237316195423570985008687907853269984665640564039457584007913129639";
    db.record_stake(NewStake::new(7, STAKER, big)).await.unwrap();
    let recorded = db
        .record_stake(NewStake::new(7, STAKER, "1000000000000000001"))
        .await
        .unwrap();

    let expected = "115792089237316195423570985008687907853269984665640564040457584007913129640";
    assert_eq!(recorded.funds, expected);
    assert_eq!(db.get_project(7).await.unwrap().project.funds, expected);
    // zero goal never trips the milestone on its own
    assert_eq!(recorded.milestone, MilestoneOutcome::NotReached);
}

#[tokio::test]
async fn test_stake_on_unknown_project_inserts_nothing() {
    let db = setup().await;

    let err = db
        .record_stake(NewStake::new(99, STAKER, "100"))
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::ProjectNotFound(99)));

    let count = stakes::Entity::find().count(db.connection()).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_invalid_amount_is_rejected() {
    let db = setup().await;
    create_project(&db, 1, "1000").await;

    let err = db
        .record_stake(NewStake::new(1, STAKER, "12.5"))
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::InvalidAmount(_)));

    let err = db
        .record_withdrawal(NewWithdrawal::new(1, OWNER, ""))
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::Validation(_)));
}

#[tokio::test]
async fn test_upsert_keeps_identity_fields() {
    let db = setup().await;
    create_project(&db, 3, "1000").await;

    let outcome = db
        .upsert_project(
            NewProject::new(3, "0xdddd000000000000000000000000000000000004", "Renamed")
                .with_description("changed")
                .with_funding_goal("2000")
                .with_funds("50"),
        )
        .await
        .unwrap();
    assert!(!outcome.created);

    let project = outcome.project;
    assert_eq!(project.name, "Solar Farm 3");
    assert_eq!(project.owner, OWNER.to_lowercase());
    assert_eq!(project.description.as_deref(), Some("Community solar panels"));
    assert_eq!(project.tx_hash.as_deref(), Some("0xabc"));
    assert_eq!(project.funding_goal, "2000");
    assert_eq!(project.funds, "50");

    let count = projects::Entity::find().count(db.connection()).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_upsert_requires_owner_and_name() {
    let db = setup().await;
    let err = db
        .upsert_project(NewProject::new(1, OWNER, ""))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing required fields: id, owner, name");
}

#[tokio::test]
async fn test_milestone_latch_never_reverses() {
    let db = setup().await;
    create_project(&db, 1, "1000").await;
    db.record_stake(NewStake::new(1, STAKER, "1000")).await.unwrap();

    let recorded = db
        .record_withdrawal(NewWithdrawal::new(1, OWNER, "1000"))
        .await
        .unwrap();
    assert!(recorded.milestone_reached);

    // an upsert reporting "not reached" cannot unlatch the flag
    let outcome = db
        .upsert_project(
            NewProject::new(1, OWNER, "Solar Farm 1")
                .with_funding_goal("1000")
                .with_milestone_reached(false),
        )
        .await
        .unwrap();
    assert!(outcome.project.milestone_reached);
    assert_eq!(outcome.milestone, MilestoneOutcome::AlreadyReached);

    let report = db.check_milestone(1).await.unwrap();
    assert!(report.milestone_reached);
    assert!(!report.newly_reached);
}

#[tokio::test]
async fn test_withdrawal_can_assert_milestone() {
    let db = setup().await;
    create_project(&db, 1, "1000").await;

    let recorded = db
        .record_withdrawal(NewWithdrawal::new(1, OWNER, "10").with_milestone_marked(true))
        .await
        .unwrap();
    assert!(recorded.milestone_reached);
    assert!(recorded.withdrawal.milestone_marked);
    assert!(db.get_project(1).await.unwrap().project.milestone_reached);

    let listed = db.list_withdrawals_by_withdrawer(OWNER).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].project_name.as_deref(), Some("Solar Farm 1"));
}

#[tokio::test]
async fn test_check_milestone_reports_progress() {
    let db = setup().await;
    create_project(&db, 1, "1000").await;
    db.record_stake(NewStake::new(1, STAKER, "375")).await.unwrap();

    let report = db.check_milestone(1).await.unwrap();
    assert_eq!(report.current_funds, "375");
    assert_eq!(report.funding_goal, "1000");
    assert_eq!(report.progress, 37.5);
    assert!(!report.milestone_reached);

    let err = db.check_milestone(2).await.unwrap_err();
    assert!(matches!(err, MirrorError::ProjectNotFound(2)));
}

#[tokio::test]
async fn test_projects_without_activity_have_zero_aggregates() {
    let db = setup().await;
    create_project(&db, 1, "1000").await;
    create_project(&db, 2, "500").await;
    db.record_stake(NewStake::new(2, STAKER, "100")).await.unwrap();
    db.record_stake(NewStake::new(2, STAKER, "200")).await.unwrap();
    db.record_withdrawal(NewWithdrawal::new(2, OWNER, "50"))
        .await
        .unwrap();

    let listed = db.list_projects().await.unwrap();
    assert_eq!(listed.len(), 2);

    let idle = listed.iter().find(|p| p.project.id == 1).unwrap();
    assert_eq!(idle.total_staked, "0");
    assert_eq!(idle.staker_count, 0);
    assert_eq!(idle.withdrawal_count, 0);
    assert_eq!(idle.total_withdrawn, "0");

    // one withdrawal must not multiply the stake totals
    let active = listed.iter().find(|p| p.project.id == 2).unwrap();
    assert_eq!(active.total_staked, "300");
    assert_eq!(active.staker_count, 1);
    assert_eq!(active.withdrawal_count, 1);
    assert_eq!(active.total_withdrawn, "50");
}

#[tokio::test]
async fn test_owner_and_search_queries() {
    let db = setup().await;
    create_project(&db, 1, "1000").await;
    db.upsert_project(NewProject::new(2, OTHER_STAKER, "Wind Park").with_description("offshore"))
        .await
        .unwrap();

    let owned = db.list_projects_by_owner(&OWNER.to_uppercase()).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].project.id, 1);

    let by_name = db.search_projects("Wind").await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].project.id, 2);

    let by_description = db.search_projects("solar panels").await.unwrap();
    assert_eq!(by_description.len(), 1);

    assert!(db.search_projects("geothermal").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stake_listings() {
    let db = setup().await;
    create_project(&db, 1, "1000").await;
    create_project(&db, 2, "1000").await;
    db.record_stake(NewStake::new(1, STAKER, "100")).await.unwrap();
    db.record_stake(NewStake::new(2, STAKER, "200")).await.unwrap();
    db.record_stake(NewStake::new(2, OTHER_STAKER, "300")).await.unwrap();

    let for_project = db.list_stakes_by_project(2).await.unwrap();
    assert_eq!(for_project.len(), 2);

    let for_staker = db.list_stakes_by_staker(&STAKER.to_lowercase()).await.unwrap();
    assert_eq!(for_staker.len(), 2);
    assert!(for_staker
        .iter()
        .all(|s| s.project_owner.as_deref() == Some(OWNER.to_lowercase().as_str())));
    assert!(for_staker
        .iter()
        .all(|s| s.project_funding_goal.as_deref() == Some("1000")));
}

#[tokio::test]
async fn test_platform_and_user_stats() {
    let db = setup().await;

    let empty = db.platform_stats().await.unwrap();
    assert_eq!(empty.total_projects, 0);
    assert_eq!(empty.avg_investment, "0");
    assert_eq!(empty.funding_progress, "0");

    create_project(&db, 1, "1000").await;
    create_project(&db, 2, "1000").await;
    db.record_stake(NewStake::new(1, STAKER, "1000")).await.unwrap();
    db.record_stake(NewStake::new(2, OTHER_STAKER, "500")).await.unwrap();
    db.record_withdrawal(NewWithdrawal::new(1, OWNER, "1000"))
        .await
        .unwrap();

    let stats = db.platform_stats().await.unwrap();
    assert_eq!(stats.total_projects, 2);
    assert_eq!(stats.completed_projects, 1);
    assert_eq!(stats.active_projects, 1);
    assert_eq!(stats.total_stakes, 2);
    assert_eq!(stats.total_funds_raised, "1500");
    assert_eq!(stats.total_funding_goal, "2000");
    assert_eq!(stats.funding_progress, "75.00");
    assert_eq!(stats.total_withdrawals, 1);
    assert_eq!(stats.total_withdrawn, "1000");
    assert_eq!(stats.net_funds, "500");
    assert_eq!(stats.unique_investors, 2);
    assert_eq!(stats.avg_investment, "750");

    let owner = db.user_stats(OWNER).await.unwrap();
    assert_eq!(owner.user_projects, 2);
    assert_eq!(owner.active_projects, 1);
    assert_eq!(owner.total_investments, 0);
    assert_eq!(owner.total_withdrawn, "1000");
    assert_eq!(owner.net_contribution, "-1000");

    let staker = db.user_stats(STAKER).await.unwrap();
    assert_eq!(staker.total_investments, 1);
    assert_eq!(staker.total_invested, "1000");
    assert_eq!(staker.net_contribution, "1000");
}

#[tokio::test]
async fn test_recent_activity() {
    let db = setup().await;
    create_project(&db, 1, "5000000000000000000").await;
    db.record_stake(NewStake::new(1, STAKER, "1500000000000000000"))
        .await
        .unwrap();
    db.record_withdrawal(NewWithdrawal::new(1, OWNER, "250000000000000000"))
        .await
        .unwrap();

    let activities = db.recent_activity(20).await.unwrap();
    assert_eq!(activities.len(), 3);

    let stake = activities
        .iter()
        .find(|a| a.activity_type == ActivityKind::Stake)
        .unwrap();
    assert_eq!(stake.description, "Staked 1.5000 ETH");
    assert_eq!(stake.project_name.as_deref(), Some("Solar Farm 1"));

    let withdrawal = activities
        .iter()
        .find(|a| a.activity_type == ActivityKind::Withdrawal)
        .unwrap();
    assert_eq!(withdrawal.description, "Withdrew 0.2500 ETH");

    let created = activities
        .iter()
        .find(|a| a.activity_type == ActivityKind::ProjectCreated)
        .unwrap();
    assert_eq!(created.description, "Created project: Solar Farm 1");
    assert!(created.amount.is_none());

    assert!(activities
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));

    assert_eq!(db.recent_activity(2).await.unwrap().len(), 2);
    assert!(db.recent_activity(0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_project_delete_cascades() {
    let db = setup().await;
    create_project(&db, 1, "1000").await;
    db.record_stake(NewStake::new(1, STAKER, "10")).await.unwrap();
    db.record_withdrawal(NewWithdrawal::new(1, OWNER, "5"))
        .await
        .unwrap();

    projects::Entity::delete_by_id(1i64)
        .exec(db.connection())
        .await
        .unwrap();

    assert_eq!(stakes::Entity::find().count(db.connection()).await.unwrap(), 0);
    assert_eq!(
        withdrawals::Entity::find().count(db.connection()).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_schema_init_is_idempotent() {
    let db = setup().await;
    db.init_schema().await.unwrap();
    db.health_check().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_stakes_all_recorded() {
    const STAKES: usize = 32;

    let db = setup_pooled("concurrent-stakes").await;
    create_project(&db, 1, "300").await;

    let handles: Vec<_> = (0..STAKES)
        .map(|i| {
            let db = db.clone();
            tokio::spawn(async move {
                let staker = format!("0x{:040x}", i + 1);
                db.record_stake(NewStake::new(1, staker, "10")).await
            })
        })
        .collect();

    for handle in handles {
        let recorded = handle.await.expect("task panicked");
        assert!(recorded.is_ok(), "stake failed: {:?}", recorded.err());
    }

    let project = db.get_project(1).await.unwrap();
    assert_eq!(project.project.funds, "320");
    assert_eq!(project.total_staked, "320");
    assert_eq!(project.staker_count, STAKES as u64);
    assert!(project.project.milestone_reached);
    assert_eq!(db.list_stakes_by_project(1).await.unwrap().len(), STAKES);
}

#[tokio::test]
async fn test_concurrent_withdrawals_and_upserts() {
    let db = setup_pooled("concurrent-mixed").await;
    create_project(&db, 7, "1000").await;

    let mut handles = Vec::new();
    for i in 0..8u64 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                db.record_withdrawal(
                    NewWithdrawal::new(7, OWNER, "5").with_milestone_marked(i == 4),
                )
                .await
                .map(|_| ())
            } else {
                db.upsert_project(
                    NewProject::new(7, OWNER, "Renamed").with_funding_goal("1000"),
                )
                .await
                .map(|_| ())
            }
        }));
    }
    for handle in handles {
        let result = handle.await.expect("task panicked");
        assert!(result.is_ok(), "write failed: {:?}", result.err());
    }

    let project = db.get_project(7).await.unwrap();
    assert_eq!(project.withdrawal_count, 4);
    assert_eq!(project.total_withdrawn, "20");
    assert!(project.project.milestone_reached);
    assert_eq!(project.project.name, "Solar Farm 7");
}
