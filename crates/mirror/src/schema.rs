//! Schema bootstrap derived from the entities

use sea_orm::sea_query::{Index, IndexCreateStatement, TableCreateStatement};
use sea_orm::{ConnectionTrait, DatabaseBackend, Schema};
use tracing::{debug, info};

use crate::entity::{projects, stakes, withdrawals};
use crate::error::Result;

fn table_indexes() -> Vec<(&'static str, Vec<IndexCreateStatement>)> {
    vec![
        (
            "projects",
            vec![
                Index::create()
                    .name("idx_projects_owner")
                    .table(projects::Entity)
                    .col(projects::Column::Owner)
                    .to_owned(),
                Index::create()
                    .name("idx_projects_created_at")
                    .table(projects::Entity)
                    .col(projects::Column::CreatedAt)
                    .to_owned(),
            ],
        ),
        (
            "stakes",
            vec![
                Index::create()
                    .name("idx_stakes_project_id")
                    .table(stakes::Entity)
                    .col(stakes::Column::ProjectId)
                    .to_owned(),
                Index::create()
                    .name("idx_stakes_staker")
                    .table(stakes::Entity)
                    .col(stakes::Column::Staker)
                    .to_owned(),
                Index::create()
                    .name("idx_stakes_created_at")
                    .table(stakes::Entity)
                    .col(stakes::Column::CreatedAt)
                    .to_owned(),
            ],
        ),
        (
            "withdrawals",
            vec![
                Index::create()
                    .name("idx_withdrawals_project_id")
                    .table(withdrawals::Entity)
                    .col(withdrawals::Column::ProjectId)
                    .to_owned(),
                Index::create()
                    .name("idx_withdrawals_withdrawer")
                    .table(withdrawals::Entity)
                    .col(withdrawals::Column::Withdrawer)
                    .to_owned(),
                Index::create()
                    .name("idx_withdrawals_created_at")
                    .table(withdrawals::Entity)
                    .col(withdrawals::Column::CreatedAt)
                    .to_owned(),
            ],
        ),
    ]
}

/// Create the three mirror tables and their indexes if they are missing.
///
/// Tables are created parent first so the foreign keys resolve. MySQL has no
/// `CREATE INDEX IF NOT EXISTS`, so there the indexes are declared inline.
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<()> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let tables: Vec<TableCreateStatement> = vec![
        schema.create_table_from_entity(projects::Entity),
        schema.create_table_from_entity(stakes::Entity),
        schema.create_table_from_entity(withdrawals::Entity),
    ];

    for (mut table, (name, indexes)) in tables.into_iter().zip(table_indexes()) {
        table.if_not_exists();

        if backend == DatabaseBackend::MySql {
            for mut idx in indexes {
                table.index(&mut idx);
            }
            db.execute(backend.build(&table)).await?;
        } else {
            db.execute(backend.build(&table)).await?;
            for mut idx in indexes {
                idx.if_not_exists();
                db.execute(backend.build(&idx)).await?;
            }
        }
        debug!("Ensured table {}", name);
    }

    info!("✅ Mirror schema ready ({:?})", backend);
    Ok(())
}
