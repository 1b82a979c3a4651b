//! Recovering the id of a freshly created project
//!
//! The id is taken from the `ProjectCreated` event in the receipt. When no such
//! log is present the contract's project counter is read and the new id is
//! assumed to be `counter - 1`. That fallback is racy: another creation landing
//! between the receipt and the counter read yields the wrong id.

use alloy::primitives::U256;
use alloy::rpc::types::Log;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::contract::IGreenFi;
use crate::error::{OrchestratorError, Result};

/// Where a recovered project id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Event,
    Counter,
}

/// Source of the contract's current project count
#[async_trait]
pub trait ProjectCounter {
    async fn project_count(&self) -> Result<U256>;
}

/// First `ProjectCreated` id found in the logs; undecodable logs are skipped
pub fn project_id_from_logs(logs: &[Log]) -> Option<U256> {
    logs.iter().find_map(|log| {
        log.log_decode::<IGreenFi::ProjectCreated>()
            .ok()
            .map(|decoded| decoded.inner.data.projectId)
    })
}

/// `counter - 1`; an empty counter means no project exists to point at
pub fn project_id_from_counter(count: U256) -> Result<U256> {
    count.checked_sub(U256::from(1u64)).ok_or_else(|| {
        OrchestratorError::ProjectIdUnavailable(
            "no ProjectCreated event and project counter is zero".to_string(),
        )
    })
}

pub async fn resolve_project_id<C>(logs: &[Log], counter: &C) -> Result<(U256, IdSource)>
where
    C: ProjectCounter + Sync + ?Sized,
{
    if let Some(id) = project_id_from_logs(logs) {
        debug!("Project id {} taken from ProjectCreated event", id);
        return Ok((id, IdSource::Event));
    }

    let count = counter.project_count().await?;
    let id = project_id_from_counter(count)?;
    warn!(
        "⚠️ ProjectCreated event missing, assuming project id {} from counter {}",
        id, count
    );
    Ok((id, IdSource::Counter))
}
