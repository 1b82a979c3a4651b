//! GreenFi client orchestrator
//!
//! Drives the three user actions against the GreenFi contract and mirrors each
//! confirmed transaction into the off-chain API:
//!
//! - `create_project`: `createProject()`, id from the `ProjectCreated` log or
//!   the project counter, then `POST /projects`
//! - `stake`: payable `stake(id)`, then `POST /stakes`
//! - `withdraw`: ownership check, optional `markMilestone(id)`, `withdraw(id)`,
//!   then `POST /withdrawals`

pub mod config;
pub mod contract;
pub mod error;
pub mod flow;
pub mod mirror_client;
pub mod orchestrator;
pub mod project_id;
pub mod wallet;

pub use config::ClientConfig;
pub use contract::{ContractClient, IGreenFi};
pub use error::{OrchestratorError, Result};
pub use flow::{ActionFlow, ActionKind, ConfirmedTx, FlowState};
pub use mirror_client::{MirrorAck, MirrorClient};
pub use orchestrator::{ActionReport, Orchestrator, ProjectDraft};
pub use project_id::{IdSource, ProjectCounter, resolve_project_id};
pub use wallet::{ConsolePresenter, PresentationAdapter, SessionChange, WalletEvent, WalletSession};
