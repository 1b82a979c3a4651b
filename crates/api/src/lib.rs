//! GreenFi reconciliation API
//!
//! REST endpoints through which clients report confirmed on-chain actions to the
//! ledger mirror, plus the read side used by the dashboard. Non-API paths serve
//! the single-page frontend.

pub mod config;
pub mod error;
pub mod handlers;
pub mod requests;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ServiceConfig, mask_url};
pub use error::{ApiError, Result};
pub use routes::{api_router, app};
pub use server::ApiServer;
pub use state::AppState;
