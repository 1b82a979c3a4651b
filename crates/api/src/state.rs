use std::sync::Arc;

use mirror::MirrorDatabase;

/// Shared handler state; the pool is the only shared resource
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<MirrorDatabase>,
}

impl AppState {
    pub fn new(db: Arc<MirrorDatabase>) -> Self {
        Self { db }
    }
}
