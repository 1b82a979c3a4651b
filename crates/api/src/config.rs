//! API server configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use mirror::MirrorConfig;

/// Settings for [`crate::ApiServer`]
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    /// Directory holding the SPA shell and its assets
    pub static_dir: PathBuf,
    /// Separate Prometheus listener, disabled when `None`
    pub metrics_addr: Option<SocketAddr>,
    pub mirror: MirrorConfig,
}

impl ServiceConfig {
    pub fn new(database_url: impl Into<String>, listen_addr: SocketAddr) -> Self {
        Self {
            database_url: database_url.into(),
            listen_addr,
            static_dir: PathBuf::from("./frontend"),
            metrics_addr: None,
            mirror: MirrorConfig::default(),
        }
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    pub fn with_metrics_addr(mut self, addr: Option<SocketAddr>) -> Self {
        self.metrics_addr = addr;
        self
    }

    pub fn with_mirror(mut self, mirror: MirrorConfig) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.trim().is_empty() {
            return Err("database_url must not be empty".to_string());
        }
        if self.metrics_addr == Some(self.listen_addr) {
            return Err(format!(
                "metrics_addr and listen_addr must differ ({})",
                self.listen_addr
            ));
        }
        self.mirror.validate()
    }
}

/// Mask the password of a database URL for logging
pub fn mask_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        if let Some(password) = parsed.password() {
            return url.replacen(&format!(":{}@", password), ":****@", 1);
        }
        return url.to_string();
    }

    // not a URL; mask anything between the last ':' and '@'
    match url.find('@') {
        Some(at_pos) => match url[..at_pos].rfind(':') {
            Some(colon_pos) => format!("{}:****{}", &url[..colon_pos], &url[at_pos..]),
            None => url.to_string(),
        },
        None => url.to_string(),
    }
}
