use serde::{Serialize, Deserialize};

/// Collection service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upper bound for items per page
    pub max_page_size: usize,

    /// Log level used when RUST_LOG is unset
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            log_level: "info".to_string(),
        }
    }
}
