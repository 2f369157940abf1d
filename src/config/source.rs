use serde::{Serialize, Deserialize};

/// Record source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// JSON snapshot with collections and their records
    pub snapshot_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            snapshot_path: "./data/collections.json".to_string(),
        }
    }
}
