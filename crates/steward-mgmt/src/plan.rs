use serde::{Deserialize, Serialize};
use std::path::Path;

/// Migration plan document read by `steward apply`.
///
/// ```json
/// {
///     "uid": 17,
///     "environment": "RND",
///     "topics_to_recreate": [
///         "aaa",
///         "bbb"
///     ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub uid: u64,
    pub environment: String,
    pub topics_to_recreate: Vec<String>,
}

impl MigrationPlan {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let plan: MigrationPlan = serde_json::from_str(&contents)?;
        Ok(plan)
    }
}
