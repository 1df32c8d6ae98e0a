//! Engine configuration.
//!
//! ```toml
//! merge_policy = "report_conflicts"
//! target_conflict = "preserve_native"
//! record_ledger = true
//! ```

use serde::{Deserialize, Serialize};
use crate::error::ConfigError;

/// How competing inherited methods are merged.
/// The winner is always the last inclusion; policies only differ in reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    #[default]
    LastWins,
    /// Record a conflict when two dependencies supply different methods for a
    /// name the module does not define itself.
    ReportConflicts,
}

/// What a mirror write does to a field the host placed on the target natively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetConflict {
    #[default]
    Overwrite,
    PreserveNative,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub merge_policy: MergePolicy,
    pub target_conflict: TargetConflict,
    /// Record engine events in the ledger
    pub record_ledger: bool,
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    pub fn with_target_conflict(mut self, policy: TargetConflict) -> Self {
        self.target_conflict = policy;
        self
    }

    pub fn with_ledger(mut self) -> Self {
        self.record_ledger = true;
        self
    }
}
