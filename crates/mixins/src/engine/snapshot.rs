//! Snapshot of the module graph.
//!
//! Captures names, edges and the owner of every resolved method, for
//! debugging and for comparing graphs in tests.
//!
//! Note: JSON helpers require the `json` feature.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use super::arena::ModuleId;
use super::registry::Registry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Version for migration support
    pub version: u32,
    pub modules: Vec<ModuleSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    pub id: ModuleId,
    pub name: Option<String>,
    /// Names defined directly on the module, in definition order
    pub own_methods: Vec<String>,
    pub dependencies: Vec<ModuleId>,
    pub dependents: Vec<ModuleId>,
    /// Resolved name -> owning module
    pub resolved: BTreeMap<String, ModuleId>,
    pub singleton: Option<ModuleId>,
    /// Names currently on the target, if the module has one
    pub target: Option<Vec<String>>,
}

impl GraphSnapshot {
    /// Current snapshot version.
    pub const VERSION: u32 = 1;

    pub fn capture(registry: &Registry) -> Self {
        let modules = registry
            .modules()
            .map(|node| ModuleSnapshot {
                id: node.id,
                name: node.name.as_ref().map(|n| n.to_string()),
                own_methods: node.own_methods.keys().map(|k| k.to_string()).collect(),
                dependencies: node.dependencies.to_vec(),
                dependents: node.dependents.to_vec(),
                resolved: node
                    .resolved
                    .iter()
                    .map(|(name, method)| (name.to_string(), method.owner))
                    .collect(),
                singleton: node.singleton,
                target: node
                    .target
                    .as_ref()
                    .map(|t| t.names().map(|n| n.to_string()).collect()),
            })
            .collect();
        Self { version: Self::VERSION, modules }
    }

    pub fn module(&self, id: ModuleId) -> Option<&ModuleSnapshot> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Serialize snapshot to JSON string.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize snapshot from JSON string.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Registry {
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(self)
    }
}
