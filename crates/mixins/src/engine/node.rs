use std::sync::Arc;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use super::arena::ModuleId;
use super::method::MethodRef;
use super::target::Prototype;

/// Method table keyed by name, iteration in insertion order.
pub type MethodTable = IndexMap<Arc<str>, MethodRef, FxBuildHasher>;

/// Inclusion edges. Most modules include or are included by a handful of others.
pub type Edges = SmallVec<[ModuleId; 4]>;

/// A single module in the arena.
pub struct ModuleNode {
    pub id: ModuleId,
    /// Display label, cosmetic only
    pub name: Option<Arc<str>>,
    /// Methods defined directly on this module
    pub own_methods: MethodTable,
    /// Modules this module has included, oldest first
    pub dependencies: Edges,
    /// Modules that have included this module
    pub dependents: Edges,
    /// Effective method table: own methods over dependencies, later inclusions first
    pub resolved: MethodTable,
    /// Host object receiving every resolved (name, callable) pair
    pub target: Option<Prototype>,
    /// Holder of methods added through `extend`
    pub singleton: Option<ModuleId>,
}

impl ModuleNode {
    pub fn new(id: ModuleId) -> Self {
        Self {
            id,
            name: None,
            own_methods: MethodTable::default(),
            dependencies: Edges::new(),
            dependents: Edges::new(),
            resolved: MethodTable::default(),
            target: None,
            singleton: None,
        }
    }

    /// Name for messages: the label, or the arena index.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.to_string(),
            None => format!("Module{}", self.id),
        }
    }

    pub fn includes_directly(&self, other: ModuleId) -> bool {
        self.dependencies.contains(&other)
    }
}
