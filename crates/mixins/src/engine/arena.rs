use serde::{Deserialize, Serialize};
use super::node::ModuleNode;

/// Index of a module in the arena.
/// Modules are never freed, so an index stays valid for the arena's lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(pub u32);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena allocator for module nodes.
pub struct Arena {
    nodes: Vec<ModuleNode>,
}

impl Arena {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Allocate a new, empty module.
    pub fn alloc(&mut self) -> ModuleId {
        let id = ModuleId(self.nodes.len() as u32);
        self.nodes.push(ModuleNode::new(id));
        id
    }

    /// Check if a ModuleId belongs to this arena.
    pub fn is_valid(&self, id: ModuleId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn get(&self, id: ModuleId) -> Option<&ModuleNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: ModuleId) -> Option<&mut ModuleNode> {
        self.nodes.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleNode> {
        self.nodes.iter()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
