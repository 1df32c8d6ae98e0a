//! Superclass links between classes.
//!
//! A class is a module with a prototype target. The engine knows nothing of
//! superclasses: single inheritance lives here, on the host side, and method
//! lookup walks it prototype by prototype.

use rustc_hash::FxHashMap;
use crate::engine::ModuleId;

#[derive(Debug, Clone, Default)]
pub struct ClassInfo {
    pub superclass: Option<ModuleId>,
    pub subclasses: Vec<ModuleId>,
}

#[derive(Debug, Default)]
pub struct ClassTable {
    classes: FxHashMap<ModuleId, ClassInfo>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `class` under `superclass`, appending it to the parent's subclasses.
    pub fn register(&mut self, class: ModuleId, superclass: Option<ModuleId>) {
        self.classes.insert(class, ClassInfo { superclass, subclasses: Vec::new() });
        if let Some(parent) = superclass.and_then(|p| self.classes.get_mut(&p)) {
            parent.subclasses.push(class);
        }
    }

    pub fn is_class(&self, id: ModuleId) -> bool {
        self.classes.contains_key(&id)
    }

    pub fn superclass(&self, class: ModuleId) -> Option<ModuleId> {
        self.classes.get(&class)?.superclass
    }

    pub fn subclasses(&self, class: ModuleId) -> &[ModuleId] {
        self.classes.get(&class).map(|c| c.subclasses.as_slice()).unwrap_or(&[])
    }

    /// `class` followed by its superclasses up to the root.
    pub fn chain(&self, class: ModuleId) -> impl Iterator<Item = ModuleId> + '_ {
        std::iter::successors(Some(class), move |c| self.superclass(*c))
    }
}
