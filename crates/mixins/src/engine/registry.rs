//! The module registry: construction, `define`, `include` and `extend`.
//!
//! Every mutation ends in [`Registry::propagate`], which keeps each affected
//! module's resolved table equal to its own methods layered over its
//! dependencies' resolved tables.

use std::sync::Arc;
use rustc_hash::FxHashSet;
use super::arena::{Arena, ModuleId};
use super::config::EngineConfig;
use super::ledger::{Ledger, LedgerEvent};
use super::method::{Callable, Method, MethodRef};
use super::mixin::{is_marker, Bag, Mixin, EXTEND_KEY, INCLUDE_KEY};
use super::node::ModuleNode;
use super::target::Prototype;
use crate::bridge::Runtime;
use crate::error::{EngineError, RuntimeError};
use crate::value::Value;

/// An edge added by `include` or `extend`, kept until the bridge fires hooks.
///
/// For an extension `base` is the extended module, not its singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inclusion {
    pub base: ModuleId,
    pub included: ModuleId,
    pub kind: InclusionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionKind {
    Include,
    Extend,
}

/// Two or more dependencies supplied different methods for one name.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub module: ModuleId,
    pub name: Arc<str>,
    /// Owner of the method that won
    pub winner: ModuleId,
    /// Owners of the methods it shadows
    pub shadowed: Vec<ModuleId>,
}

pub struct Registry {
    pub(super) arena: Arena,
    pub(super) config: EngineConfig,
    pub(super) ledger: Ledger,
    pub(super) conflicts: Vec<Conflict>,
    inclusions: Vec<Inclusion>,
    next_version: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut ledger = Ledger::new();
        if config.record_ledger {
            ledger.enable();
        }
        Self {
            arena: Arena::new(),
            config,
            ledger,
            conflicts: Vec::new(),
            inclusions: Vec::new(),
            next_version: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- Construction ---

    /// Create a module, optionally seeded through the `include` path.
    pub fn create_module(&mut self, name: Option<&str>, mixin: Option<&Value>) -> Result<ModuleId, EngineError> {
        self.create(name, None, mixin)
    }

    /// Create a module whose resolved methods are mirrored onto `target`.
    pub fn create_module_with_target(
        &mut self,
        name: Option<&str>,
        target: Prototype,
        mixin: Option<&Value>,
    ) -> Result<ModuleId, EngineError> {
        self.create(name, Some(target), mixin)
    }

    fn create(
        &mut self,
        name: Option<&str>,
        target: Option<Prototype>,
        mixin: Option<&Value>,
    ) -> Result<ModuleId, EngineError> {
        let id = self.alloc_module(name, target);
        if let Some(mixin) = mixin {
            self.include(id, mixin)?;
        }
        Ok(id)
    }

    /// Allocate an empty module. Cannot fail.
    pub(crate) fn alloc_module(&mut self, name: Option<&str>, target: Option<Prototype>) -> ModuleId {
        let id = self.arena.alloc();
        if let Some(node) = self.arena.get_mut(id) {
            node.name = name.map(Arc::from);
            node.target = target;
        }
        id
    }

    pub fn set_name(&mut self, id: ModuleId, name: &str) -> Result<(), EngineError> {
        self.node_mut(id)?.name = Some(name.into());
        Ok(())
    }

    pub fn name(&self, id: ModuleId) -> Option<&str> {
        self.arena.get(id)?.name.as_deref()
    }

    pub fn display_name(&self, id: ModuleId) -> String {
        match self.arena.get(id) {
            Some(node) => node.display_name(),
            None => format!("<unknown {id}>"),
        }
    }

    // --- Definition ---

    /// Store a new method record and propagate it. Redefinition replaces.
    pub fn define(&mut self, id: ModuleId, name: &str, value: Value) -> Result<(), EngineError> {
        if name.is_empty() {
            return Err(EngineError::InvalidMethodName);
        }
        let callable = match value {
            Value::Function(callable) => callable,
            other => {
                return Err(EngineError::InvalidMethod {
                    name: name.to_string(),
                    found: other.type_name(),
                });
            }
        };
        self.node(id)?;

        self.next_version += 1;
        let version = self.next_version;
        let name: Arc<str> = name.into();
        let method = Method::new(name.clone(), callable, id, version);
        self.node_mut(id)?.own_methods.insert(name.clone(), method);

        log::debug!("define {}#{} (v{})", self.display_name(id), name, version);
        self.ledger.record(LedgerEvent::Defined { module: id, name: name.clone(), version });
        self.propagate(id, &[name])
    }

    /// `define` with a native closure.
    pub fn define_fn(
        &mut self,
        id: ModuleId,
        name: &str,
        f: impl Fn(&mut Runtime, &Value, &[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Result<(), EngineError> {
        self.define(id, name, Value::Function(Callable::new(f)))
    }

    // --- Inclusion ---

    /// Mix a module or a bag of fields into `id`. Nil and other values are a no-op.
    pub fn include(&mut self, id: ModuleId, mixin: &Value) -> Result<ModuleId, EngineError> {
        self.node(id)?;
        match Mixin::classify(mixin) {
            Some(Mixin::Module(included)) => self.include_module(id, included)?,
            Some(Mixin::Bag(bag)) => self.include_bag(id, &bag)?,
            None if mixin.is_nil() => {}
            None => log::trace!(
                "include into {}: ignoring {} value",
                self.display_name(id),
                mixin.type_name()
            ),
        }
        Ok(id)
    }

    fn include_module(&mut self, base: ModuleId, included: ModuleId) -> Result<(), EngineError> {
        self.node(included)?;
        if base == included || self.depends_on(included, base) {
            return Err(EngineError::CyclicInclusion {
                base: self.display_name(base),
                included: self.display_name(included),
            });
        }
        if self.node(base)?.includes_directly(included) {
            log::debug!("{} already includes {}", self.display_name(base), self.display_name(included));
            return Ok(());
        }

        self.node_mut(base)?.dependencies.push(included);
        self.node_mut(included)?.dependents.push(base);
        log::debug!("include {} into {}", self.display_name(included), self.display_name(base));
        self.ledger.record(LedgerEvent::Included { base, included });
        self.inclusions.push(Inclusion { base, included, kind: InclusionKind::Include });

        let names: Vec<Arc<str>> = self.node(included)?.resolved.keys().cloned().collect();
        self.propagate(base, &names)
    }

    fn include_bag(&mut self, id: ModuleId, bag: &Bag) -> Result<(), EngineError> {
        // Applied last to first: the first listed mixin wins.
        for mixin in bag.nested(EXTEND_KEY).iter().rev() {
            self.extend(id, mixin)?;
        }
        for mixin in bag.nested(INCLUDE_KEY).iter().rev() {
            self.include(id, mixin)?;
        }
        for (field, value) in bag.iter() {
            if is_marker(field, value) {
                continue;
            }
            if value.is_callable() {
                self.define(id, field, value.clone())?;
            } else {
                log::trace!("skipping non-callable field `{}` ({})", field, value.type_name());
            }
        }
        Ok(())
    }

    /// Mix into the singleton module of `id`. Values that are neither
    /// modules nor bags leave `id` without a singleton.
    pub fn extend(&mut self, id: ModuleId, mixin: &Value) -> Result<ModuleId, EngineError> {
        if Mixin::classify(mixin).is_none() {
            self.node(id)?;
            return Ok(id);
        }
        let singleton = self.singleton_of(id)?;
        let start = self.inclusions.len();
        let result = self.include(singleton, mixin);
        // Edges on the singleton are extensions of `id`; nested extensions keep their own base.
        for inclusion in &mut self.inclusions[start..] {
            if inclusion.base == singleton && inclusion.kind == InclusionKind::Include {
                inclusion.base = id;
                inclusion.kind = InclusionKind::Extend;
            }
        }
        result.map(|_| id)
    }

    /// The singleton module of `id`, created on first use.
    pub fn singleton_of(&mut self, id: ModuleId) -> Result<ModuleId, EngineError> {
        if let Some(singleton) = self.node(id)?.singleton {
            return Ok(singleton);
        }
        let label = format!("#<{}>", self.display_name(id));
        let singleton = self.alloc_module(Some(&label), None);
        self.node_mut(id)?.singleton = Some(singleton);
        Ok(singleton)
    }

    pub fn singleton(&self, id: ModuleId) -> Option<ModuleId> {
        self.arena.get(id)?.singleton
    }

    /// Inclusions since the last call, oldest first.
    pub fn take_inclusions(&mut self) -> Vec<Inclusion> {
        std::mem::take(&mut self.inclusions)
    }

    /// Chainable handle on one module.
    pub fn module(&mut self, id: ModuleId) -> ModuleMut<'_> {
        ModuleMut { registry: self, id }
    }

    // --- Queries ---

    /// Method defined directly on `id`.
    pub fn instance_method(&self, id: ModuleId, name: &str) -> Option<&MethodRef> {
        self.arena.get(id)?.own_methods.get(name)
    }

    /// Winning method in the resolved table of `id`.
    pub fn resolve(&self, id: ModuleId, name: &str) -> Option<&MethodRef> {
        self.arena.get(id)?.resolved.get(name)
    }

    pub fn resolved_names(&self, id: ModuleId) -> Vec<Arc<str>> {
        self.arena
            .get(id)
            .map(|node| node.resolved.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn dependencies(&self, id: ModuleId) -> &[ModuleId] {
        self.arena.get(id).map(|n| n.dependencies.as_slice()).unwrap_or(&[])
    }

    pub fn dependents(&self, id: ModuleId) -> &[ModuleId] {
        self.arena.get(id).map(|n| n.dependents.as_slice()).unwrap_or(&[])
    }

    /// Whether `from` reaches `to` through dependency edges.
    pub fn depends_on(&self, from: ModuleId, to: ModuleId) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack: Vec<ModuleId> = self.dependencies(from).to_vec();
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if visited.insert(id) {
                stack.extend_from_slice(self.dependencies(id));
            }
        }
        false
    }

    /// Lookup order: the module, then its dependencies latest first, depth-first,
    /// each module listed once.
    pub fn ancestors(&self, id: ModuleId) -> Vec<ModuleId> {
        let mut seen = FxHashSet::default();
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            // Oldest pushed first so the latest inclusion is visited next.
            stack.extend_from_slice(self.dependencies(current));
        }
        order
    }

    pub fn target(&self, id: ModuleId) -> Option<&Prototype> {
        self.arena.get(id)?.target.as_ref()
    }

    pub fn target_mut(&mut self, id: ModuleId) -> Option<&mut Prototype> {
        self.arena.get_mut(id)?.target.as_mut()
    }

    pub fn get(&self, id: ModuleId) -> Option<&ModuleNode> {
        self.arena.get(id)
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleNode> {
        self.arena.iter()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Conflicts seen under `MergePolicy::ReportConflicts`.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub(super) fn node(&self, id: ModuleId) -> Result<&ModuleNode, EngineError> {
        self.arena.get(id).ok_or(EngineError::UnknownModule(id))
    }

    pub(super) fn node_mut(&mut self, id: ModuleId) -> Result<&mut ModuleNode, EngineError> {
        self.arena.get_mut(id).ok_or(EngineError::UnknownModule(id))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Chainable mutation of one module.
///
/// ```
/// # use mixins::{Registry, Value};
/// let mut registry = Registry::new();
/// let a = registry.create_module(Some("A"), None).unwrap();
/// let b = registry.create_module(Some("B"), None).unwrap();
/// registry
///     .module(b)
///     .include(&Value::Module(a))
///     .unwrap()
///     .define_fn("size", |_, _, _| Ok(Value::Int(0)))
///     .unwrap();
/// assert!(registry.resolve(b, "size").is_some());
/// ```
pub struct ModuleMut<'a> {
    registry: &'a mut Registry,
    id: ModuleId,
}

impl<'a> ModuleMut<'a> {
    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn set_name(self, name: &str) -> Result<Self, EngineError> {
        self.registry.set_name(self.id, name)?;
        Ok(self)
    }

    pub fn include(self, mixin: &Value) -> Result<Self, EngineError> {
        self.registry.include(self.id, mixin)?;
        Ok(self)
    }

    pub fn extend(self, mixin: &Value) -> Result<Self, EngineError> {
        self.registry.extend(self.id, mixin)?;
        Ok(self)
    }

    pub fn define(self, name: &str, value: impl Into<Value>) -> Result<Self, EngineError> {
        self.registry.define(self.id, name, value.into())?;
        Ok(self)
    }

    pub fn define_fn(
        self,
        name: &str,
        f: impl Fn(&mut Runtime, &Value, &[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Result<Self, EngineError> {
        self.registry.define_fn(self.id, name, f)?;
        Ok(self)
    }
}
