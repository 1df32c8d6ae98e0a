//! Host object bridge.
//!
//! Builds classes on top of engine modules and dispatches method calls:
//!
//! - objects look methods up on their class's prototype, then on each
//!   superclass's prototype;
//! - modules and classes look methods up on their singleton modules
//!   (inherited along the superclass chain for classes).
//!
//! Engine operations go through [`Runtime`] so that `included` and
//! `extended` hooks fire once the engine has finished.

pub mod class;
pub mod object;

pub use class::{ClassInfo, ClassTable};
pub use object::ObjectRef;

use crate::engine::{Callable, EngineConfig, Inclusion, InclusionKind, ModuleId, Prototype, Registry};
use crate::error::{EngineError, RuntimeError};
use crate::value::Value;

/// Singleton method called as `included(base)` after a module is included.
pub const INCLUDED_HOOK: &str = "included";

/// Singleton method called as `extended(base)` after a module extends `base`.
pub const EXTENDED_HOOK: &str = "extended";

/// Instance method called by [`Runtime::instantiate`].
pub const INITIALIZER: &str = "initialize";

pub struct Runtime {
    registry: Registry,
    classes: ClassTable,
    object_class: ModuleId,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut registry = Registry::with_config(config);
        let object_class = registry.alloc_module(Some("Object"), Some(Prototype::new()));
        let mut classes = ClassTable::new();
        classes.register(object_class, None);
        Self { registry, classes, object_class }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Direct engine access. Inclusions made here fire their hooks on the
    /// next runtime-level operation.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Root of every class hierarchy.
    pub fn object_class(&self) -> ModuleId {
        self.object_class
    }

    // --- Engine operations ---

    pub fn create_module(&mut self, name: Option<&str>, mixin: Option<&Value>) -> Result<ModuleId, RuntimeError> {
        let result = self.registry.create_module(name, mixin);
        self.settle(result)
    }

    pub fn define(&mut self, id: ModuleId, name: &str, value: Value) -> Result<(), RuntimeError> {
        Ok(self.registry.define(id, name, value)?)
    }

    pub fn define_fn(
        &mut self,
        id: ModuleId,
        name: &str,
        f: impl Fn(&mut Runtime, &Value, &[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Result<(), RuntimeError> {
        Ok(self.registry.define_fn(id, name, f)?)
    }

    pub fn include(&mut self, id: ModuleId, mixin: &Value) -> Result<ModuleId, RuntimeError> {
        let result = self.registry.include(id, mixin);
        self.settle(result)
    }

    pub fn extend(&mut self, id: ModuleId, mixin: &Value) -> Result<ModuleId, RuntimeError> {
        let result = self.registry.extend(id, mixin);
        self.settle(result)
    }

    /// Fire hooks for every edge the engine added, even when it failed later on.
    fn settle<T>(&mut self, result: Result<T, EngineError>) -> Result<T, RuntimeError> {
        let hooks = self.fire_hooks();
        let value = result?;
        hooks?;
        Ok(value)
    }

    fn fire_hooks(&mut self) -> Result<(), RuntimeError> {
        loop {
            let pending = self.registry.take_inclusions();
            if pending.is_empty() {
                return Ok(());
            }
            for Inclusion { base, included, kind } in pending {
                let hook_name = match kind {
                    InclusionKind::Include => INCLUDED_HOOK,
                    InclusionKind::Extend => EXTENDED_HOOK,
                };
                if let Some(hook) = self.singleton_method(included, hook_name) {
                    log::debug!(
                        "{}.{}({})",
                        self.registry.display_name(included),
                        hook_name,
                        self.registry.display_name(base)
                    );
                    hook.call(self, &Value::Module(included), &[Value::Module(base)])?;
                }
            }
        }
    }

    // --- Classes ---

    /// Derive a class from `parent` (the root class when `None`). The class's
    /// prototype mirrors its resolved methods; lookups that miss it continue
    /// on the parent's prototype.
    pub fn derive_class(
        &mut self,
        parent: Option<ModuleId>,
        name: Option<&str>,
        mixin: Option<&Value>,
    ) -> Result<ModuleId, RuntimeError> {
        let parent = parent.unwrap_or(self.object_class);
        if !self.classes.is_class(parent) {
            return Err(RuntimeError::NotAClass(self.registry.display_name(parent)));
        }
        let class = self.registry.alloc_module(name, Some(Prototype::new()));
        self.classes.register(class, Some(parent));
        log::debug!(
            "derive class {} < {}",
            self.registry.display_name(class),
            self.registry.display_name(parent)
        );
        if let Some(mixin) = mixin {
            self.include(class, mixin)?;
        }
        Ok(class)
    }

    /// A root-derived class that includes `module`, named after it.
    pub fn class_from_module(&mut self, module: ModuleId) -> Result<ModuleId, RuntimeError> {
        let name = self.registry.name(module).map(str::to_string);
        self.derive_class(None, name.as_deref(), Some(&Value::Module(module)))
    }

    /// Place a field on a class prototype the way the host would, outside the engine.
    pub fn define_native(&mut self, class: ModuleId, name: &str, value: Value) -> Result<(), RuntimeError> {
        let display = self.registry.display_name(class);
        let target = self
            .registry
            .target_mut(class)
            .ok_or_else(|| RuntimeError::NotAClass(display.clone()))?;
        target.define_native(name, value).map_err(|_| {
            RuntimeError::from(EngineError::TargetRejected { module: display, name: name.to_string() })
        })
    }

    pub fn is_class(&self, id: ModuleId) -> bool {
        self.classes.is_class(id)
    }

    pub fn superclass(&self, class: ModuleId) -> Option<ModuleId> {
        self.classes.superclass(class)
    }

    pub fn subclasses(&self, class: ModuleId) -> &[ModuleId] {
        self.classes.subclasses(class)
    }

    /// Create an instance and run `initialize` when it resolves.
    pub fn instantiate(&mut self, class: ModuleId, args: &[Value]) -> Result<Value, RuntimeError> {
        if !self.classes.is_class(class) {
            return Err(RuntimeError::NotAClass(self.registry.display_name(class)));
        }
        let object = Value::Object(ObjectRef::new(class));
        if let Some(initialize) = self.find_method(&object, INITIALIZER) {
            initialize.call(self, &object, args)?;
        }
        Ok(object)
    }

    pub fn class_of(&self, value: &Value) -> Option<ModuleId> {
        value.as_object().map(ObjectRef::class)
    }

    // --- Dispatch ---

    pub fn call(&mut self, receiver: &Value, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let method = self.find_method(receiver, name).ok_or_else(|| RuntimeError::NoMethod {
            name: name.to_string(),
            receiver: self.describe(receiver),
        })?;
        method.call(self, receiver, args)
    }

    /// Call a function value, such as a block passed as an argument.
    pub fn invoke(&mut self, function: &Value, receiver: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
        match function {
            Value::Function(callable) => callable.call(self, receiver, args),
            other => Err(RuntimeError::Type { expected: "function", found: other.type_name() }),
        }
    }

    pub fn respond_to(&self, receiver: &Value, name: &str) -> bool {
        self.find_method(receiver, name).is_some()
    }

    pub fn find_method(&self, receiver: &Value, name: &str) -> Option<Callable> {
        match receiver {
            Value::Object(object) => self.instance_method(object.class(), name),
            Value::Module(id) => self.singleton_method(*id, name),
            _ => None,
        }
    }

    /// Instance-side lookup: the first prototype in the class chain holding
    /// `name` decides.
    pub fn instance_method(&self, class: ModuleId, name: &str) -> Option<Callable> {
        self.classes.chain(class).find_map(|c| {
            let value = self.registry.target(c)?.get(name)?;
            Some(value.as_callable().cloned())
        })?
    }

    /// Module-side lookup through singleton modules.
    pub fn singleton_method(&self, id: ModuleId, name: &str) -> Option<Callable> {
        self.classes.chain(id).find_map(|m| {
            let singleton = self.registry.singleton(m)?;
            self.registry.resolve(singleton, name).map(|method| method.callable.clone())
        })
    }

    /// Whether `module` is among the ancestors of the value's class chain
    /// (objects) or of its singleton module (modules).
    pub fn is_a(&self, value: &Value, module: ModuleId) -> bool {
        match value {
            Value::Object(object) => self
                .classes
                .chain(object.class())
                .any(|class| self.registry.ancestors(class).contains(&module)),
            Value::Module(id) => self
                .registry
                .singleton(*id)
                .is_some_and(|singleton| self.registry.ancestors(singleton).contains(&module)),
            _ => false,
        }
    }

    /// Short description of a value for error messages.
    pub fn describe(&self, value: &Value) -> String {
        match value {
            Value::Object(object) => format!("#<{}>", self.registry.display_name(object.class())),
            Value::Module(id) => self.registry.display_name(*id),
            other => other.type_name().to_string(),
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
