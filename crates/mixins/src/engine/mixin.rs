//! Classification of `include` arguments.
//!
//! `include` accepts either a module or a plain bag of fields. The decision
//! is made once, here, and the registry only ever sees a [`Mixin`].

use std::fmt;
use std::sync::Arc;
use indexmap::IndexMap;
use super::arena::ModuleId;
use super::method::Callable;
use crate::bridge::Runtime;
use crate::error::RuntimeError;
use crate::value::Value;

/// Bag field whose non-callable value lists mixins for the singleton module.
pub const EXTEND_KEY: &str = "extend";
/// Bag field whose non-callable value lists mixins to include.
pub const INCLUDE_KEY: &str = "include";

/// A classified `include` argument.
#[derive(Debug, Clone)]
pub enum Mixin {
    Module(ModuleId),
    Bag(Arc<Bag>),
}

impl Mixin {
    /// `None` for nil and for values that carry nothing to mix in.
    pub fn classify(value: &Value) -> Option<Mixin> {
        match value {
            Value::Module(id) => Some(Mixin::Module(*id)),
            Value::Record(bag) => Some(Mixin::Bag(bag.clone())),
            _ => None,
        }
    }
}

/// Ordered bag of named values.
#[derive(Clone, Default, PartialEq)]
pub struct Bag {
    fields: IndexMap<Arc<str>, Value>,
}

impl Bag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field.
    pub fn with(mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add a native method.
    pub fn method(
        self,
        name: impl Into<Arc<str>>,
        f: impl Fn(&mut Runtime, &Value, &[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        self.with(name, Value::Function(Callable::new(f)))
    }

    /// Nested mixins to include. The first listed takes priority.
    pub fn include(self, mixins: impl IntoIterator<Item = Value>) -> Self {
        self.with(INCLUDE_KEY, Value::list(mixins))
    }

    /// Nested mixins for the singleton module. The first listed takes priority.
    pub fn extend(self, mixins: impl IntoIterator<Item = Value>) -> Self {
        self.with(EXTEND_KEY, Value::list(mixins))
    }

    pub fn insert(&mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Mixins listed under a marker field, in declaration order.
    /// A callable under the marker name is an ordinary method, not a list.
    pub fn nested(&self, key: &str) -> Vec<Value> {
        match self.fields.get(key) {
            None | Some(Value::Nil) => Vec::new(),
            Some(value) if value.is_callable() => Vec::new(),
            Some(Value::List(items)) => items.as_ref().clone(),
            Some(value) => vec![value.clone()],
        }
    }
}

/// Marker fields already consumed as nested mixins.
pub fn is_marker(field: &str, value: &Value) -> bool {
    (field == EXTEND_KEY || field == INCLUDE_KEY) && !value.is_callable()
}

impl fmt::Debug for Bag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields.iter()).finish()
    }
}
