//! # mixins-enumerable
//!
//! The `Enumerable` module: collection algorithms for any class that
//! defines `for_each` and includes the module.
//!
//! ```
//! use mixins::{Runtime, Value};
//!
//! let mut rt = Runtime::new();
//! let enumerable = mixins_enumerable::install(&mut rt).unwrap();
//! let numbers = enumerable.collection_of(&mut rt, [3, 1, 2].map(Value::Int)).unwrap();
//! let sorted = rt.call(&numbers, "sort", &[]).unwrap();
//! assert_eq!(sorted, Value::list([1, 2, 3].map(Value::Int)));
//! ```

pub mod compare;
pub mod iter;
pub mod methods;

use mixins::bridge::INITIALIZER;
use mixins::{Bag, ModuleId, Runtime, RuntimeError, Value};
use iter::{array_items, entries, required, FOR_EACH, ITEMS_FIELD};

pub const ENUMERABLE: &str = "Enumerable";
pub const COLLECTION: &str = "Collection";

/// Handles to the installed module and its list-backed class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumerable {
    pub module: ModuleId,
    pub collection: ModuleId,
}

impl Enumerable {
    /// A `Collection` instance holding `items`.
    pub fn collection_of(
        &self,
        rt: &mut Runtime,
        items: impl IntoIterator<Item = Value>,
    ) -> Result<Value, RuntimeError> {
        rt.instantiate(self.collection, &[Value::list(items)])
    }
}

/// Create `Enumerable` and `Collection` in `rt`.
pub fn install(rt: &mut Runtime) -> Result<Enumerable, RuntimeError> {
    let module = rt.create_module(Some(ENUMERABLE), Some(&Value::record(methods::module_bag())))?;

    let mut aliases = Bag::new().method(FOR_EACH, methods::for_each);
    for (alias, original) in methods::ALIASES {
        let method = rt
            .registry()
            .instance_method(module, original)
            .ok_or_else(|| RuntimeError::NoMethod {
                name: original.to_string(),
                receiver: ENUMERABLE.to_string(),
            })?;
        aliases.insert(*alias, Value::Function(method.callable.clone()));
    }
    rt.include(module, &Value::record(aliases))?;

    let collection = rt.derive_class(
        None,
        Some(COLLECTION),
        Some(&Value::record(Bag::new().method(INITIALIZER, initialize_collection))),
    )?;
    rt.include(collection, &Value::Module(module))?;

    log::debug!(
        "installed {} ({} methods)",
        ENUMERABLE,
        rt.registry().resolved_names(module).len()
    );
    Ok(Enumerable { module, collection })
}

/// Copy the non-nil items of a list or of any enumerable into `items`.
fn initialize_collection(rt: &mut Runtime, this: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let object = this.as_object().ok_or(RuntimeError::Type {
        expected: "object",
        found: this.type_name(),
    })?;
    let source = required(INITIALIZER, args, 0)?;
    let items = match array_items(&source) {
        Some(items) => items.into_iter().filter(|item| !item.is_nil()).collect(),
        None => entries(rt, &source)?,
    };
    object.set(ITEMS_FIELD, Value::list(items));
    Ok(Value::Nil)
}
