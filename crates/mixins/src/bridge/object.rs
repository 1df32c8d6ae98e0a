use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use indexmap::IndexMap;
use crate::engine::ModuleId;
use crate::value::Value;

/// An instance: its class plus its own fields.
pub struct Object {
    class: ModuleId,
    fields: IndexMap<Arc<str>, Value>,
}

/// Shared handle to an instance. Compared by identity.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    pub fn new(class: ModuleId) -> Self {
        Self(Rc::new(RefCell::new(Object {
            class,
            fields: IndexMap::new(),
        })))
    }

    pub fn class(&self) -> ModuleId {
        self.0.borrow().class
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().fields.get(name).cloned()
    }

    pub fn set(&self, name: impl Into<Arc<str>>, value: Value) {
        self.0.borrow_mut().fields.insert(name.into(), value);
    }

    pub fn field_names(&self) -> Vec<Arc<str>> {
        self.0.borrow().fields.keys().cloned().collect()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Field values are left out: objects may reference each other.
        let object = self.0.borrow();
        write!(f, "#<Object {} ", object.class)?;
        f.debug_list().entries(object.fields.keys()).finish()?;
        write!(f, ">")
    }
}
