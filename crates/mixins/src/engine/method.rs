use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use super::arena::ModuleId;
use crate::bridge::Runtime;
use crate::error::RuntimeError;
use crate::value::Value;

/// Signature of every method body: runtime, receiver, positional arguments.
pub type NativeFn = dyn Fn(&mut Runtime, &Value, &[Value]) -> Result<Value, RuntimeError>;

/// Shared, invocable method body. Compared by identity.
#[derive(Clone)]
pub struct Callable(Rc<NativeFn>);

impl Callable {
    pub fn new(
        f: impl Fn(&mut Runtime, &Value, &[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, rt: &mut Runtime, receiver: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.0)(rt, receiver, args)
    }

    /// Identity comparison. Two callables are equal only if they share a body.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// A method record. Immutable once created; redefinition creates a new record.
#[derive(Debug)]
pub struct Method {
    pub name: Arc<str>,
    pub callable: Callable,
    /// Module whose `define` created this record
    pub owner: ModuleId,
    /// Registry-wide definition counter
    pub version: u64,
}

pub type MethodRef = Rc<Method>;

impl Method {
    pub fn new(name: Arc<str>, callable: Callable, owner: ModuleId, version: u64) -> MethodRef {
        Rc::new(Self { name, callable, owner, version })
    }
}

/// Same record, not merely the same body.
pub fn same_method(a: Option<&MethodRef>, b: Option<&MethodRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
