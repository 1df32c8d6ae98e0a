//! # mixins
//!
//! Ruby-style module composition for a host object model that only knows
//! single inheritance.
//!
//! - **Engine**: modules as nodes of a live dependency graph. `define` and
//!   `include` keep every dependent's resolved method table up to date.
//! - **Bridge**: classes backed by modules, objects, and method dispatch.
//!
//! ```
//! use mixins::{Bag, Runtime, Value};
//!
//! let mut rt = Runtime::new();
//! let greet = rt.create_module(Some("Greet"), Some(&Value::record(
//!     Bag::new().method("hello", |_, _, _| Ok(Value::str("hi"))),
//! ))).unwrap();
//! let person = rt.derive_class(None, Some("Person"), Some(&Value::Module(greet))).unwrap();
//! let alice = rt.instantiate(person, &[]).unwrap();
//! assert_eq!(rt.call(&alice, "hello", &[]).unwrap(), Value::str("hi"));
//! ```

pub mod bridge;
pub mod engine;
pub mod error;
pub mod value;

pub use bridge::{ObjectRef, Runtime};
pub use engine::{
    Bag, Callable, EngineConfig, MergePolicy, Method, MethodRef, Mixin, ModuleId, Prototype,
    Registry, TargetConflict,
};
pub use error::{ConfigError, EngineError, RuntimeError};
pub use value::Value;
