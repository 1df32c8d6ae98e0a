//! # Error Types
//!
//! The engine is deliberately permissive: malformed mixin fields are skipped
//! and redefinition is the override mechanism. What remains are graph
//! violations, invalid definitions and host-side failures.

use thiserror::Error;

use crate::engine::ModuleId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// The id does not belong to this registry.
    #[error("Unknown module {0}")]
    UnknownModule(ModuleId),

    /// Including `included` into `base` would make `base` its own dependency.
    #[error("Cyclic inclusion: {included} already depends on {base}")]
    CyclicInclusion { base: String, included: String },

    /// `define` was given something that cannot be invoked.
    #[error("Invalid method `{name}`: expected a function, got {found}")]
    InvalidMethod { name: String, found: &'static str },

    #[error("Invalid method name: names must be non-empty")]
    InvalidMethodName,

    /// The module's target refused a mirror write. Propagation is not rolled back.
    #[error("Target of {module} rejected method `{name}`")]
    TargetRejected { module: String, name: String },
}

/// Failures while running methods through the bridge.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Undefined method `{name}` for {receiver}")]
    NoMethod { name: String, receiver: String },

    #[error("{0} is not a class")]
    NotAClass(String),

    #[error("Wrong number of arguments for `{name}`: expected {expected}, got {got}")]
    Arity { name: String, expected: usize, got: usize },

    #[error("Type error: expected {expected}, got {found}")]
    Type { expected: &'static str, found: &'static str },

    /// Raised by a method body.
    #[error("{0}")]
    Raised(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid engine config: {0}")]
    Toml(#[from] toml::de::Error),
}
