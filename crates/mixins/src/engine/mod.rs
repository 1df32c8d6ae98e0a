//! Module composition engine.
//!
//! Modules live in an arena and are addressed by [`ModuleId`]. Inclusion
//! edges are stored on both ends; propagation walks the dependents of a
//! changed module in topological order.

pub mod arena;
pub mod config;
pub mod ledger;
pub mod method;
pub mod mixin;
pub mod node;
pub mod propagation;
pub mod registry;
pub mod snapshot;
pub mod target;

pub use arena::{Arena, ModuleId};
pub use config::{EngineConfig, MergePolicy, TargetConflict};
pub use ledger::{Ledger, LedgerEntry, LedgerEvent};
pub use method::{Callable, Method, MethodRef};
pub use mixin::{Bag, Mixin};
pub use node::ModuleNode;
pub use registry::{Conflict, Inclusion, InclusionKind, ModuleMut, Registry};
pub use snapshot::{GraphSnapshot, ModuleSnapshot};
pub use target::{MirrorOutcome, Prototype, SlotOrigin};
