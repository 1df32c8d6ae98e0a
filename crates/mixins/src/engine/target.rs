//! Host object that mirrors a module's resolved methods.
//!
//! The bridge gives every class a prototype; the engine writes each resolved
//! `(name, callable)` pair onto it so instances find methods without knowing
//! about inclusion.

use std::sync::Arc;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use super::config::TargetConflict;
use super::method::Callable;
use crate::value::Value;

/// Who put a field on the prototype.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotOrigin {
    /// Set by the host, outside the engine
    Native,
    /// Written by propagation
    Mirrored,
}

#[derive(Clone, Debug)]
pub struct Slot {
    pub value: Value,
    pub origin: SlotOrigin,
}

/// Result of a mirror write that the prototype accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MirrorOutcome {
    Written,
    /// Same callable already present
    Unchanged,
    /// Native field kept under `TargetConflict::PreserveNative`
    Preserved,
}

/// A sealed prototype rejected a write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejected;

#[derive(Clone, Debug, Default)]
pub struct Prototype {
    slots: IndexMap<Arc<str>, Slot, FxBuildHasher>,
    sealed: bool,
}

impl Prototype {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sealed prototype rejects every further write, native or mirrored.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Place a field the way the host would, bypassing the engine.
    pub fn define_native(&mut self, name: impl Into<Arc<str>>, value: Value) -> Result<(), Rejected> {
        if self.sealed {
            return Err(Rejected);
        }
        self.slots.insert(name.into(), Slot { value, origin: SlotOrigin::Native });
        Ok(())
    }

    pub fn mirror(
        &mut self,
        name: &Arc<str>,
        callable: &Callable,
        policy: TargetConflict,
    ) -> Result<MirrorOutcome, Rejected> {
        if let Some(slot) = self.slots.get(name) {
            if let Value::Function(existing) = &slot.value {
                if existing.ptr_eq(callable) {
                    return Ok(MirrorOutcome::Unchanged);
                }
            }
            if slot.origin == SlotOrigin::Native && policy == TargetConflict::PreserveNative {
                return Ok(MirrorOutcome::Preserved);
            }
        }
        if self.sealed {
            return Err(Rejected);
        }
        self.slots.insert(
            name.clone(),
            Slot { value: Value::Function(callable.clone()), origin: SlotOrigin::Mirrored },
        );
        Ok(MirrorOutcome::Written)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).map(|slot| &slot.value)
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// Callable stored under `name`, if the field holds one.
    pub fn method(&self, name: &str) -> Option<&Callable> {
        self.get(name).and_then(Value::as_callable)
    }

    pub fn names(&self) -> impl Iterator<Item = &Arc<str>> {
        self.slots.keys()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
