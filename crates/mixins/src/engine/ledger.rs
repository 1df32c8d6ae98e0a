//! Event ledger for the composition engine.
//!
//! Records definitions, inclusions and every resolved-table change for
//! debugging. Disabled unless `EngineConfig::record_ledger` is set.

use std::sync::Arc;
use super::arena::ModuleId;

/// A recorded event
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Monotonic sequence number
    pub seq: u64,
    pub event: LedgerEvent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    /// `define` stored a new method record
    Defined { module: ModuleId, name: Arc<str>, version: u64 },
    /// `include` added an edge
    Included { base: ModuleId, included: ModuleId },
    /// Propagation changed a resolved entry
    Resolved { module: ModuleId, name: Arc<str>, owner: ModuleId, version: u64 },
    /// A resolved callable was written onto the module's target
    Mirrored { module: ModuleId, name: Arc<str> },
    /// The target kept its native field
    MirrorPreserved { module: ModuleId, name: Arc<str> },
    /// The target refused the write
    MirrorRejected { module: ModuleId, name: Arc<str> },
}

#[derive(Default)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
    next_seq: u64,
    enabled: bool,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, event: LedgerEvent) {
        if self.enabled {
            self.entries.push(LedgerEntry { seq: self.next_seq, event });
            self.next_seq += 1;
        }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Resolved-table changes of one module for one name.
    pub fn resolutions(&self, module: ModuleId, name: &str) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(
                &e.event,
                LedgerEvent::Resolved { module: m, name: n, .. } if *m == module && n.as_ref() == name
            ))
            .collect()
    }
}
