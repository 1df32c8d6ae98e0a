//! Propagation of method changes to dependents.
//!
//! A change at `origin` affects `origin` and every module that reaches it
//! through dependent edges. Those modules are visited once each, in
//! topological order (dependencies before dependents), with an explicit
//! worklist. For every changed name a module recomputes its winner:
//!
//! 1. its own method, if it defines one;
//! 2. otherwise the resolved method of its most recently included
//!    dependency that has one.
//!
//! Because dependencies are settled before their dependents, each module
//! is recomputed against final inputs and touches its target at most once.

use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use rustc_hash::{FxHashMap, FxHashSet};
use super::arena::ModuleId;
use super::config::MergePolicy;
use super::ledger::LedgerEvent;
use super::method::{same_method, MethodRef};
use super::registry::{Conflict, Registry};
use super::target::{MirrorOutcome, Rejected};
use crate::error::EngineError;

impl Registry {
    /// Recompute `names` in `origin` and all its transitive dependents.
    ///
    /// Mirror failures do not stop the walk: every module is still updated
    /// and the first failure is returned afterwards.
    pub(crate) fn propagate(&mut self, origin: ModuleId, names: &[Arc<str>]) -> Result<(), EngineError> {
        if names.is_empty() {
            return Ok(());
        }
        let order = self.affected_order(origin)?;
        let mut first_error = None;
        for id in order {
            for name in names {
                if let Err(error) = self.apply(id, name) {
                    first_error.get_or_insert(error);
                }
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// `origin` and its transitive dependents, dependencies first.
    fn affected_order(&self, origin: ModuleId) -> Result<Vec<ModuleId>, EngineError> {
        let mut affected = FxHashSet::default();
        let mut stack = vec![origin];
        while let Some(id) = stack.pop() {
            if affected.insert(id) {
                stack.extend_from_slice(&self.node(id)?.dependents);
            }
        }

        // In-degree counts only edges inside the affected set.
        let mut indegree: FxHashMap<ModuleId, usize> = FxHashMap::default();
        for &id in &affected {
            let count = self
                .node(id)?
                .dependencies
                .iter()
                .filter(|dep| affected.contains(*dep))
                .count();
            indegree.insert(id, count);
        }

        let mut ready: Vec<ModuleId> = indegree
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&id, _)| id)
            .collect();
        ready.sort();
        let mut queue: VecDeque<ModuleId> = ready.into();
        let mut order = Vec::with_capacity(affected.len());

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for dependent in &self.node(id)?.dependents {
                if let Some(count) = indegree.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }

        if order.len() < affected.len() {
            log::warn!(
                "propagation from {} stopped: dependency cycle among {} modules",
                self.display_name(origin),
                affected.len() - order.len()
            );
            return Err(EngineError::CyclicInclusion {
                base: self.display_name(origin),
                included: self.display_name(origin),
            });
        }
        Ok(order)
    }

    /// Winning method for `name` in `id`, plus the owners it shadows.
    fn winner(&self, id: ModuleId, name: &str) -> (Option<MethodRef>, Vec<ModuleId>) {
        let Some(node) = self.arena.get(id) else {
            return (None, Vec::new());
        };
        if let Some(own) = node.own_methods.get(name) {
            return (Some(own.clone()), Vec::new());
        }

        let mut candidates = node
            .dependencies
            .iter()
            .rev()
            .filter_map(|dep| self.arena.get(*dep)?.resolved.get(name));
        let Some(winner) = candidates.next().cloned() else {
            return (None, Vec::new());
        };

        let mut shadowed = Vec::new();
        if self.config.merge_policy == MergePolicy::ReportConflicts {
            for candidate in candidates {
                if !Rc::ptr_eq(candidate, &winner) && !shadowed.contains(&candidate.owner) {
                    shadowed.push(candidate.owner);
                }
            }
        }
        (Some(winner), shadowed)
    }

    /// Recompute one entry; store and mirror it when it changed.
    fn apply(&mut self, id: ModuleId, name: &Arc<str>) -> Result<(), EngineError> {
        let (winner, shadowed) = self.winner(id, name);
        let node = self.node_mut(id)?;
        if same_method(node.resolved.get(name), winner.as_ref()) {
            return Ok(());
        }
        // Methods are never removed, so a changed entry always has a winner.
        let Some(method) = winner else {
            return Ok(());
        };
        node.resolved.insert(name.clone(), method.clone());
        self.ledger.record(LedgerEvent::Resolved {
            module: id,
            name: name.clone(),
            owner: method.owner,
            version: method.version,
        });

        if !shadowed.is_empty() {
            log::warn!(
                "{}#{}: method from {} shadows {}",
                self.display_name(id),
                name,
                self.display_name(method.owner),
                shadowed.iter().map(|m| self.display_name(*m)).collect::<Vec<_>>().join(", ")
            );
            self.conflicts.push(Conflict {
                module: id,
                name: name.clone(),
                winner: method.owner,
                shadowed,
            });
        }

        self.mirror(id, name, &method)
    }

    /// Write the resolved callable onto the module's target, if it has one.
    fn mirror(&mut self, id: ModuleId, name: &Arc<str>, method: &MethodRef) -> Result<(), EngineError> {
        let policy = self.config.target_conflict;
        let Some(node) = self.arena.get_mut(id) else {
            return Ok(());
        };
        let Some(target) = node.target.as_mut() else {
            return Ok(());
        };
        match target.mirror(name, &method.callable, policy) {
            Ok(MirrorOutcome::Written) => {
                log::trace!("mirror {}#{}", node.display_name(), name);
                self.ledger.record(LedgerEvent::Mirrored { module: id, name: name.clone() });
                Ok(())
            }
            Ok(MirrorOutcome::Unchanged) => Ok(()),
            Ok(MirrorOutcome::Preserved) => {
                log::debug!("{}#{}: keeping native field", node.display_name(), name);
                self.ledger.record(LedgerEvent::MirrorPreserved { module: id, name: name.clone() });
                Ok(())
            }
            Err(Rejected) => {
                let module = node.display_name();
                log::warn!("target of {} rejected `{}`", module, name);
                self.ledger.record(LedgerEvent::MirrorRejected { module: id, name: name.clone() });
                Err(EngineError::TargetRejected { module, name: name.to_string() })
            }
        }
    }
}
