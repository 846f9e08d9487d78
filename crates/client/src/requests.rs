use std::collections::BTreeSet;

use grasp::{ObjectId, Verb};

/// Ownership requests sent to the authority and not yet answered.
///
/// Every request is answered exactly once, either by the matching broadcast
/// or by a deny, so entries are only ever removed by an answer or by the
/// object disappearing.
#[derive(Debug, Default, Clone)]
pub struct PendingRequests {
    outstanding: BTreeSet<(Verb, ObjectId)>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the same request is already outstanding.
    pub fn insert(&mut self, verb: Verb, target: ObjectId) -> bool {
        self.outstanding.insert((verb, target))
    }

    pub fn resolve(&mut self, verb: Verb, target: ObjectId) -> bool {
        self.outstanding.remove(&(verb, target))
    }

    pub fn contains(&self, verb: Verb, target: ObjectId) -> bool {
        self.outstanding.contains(&(verb, target))
    }

    pub fn forget_object(&mut self, target: ObjectId) {
        self.outstanding.retain(|&(_, id)| id != target);
    }

    pub fn clear(&mut self) {
        self.outstanding.clear();
    }

    pub fn len(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outstanding.is_empty()
    }
}
