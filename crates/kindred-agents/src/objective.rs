//! The objective arena.
//!
//! A person's goals form a stack: position 0 is the root (always a
//! [`Objective::FulfillNeed`]) and the last entry is the leaf being pursued.
//! An [`Obtain`] may record the sub-objectives it spawned, which turns the
//! stack into a forest. Links use stable [`ObjectiveId`]s, so removing an
//! entry from the middle never invalidates the links of the survivors.
//!
//! Two completion protocols exist:
//!
//! - [`ObjectiveStack::complete_leaf`] -- the leaf was satisfied; remove it
//!   and drop it from every child list.
//! - [`ObjectiveStack::complete_branch`] -- a non-leaf `Obtain` was
//!   satisfied by something just seen; remove it together with everything
//!   transitively reachable through its child links.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use kindred_types::{Conditions, Need};

use crate::error::AgentError;

/// Stable handle of an objective within one person's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectiveId(pub u64);

impl fmt::Display for ObjectiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A request to acquire, or stand next to, something matching a
/// descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obtain {
    /// What to look for.
    pub descriptor: Conditions,
    /// Set when the same item is needed again: holding one does not count.
    pub duplicate: bool,
    /// Sub-objectives spawned on behalf of this one.
    pub children: Vec<ObjectiveId>,
}

/// One goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Objective {
    /// Satisfy a need. Always the root.
    FulfillNeed(Need),
    /// Acquire something.
    Obtain(Obtain),
}

impl Objective {
    /// A fresh `Obtain` with no children.
    pub const fn obtain(descriptor: Conditions, duplicate: bool) -> Self {
        Self::Obtain(Obtain {
            descriptor,
            duplicate,
            children: Vec::new(),
        })
    }

    /// The `Obtain` payload, if this is one.
    pub const fn as_obtain(&self) -> Option<&Obtain> {
        match self {
            Self::Obtain(obtain) => Some(obtain),
            Self::FulfillNeed(_) => None,
        }
    }

    const fn as_obtain_mut(&mut self) -> Option<&mut Obtain> {
        match self {
            Self::Obtain(obtain) => Some(obtain),
            Self::FulfillNeed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entry {
    id: ObjectiveId,
    objective: Objective,
}

/// Ordered objectives with stable ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveStack {
    entries: Vec<Entry>,
    next_id: u64,
}

impl ObjectiveStack {
    /// An empty stack.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Number of objectives.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Objectives from root to leaf.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectiveId, &Objective)> + '_ {
        self.entries.iter().map(|e| (e.id, &e.objective))
    }

    /// The root objective.
    pub fn root(&self) -> Option<&Objective> {
        self.entries.first().map(|e| &e.objective)
    }

    /// The active leaf.
    pub fn leaf(&self) -> Option<&Objective> {
        self.entries.last().map(|e| &e.objective)
    }

    /// Id of the active leaf.
    pub fn leaf_id(&self) -> Option<ObjectiveId> {
        self.entries.last().map(|e| e.id)
    }

    /// Objective by id.
    pub fn get(&self, id: ObjectiveId) -> Option<&Objective> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.objective)
    }

    /// Current position of an id.
    pub fn position(&self, id: ObjectiveId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Whether an id is on the stack.
    pub fn contains(&self, id: ObjectiveId) -> bool {
        self.position(id).is_some()
    }

    /// Push a new leaf. When both the parent and the new objective are
    /// `Obtain`s, the parent records the new id as a child.
    pub fn push(&mut self, objective: Objective, parent: Option<ObjectiveId>) -> ObjectiveId {
        let id = ObjectiveId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        if matches!(objective, Objective::Obtain(_))
            && let Some(parent) = parent.and_then(|p| self.entries.iter_mut().find(|e| e.id == p))
            && let Some(obtain) = parent.objective.as_obtain_mut()
        {
            obtain.children.push(id);
        }
        self.entries.push(Entry { id, objective });
        id
    }

    /// Normal completion: remove the leaf and purge its id from every
    /// child list.
    pub fn complete_leaf(&mut self) -> Option<Objective> {
        let entry = self.entries.pop()?;
        for obtain in self.entries.iter_mut().filter_map(|e| e.objective.as_obtain_mut()) {
            obtain.children.retain(|child| *child != entry.id);
        }
        self.check_links();
        Some(entry.objective)
    }

    /// Opportunistic completion: remove `id` and every objective reachable
    /// from it through child links. Returns the removed ids.
    pub fn complete_branch(&mut self, id: ObjectiveId) -> Result<Vec<ObjectiveId>, AgentError> {
        if !self.contains(id) {
            return Err(AgentError::ObjectiveNotFound(id));
        }
        let mut marked = BTreeSet::new();
        let mut queue = vec![id];
        while let Some(current) = queue.pop() {
            if !marked.insert(current) {
                continue;
            }
            if let Some(obtain) = self.get(current).and_then(Objective::as_obtain) {
                queue.extend(obtain.children.iter().filter(|c| !marked.contains(c)));
            }
        }

        self.entries.retain(|e| !marked.contains(&e.id));
        for obtain in self.entries.iter_mut().filter_map(|e| e.objective.as_obtain_mut()) {
            obtain.children.retain(|child| !marked.contains(child));
        }
        self.check_links();
        Ok(marked.into_iter().collect())
    }

    /// [`complete_branch`](Self::complete_branch) addressed by position.
    pub fn complete_branch_at(&mut self, index: usize) -> Result<Vec<ObjectiveId>, AgentError> {
        let id = self
            .entries
            .get(index)
            .map(|e| e.id)
            .ok_or(AgentError::PositionOutOfRange {
                index,
                len: self.entries.len(),
            })?;
        self.complete_branch(id)
    }

    /// Drop everything above the root.
    pub fn reset_to_root(&mut self) {
        self.entries.truncate(1);
        self.check_links();
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Every child link must point at a live entry.
    fn check_links(&self) {
        debug_assert!(
            self.entries
                .iter()
                .filter_map(|e| e.objective.as_obtain())
                .flat_map(|o| o.children.iter())
                .all(|child| self.contains(*child)),
            "objective child link points outside the stack"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use kindred_types::ItemId;

    use super::*;

    fn obtain(id: u32) -> Objective {
        Objective::obtain(Conditions::is(ItemId(id)), false)
    }

    fn children(stack: &ObjectiveStack, id: ObjectiveId) -> Vec<ObjectiveId> {
        stack.get(id).and_then(Objective::as_obtain).unwrap().children.clone()
    }

    #[test]
    fn push_links_obtain_children_only() {
        let mut stack = ObjectiveStack::new();
        let root = stack.push(Objective::FulfillNeed(Need::Hunger), None);
        let a = stack.push(obtain(1), Some(root));
        let b = stack.push(obtain(2), Some(a));
        assert_eq!(children(&stack, a), vec![b]);
        assert_eq!(stack.leaf_id(), Some(b));
        assert_eq!(stack.root(), Some(&Objective::FulfillNeed(Need::Hunger)));
    }

    #[test]
    fn complete_leaf_purges_its_id() {
        let mut stack = ObjectiveStack::new();
        stack.push(Objective::FulfillNeed(Need::Hunger), None);
        let a = stack.push(obtain(1), None);
        let b = stack.push(obtain(2), Some(a));
        let c = stack.push(obtain(3), Some(a));

        let done = stack.complete_leaf().unwrap();
        assert_eq!(done, obtain(3));
        assert_eq!(children(&stack, a), vec![b]);
        assert!(!stack.contains(c));
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn complete_branch_removes_transitive_children() {
        let mut stack = ObjectiveStack::new();
        stack.push(Objective::FulfillNeed(Need::Hunger), None);
        let a = stack.push(obtain(1), None);
        let b = stack.push(obtain(2), Some(a));
        let c = stack.push(obtain(3), None);
        let d = stack.push(obtain(4), Some(b));
        let e = stack.push(obtain(5), Some(c));

        let removed = stack.complete_branch(b).unwrap();
        assert_eq!(removed, vec![b, d]);
        assert_eq!(stack.len(), 4);
        assert!(children(&stack, a).is_empty());
        // Survivors keep their links across the removal.
        assert_eq!(children(&stack, c), vec![e]);
        assert_eq!(stack.position(e), Some(3));
    }

    #[test]
    fn complete_branch_tolerates_cycles() {
        let mut stack = ObjectiveStack::new();
        let a = stack.push(obtain(1), None);
        let b = stack.push(obtain(2), Some(a));
        stack.entries[1].objective.as_obtain_mut().unwrap().children.push(a);
        let removed = stack.complete_branch_at(0).unwrap();
        assert_eq!(removed, vec![a, b]);
        assert!(stack.is_empty());
    }

    #[test]
    fn missing_targets_are_errors() {
        let mut stack = ObjectiveStack::new();
        assert_eq!(
            stack.complete_branch(ObjectiveId(9)),
            Err(AgentError::ObjectiveNotFound(ObjectiveId(9)))
        );
        assert_eq!(
            stack.complete_branch_at(2),
            Err(AgentError::PositionOutOfRange { index: 2, len: 0 })
        );
        assert!(stack.complete_leaf().is_none());
    }

    #[test]
    fn reset_keeps_root() {
        let mut stack = ObjectiveStack::new();
        stack.push(Objective::FulfillNeed(Need::Temperature), None);
        stack.push(obtain(1), None);
        stack.push(obtain(2), None);
        stack.reset_to_root();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.leaf(), Some(&Objective::FulfillNeed(Need::Temperature)));
    }
}
