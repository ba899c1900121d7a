//! # Node Ids — Generational Handles into the Scene Arena
//!
//! A [`NodeId`] is just a number pair; it owns nothing. The
//! [`SceneTree`](super::SceneTree) stores nodes in a `Vec` and hands out ids
//! that index into it. Parents refer to children and children refer to their
//! parent by id, so there are no reference cycles and no `Rc<RefCell<_>>`
//! webs to untangle.
//!
//! ## Generations
//!
//! Destroyed slots are recycled. The tree keeps a generation counter next to
//! each slot and bumps it when the slot's node is destroyed, so an id kept
//! around after its node was destroyed no longer matches and every lookup
//! with it fails cleanly:
//!
//! ```text
//! NodeId { index: 5, generation: 0 }  ← first use of the slot
//! NodeId { index: 5, generation: 1 }  ← after the slot is recycled
//! ```

use std::fmt;

/// Handle to a node in a [`SceneTree`](super::SceneTree).
///
/// Only valid for the tree that created it, and only while its generation
/// matches.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Returns the raw slot index. Useful for diagnostics.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation. Useful for diagnostics.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}
