//! # Scene Tree — Arena-Allocated Component Hierarchy
//!
//! Every entity and every component lives on a node of one [`SceneTree`].
//! Nodes are stored in a flat arena and refer to each other by [`NodeId`]:
//!
//! ```text
//!   slots: [ Some(Ship) , Some(Transform) , None , Some(Sprite) ]
//!               │  ▲            │  ▲                    ▲
//!     children ─┘  └── parent ──┘  └──── parent ────────┘
//!
//!   Ship (root)
//!    └── Transform
//!         └── Sprite
//! ```
//!
//! The parent link is a plain id, so nothing owns "upward" and there are no
//! reference cycles. Children are kept in creation order, which is also the
//! order update and render visit them.
//!
//! ## Invariants
//!
//! - Nodes are only ever created under an existing parent (or as a root), and
//!   there is no re-parenting, so the tree can never contain a cycle.
//! - A node's path from its root is fixed for its whole lifetime.
//! - Destroying a node destroys its subtree and detaches it from its parent.
//!   Ids of destroyed nodes go stale and every lookup with them fails.
//!
//! ## Transform Composition
//!
//! [`SceneTree::world_matrix`] walks upward from a node, multiplying the
//! matrix of every node whose component has the `HasTransform` capability,
//! and stops at the first node without one:
//!
//! ```text
//!   A (transform) ── B (transform) ── C (no transform) ── D (transform)
//!
//!   world_matrix(D) = D                 (C breaks the chain)
//!   world_matrix(B) = A · B
//! ```

mod node;
mod tree;

pub use node::NodeId;
pub use tree::SceneTree;
