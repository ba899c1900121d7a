use crate::component::{Component, ComponentRef};
use crate::error::SceneError;
use crate::math::Mat4;

use super::node::NodeId;

struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    value: Option<Box<dyn Component>>,
}

/// An arena entry. The generation outlives the node so that ids of the
/// destroyed node stop matching once the slot is reused.
///
/// ```text
/// slots:  [ {gen 0, Some} , {gen 1, None} , {gen 2, Some} ]
/// vacant: [ 1 ]
/// ```
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of scene nodes.
pub struct SceneTree {
    slots: Vec<Slot>,
    vacant: Vec<u32>,
    live: usize,
    roots: Vec<NodeId>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            live: 0,
            roots: Vec::new(),
        }
    }

    // ── Create / Destroy ─────────────────────────────────────────────

    /// Create a parentless node.
    pub fn create_root(&mut self, value: Option<Box<dyn Component>>) -> NodeId {
        let id = self.insert(None, value);
        self.roots.push(id);
        id
    }

    /// Create a node as the last child of `parent`.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        value: Option<Box<dyn Component>>,
    ) -> Result<NodeId, SceneError> {
        if !self.is_alive(parent) {
            return Err(SceneError::StaleNode(parent));
        }
        let id = self.insert(Some(parent), value);
        if let Some(node) = self.node_mut(parent) {
            node.children.push(id);
        }
        Ok(id)
    }

    /// Create a node holding `component`, under `parent` or as a root.
    pub fn attach<C: Component>(
        &mut self,
        parent: Option<NodeId>,
        component: C,
    ) -> Result<ComponentRef<C>, SceneError> {
        let value: Box<dyn Component> = Box::new(component);
        let id = match parent {
            Some(parent) => self.create_child(parent, Some(value))?,
            None => self.create_root(Some(value)),
        };
        Ok(ComponentRef::new(id))
    }

    fn insert(&mut self, parent: Option<NodeId>, value: Option<Box<dyn Component>>) -> NodeId {
        let node = Node {
            parent,
            children: Vec::new(),
            value,
        };
        self.live += 1;
        match self.vacant.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Destroy a node and its whole subtree, detaching it from its parent.
    ///
    /// Returns `false` if the node was already gone.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }

        match self.parent(id) {
            Some(parent) => {
                if let Some(node) = self.node_mut(parent) {
                    node.children.retain(|&child| child != id);
                }
            }
            None => self.roots.retain(|&root| root != id),
        }

        let mut to_destroy = vec![id];
        let mut i = 0;
        while i < to_destroy.len() {
            let current = to_destroy[i];
            to_destroy.extend_from_slice(self.children(current));
            i += 1;
        }

        for node in to_destroy {
            let slot = &mut self.slots[node.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.vacant.push(node.index);
            self.live -= 1;
        }
        true
    }

    /// Destroy every node.
    pub fn clear(&mut self) {
        for root in self.roots.clone() {
            self.destroy(root);
        }
    }

    // ── Values ───────────────────────────────────────────────────────

    /// Replace the component on a node, returning the previous one.
    pub fn set_value(
        &mut self,
        id: NodeId,
        value: Box<dyn Component>,
    ) -> Result<Option<Box<dyn Component>>, SceneError> {
        let node = self.node_mut(id).ok_or(SceneError::StaleNode(id))?;
        Ok(node.value.replace(value))
    }

    /// Move the component out of its node so it can be called with mutable
    /// access to the rest of the tree. Pair with [`restore_value`].
    ///
    /// [`restore_value`]: Self::restore_value
    pub(crate) fn take_value(
        &mut self,
        id: NodeId,
    ) -> Result<Option<Box<dyn Component>>, SceneError> {
        let node = self.node_mut(id).ok_or(SceneError::StaleNode(id))?;
        Ok(node.value.take())
    }

    /// Put a taken component back. Returns `false` (and drops the value) if
    /// the node was destroyed in the meantime.
    pub(crate) fn restore_value(&mut self, id: NodeId, value: Box<dyn Component>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.value = Some(value);
                true
            }
            None => false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parentless nodes in creation order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children in creation order. Empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// The component attached to a node, if any.
    pub fn value(&self, id: NodeId) -> Option<&dyn Component> {
        self.node(id)?.value.as_deref()
    }

    pub fn value_mut(&mut self, id: NodeId) -> Option<&mut dyn Component> {
        match self.node_mut(id)?.value.as_mut() {
            Some(value) => Some(value.as_mut()),
            None => None,
        }
    }

    /// Resolve a typed handle.
    pub fn get<T: Component>(&self, handle: ComponentRef<T>) -> Option<&T> {
        self.component::<T>(handle.node())
    }

    pub fn get_mut<T: Component>(&mut self, handle: ComponentRef<T>) -> Option<&mut T> {
        self.component_mut::<T>(handle.node())
    }

    /// The component on `id`, if it is a `T`.
    pub fn component<T: Component>(&self, id: NodeId) -> Option<&T> {
        self.value(id)?.downcast_ref::<T>()
    }

    pub fn component_mut<T: Component>(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id)?.value.as_mut()?.downcast_mut::<T>()
    }

    /// Ancestors of `id`, nearest first. Does not include `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&node| self.parent(node))
    }

    /// Every node below `id` in pre-order (the order update and render use).
    /// Does not include `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    /// Nodes from the root down to and including `id`. Empty for stale ids.
    pub fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        if !self.is_alive(id) {
            return Vec::new();
        }
        let mut path: Vec<NodeId> = std::iter::once(id).chain(self.ancestors(id)).collect();
        path.reverse();
        path
    }

    /// Nearest ancestor holding a `T`.
    pub fn find_ancestor<T: Component>(&self, id: NodeId) -> Option<ComponentRef<T>> {
        self.ancestors(id)
            .find(|&node| self.value(node).is_some_and(|value| value.is::<T>()))
            .map(ComponentRef::new)
    }

    /// First descendant (pre-order) holding a `T`.
    pub fn find_descendant<T: Component>(&self, id: NodeId) -> Option<ComponentRef<T>> {
        self.descendants(id)
            .into_iter()
            .find(|&node| self.value(node).is_some_and(|value| value.is::<T>()))
            .map(ComponentRef::new)
    }

    /// Composed matrix of `id` and its transform-carrying ancestors.
    ///
    /// Walks upward starting at `id` and stops at the first node (including
    /// `id` itself) whose component lacks the `HasTransform` capability. The
    /// product is in root-to-leaf order. Returns identity when `id` itself
    /// has no transform.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current {
            let Some(local) = self
                .value(node)
                .and_then(|value| value.as_transform())
                .map(|transform| transform.matrix())
            else {
                break;
            };
            matrix = local * matrix;
            current = self.parent(node);
        }
        matrix
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}
