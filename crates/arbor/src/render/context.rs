use crate::component::Component;
use crate::math::Mat4;
use crate::scene::{NodeId, SceneTree};
use crate::time::Time;

use super::backend::GraphicsBackend;
use super::dispatch::RenderStats;
use super::pass::RenderPass;

/// What a `Renderable` component sees during one render call.
///
/// The scene is read-only here; everything that changes state belongs in
/// update.
pub struct RenderContext<'a> {
    pub(crate) scene: &'a SceneTree,
    pub(crate) node: NodeId,
    pub(crate) pass: &'a mut dyn RenderPass,
    pub(crate) backend: &'a mut dyn GraphicsBackend,
    pub(crate) time: &'a Time,
    pub(crate) stats: &'a mut RenderStats,
}

impl<'a> RenderContext<'a> {
    /// `true` if the pass being rendered is a `P`.
    pub fn is_current_render_pass<P: RenderPass>(&self) -> bool {
        self.pass.is::<P>()
    }

    pub fn current_pass(&self) -> &dyn RenderPass {
        &*self.pass
    }

    /// The active pass as a `P`, if it is one.
    pub fn current_pass_mut<P: RenderPass>(&mut self) -> Option<&mut P> {
        self.pass.downcast_mut::<P>()
    }

    /// Product of the ancestors' transforms, root first, stopping at the
    /// first ancestor without one. Identity for a node whose parent has no
    /// transform.
    pub fn accumulated_transform(&self) -> Mat4 {
        self.scene
            .parent(self.node)
            .map_or(Mat4::IDENTITY, |parent| self.scene.world_matrix(parent))
    }

    /// Nearest ancestor holding a `T`.
    pub fn find_in_ancestors<T: Component>(&self) -> Option<&T> {
        let found = self.scene.find_ancestor::<T>(self.node)?;
        self.scene.get(found)
    }

    pub fn scene(&self) -> &SceneTree {
        self.scene
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn time(&self) -> &Time {
        self.time
    }

    /// Direct access to the backend, for components that issue their own
    /// commands.
    pub fn backend_mut(&mut self) -> &mut dyn GraphicsBackend {
        &mut *self.backend
    }

    pub fn stats(&self) -> &RenderStats {
        &*self.stats
    }
}
