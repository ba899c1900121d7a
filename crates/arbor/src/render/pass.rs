use crate::component::AsAny;
use crate::error::FrameError;
use crate::math::Mat4;

use super::backend::GraphicsBackend;
use super::dispatch::RenderStats;
use super::{Color, Projection, Viewport};

/// Everything a backend needs to open a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassDescriptor {
    pub label: String,
    pub viewport: Viewport,
    pub view: Mat4,
    pub projection: Mat4,
    /// Clear the viewport to this color before drawing.
    pub clear: Option<Color>,
}

impl PassDescriptor {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// One pass over the scene per frame.
///
/// `begin` and `end` bracket the scene walk. Everything a pass queued must be
/// handed to the backend by `end`; `discard` drops it instead when the frame
/// is abandoned half way.
pub trait RenderPass: AsAny {
    fn name(&self) -> &str;
    fn viewport(&self) -> Viewport;
    fn projection(&self) -> Projection;

    fn begin(&mut self, backend: &mut dyn GraphicsBackend) -> Result<(), FrameError>;

    fn end(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        stats: &mut RenderStats,
    ) -> Result<(), FrameError>;

    /// Drop pending work after a failed walk.
    fn discard(&mut self) {}
}

impl dyn RenderPass + '_ {
    pub fn is<P: RenderPass>(&self) -> bool {
        self.as_any().is::<P>()
    }

    pub fn downcast_ref<P: RenderPass>(&self) -> Option<&P> {
        self.as_any().downcast_ref::<P>()
    }

    pub fn downcast_mut<P: RenderPass>(&mut self) -> Option<&mut P> {
        self.as_any_mut().downcast_mut::<P>()
    }
}
