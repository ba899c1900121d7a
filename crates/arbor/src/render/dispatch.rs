use crate::error::FrameError;
use crate::scene::{NodeId, SceneTree};
use crate::time::Time;

use super::backend::GraphicsBackend;
use super::context::RenderContext;
use super::pass::RenderPass;

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Passes begun.
    pub passes: u32,
    /// Render callbacks made, across all passes.
    pub rendered: u32,
    /// 2D batch flushes.
    pub flushes: u32,
    /// Sprites queued into 2D batches.
    pub sprites: u32,
    /// Meshes drawn by 3D passes.
    pub meshes: u32,
}

/// The ordered list of passes rendered every frame.
#[derive(Default)]
pub struct RenderPipeline {
    passes: Vec<Box<dyn RenderPass>>,
    stats: RenderStats,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pass. Passes run in the order they were added.
    pub fn add_pass<P: RenderPass>(&mut self, pass: P) -> &mut Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn add_boxed_pass(&mut self, pass: Box<dyn RenderPass>) -> &mut Self {
        self.passes.push(pass);
        self
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// The first registered pass of type `P`.
    pub fn pass<P: RenderPass>(&self) -> Option<&P> {
        self.passes.iter().find_map(|pass| pass.downcast_ref::<P>())
    }

    pub fn pass_mut<P: RenderPass>(&mut self) -> Option<&mut P> {
        self.passes.iter_mut().find_map(|pass| pass.downcast_mut::<P>())
    }

    /// Counters from the most recent frame.
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Run every pass over the scene.
    ///
    /// A failing callback or pass end stops the frame: the active pass
    /// discards its pending draws, the backend pass is closed, and the error
    /// is returned. Later passes do not run.
    pub fn render_frame(
        &mut self,
        scene: &mut SceneTree,
        backend: &mut dyn GraphicsBackend,
        time: &Time,
    ) -> Result<RenderStats, FrameError> {
        let mut stats = RenderStats::default();
        for pass in &mut self.passes {
            let pass: &mut dyn RenderPass = &mut **pass;
            pass.begin(backend)?;
            stats.passes += 1;

            let mut walked = Ok(());
            for root in scene.roots().to_vec() {
                walked = render_subtree(scene, root, pass, backend, time, &mut stats);
                if walked.is_err() {
                    break;
                }
            }

            if let Err(err) = walked.and_then(|()| pass.end(backend, &mut stats)) {
                abandon(pass, backend);
                self.stats = stats;
                return Err(err);
            }
        }

        log::trace!(
            "frame rendered: {} passes, {} renders, {} flushes, {} sprites, {} meshes",
            stats.passes,
            stats.rendered,
            stats.flushes,
            stats.sprites,
            stats.meshes
        );
        self.stats = stats;
        Ok(stats)
    }
}

fn abandon(pass: &mut dyn RenderPass, backend: &mut dyn GraphicsBackend) {
    log::debug!("render pass `{}` failed, discarding pending draws", pass.name());
    pass.discard();
    if backend.end_pass().is_err() {
        log::debug!("backend pass `{}` was already closed", pass.name());
    }
}

/// Render `node` and everything below it in pre-order during `pass`.
///
/// Disabled components are skipped with their whole subtree, before the pass
/// is even looked at. Enabled `Renderable`s get exactly one call if they
/// accept the pass.
pub fn render_subtree(
    scene: &mut SceneTree,
    node: NodeId,
    pass: &mut dyn RenderPass,
    backend: &mut dyn GraphicsBackend,
    time: &Time,
    stats: &mut RenderStats,
) -> Result<(), FrameError> {
    if let Some(mut component) = scene.take_value(node)? {
        if !component.is_enabled() {
            scene.restore_value(node, component);
            return Ok(());
        }

        let result = match component.as_renderable() {
            Some(renderable) if renderable.supports_pass(&*pass) => {
                stats.rendered += 1;
                let mut ctx = RenderContext {
                    scene: &*scene,
                    node,
                    pass: &mut *pass,
                    backend: &mut *backend,
                    time,
                    stats: &mut *stats,
                };
                renderable.render(&mut ctx)
            }
            _ => Ok(()),
        };
        let name = component.component_name();
        scene.restore_value(node, component);
        result.map_err(|source| FrameError::Callback {
            component: name,
            node,
            source: Box::new(source),
        })?;
    }

    for child in scene.children(node).to_vec() {
        render_subtree(scene, child, pass, backend, time, stats)?;
    }
    Ok(())
}
