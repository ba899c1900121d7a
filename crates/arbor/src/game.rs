//! The game loop.
//!
//! A [`Game`] owns the scene, the render pipeline and the graphics backend.
//! Every frame is one [`tick`](Game::tick):
//!
//! ```text
//!   time.advance / time.update
//!   update_all(scene)                 every Updatable, pre-order
//!   pipeline.render_frame(scene)      every pass, in registration order
//!   backend.present()
//! ```
//!
//! All updates of a frame finish before its first render call. A failing
//! callback ends the tick with the error; the loop does not retry it.
//!
//! # Example
//!
//! ```ignore
//! use arbor::prelude::*;
//!
//! let config = EngineConfig::default();
//! let mut game = Game::builder(&config).with_default_passes().build();
//! game.spawn::<Ship>(&kernel, None)?;
//! game.run()?;
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::component::Component;
use crate::config::EngineConfig;
use crate::entity::Entity;
use crate::error::{FrameError, InjectionError};
use crate::kernel::{Injectable, Kernel};
use crate::render::{GraphicsBackend, NullBackend, RenderPass, RenderPipeline, RenderStats};
use crate::scene::{NodeId, SceneTree};
use crate::time::Time;
use crate::update::update_all;

/// Shared flag that stops a running loop after the current frame.
///
/// Clone it into whatever needs to end the game (bind it in the kernel to
/// hand it to components).
#[derive(Debug, Clone, Default)]
pub struct ExitHandle(Rc<Cell<bool>>);

impl ExitHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_exit(&self) {
        self.0.set(true);
    }

    pub fn is_exit_requested(&self) -> bool {
        self.0.get()
    }
}

/// Scene, passes and backend driven by a frame loop.
pub struct Game {
    title: String,
    scene: SceneTree,
    pipeline: RenderPipeline,
    backend: Box<dyn GraphicsBackend>,
    time: Time,
    fixed_delta: Option<Duration>,
    frame_limit: Option<u64>,
    exit: ExitHandle,
}

impl Game {
    /// Builder seeded from `config`.
    pub fn builder(config: &EngineConfig) -> GameBuilder {
        GameBuilder::new(config)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn scene(&self) -> &SceneTree {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneTree {
        &mut self.scene
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut RenderPipeline {
        &mut self.pipeline
    }

    pub fn backend(&self) -> &dyn GraphicsBackend {
        &*self.backend
    }

    pub fn backend_mut(&mut self) -> &mut dyn GraphicsBackend {
        &mut *self.backend
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn exit_handle(&self) -> ExitHandle {
        self.exit.clone()
    }

    pub fn request_exit(&self) {
        self.exit.request_exit();
    }

    /// Spawn an `E` into the game's scene.
    pub fn spawn<E>(&mut self, kernel: &Kernel, parent: Option<NodeId>) -> Result<Entity, InjectionError>
    where
        E: Component + Injectable,
    {
        Entity::spawn::<E>(kernel, &mut self.scene, parent)
    }

    /// Run one frame: advance time, update everything, render every pass,
    /// present.
    pub fn tick(&mut self) -> Result<RenderStats, FrameError> {
        match self.fixed_delta {
            Some(delta) => self.time.advance(delta),
            None => self.time.update(),
        }
        let updated = update_all(&mut self.scene, &self.time)?;
        let stats = self
            .pipeline
            .render_frame(&mut self.scene, &mut *self.backend, &self.time)?;
        self.backend.present()?;
        log::trace!(
            "frame {}: {updated} updates, {} renders",
            self.time.frame_count(),
            stats.rendered
        );
        Ok(stats)
    }

    /// Tick until the frame limit is reached or an exit is requested.
    /// Returns the number of frames run.
    pub fn run(&mut self) -> Result<u64, FrameError> {
        log::info!("starting `{}`", self.title);
        let mut frames = 0;
        while !self.exit.is_exit_requested() && self.frame_limit.is_none_or(|limit| frames < limit)
        {
            self.tick()?;
            frames += 1;
        }
        log::info!("`{}` stopped after {frames} frames", self.title);
        Ok(frames)
    }
}

/// Configures a [`Game`].
pub struct GameBuilder {
    title: String,
    config: EngineConfig,
    pipeline: RenderPipeline,
    backend: Box<dyn GraphicsBackend>,
    frame_limit: Option<u64>,
    fixed_delta: Option<Duration>,
    exit: ExitHandle,
}

impl GameBuilder {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            title: config.title.clone(),
            config: config.clone(),
            pipeline: RenderPipeline::new(),
            backend: Box::new(NullBackend::new()),
            frame_limit: config.frame_limit,
            fixed_delta: config.fixed_delta(),
            exit: ExitHandle::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn backend<B: GraphicsBackend>(mut self, backend: B) -> Self {
        self.backend = Box::new(backend);
        self
    }

    /// Append a pass; passes render in the order they are added.
    pub fn pass<P: RenderPass>(mut self, pass: P) -> Self {
        self.pipeline.add_pass(pass);
        self
    }

    /// The built-in 3D pass followed by the built-in 2D pass, set up from
    /// the engine config. Sprites draw over the world.
    pub fn with_default_passes(mut self) -> Self {
        #[cfg(feature = "render3d")]
        {
            use crate::render3d::{Camera3d, Perspective3dPass};
            let camera = Camera3d::default().with_fov(self.config.fov_y());
            self.pipeline.add_pass(
                Perspective3dPass::new("world", self.config.viewport, camera)
                    .with_clear(self.config.clear_color),
            );
        }
        #[cfg(feature = "render2d")]
        {
            use crate::render2d::Batched2dPass;
            let mut sprites = Batched2dPass::new("sprites", self.config.viewport)
                .with_sort_mode(self.config.sort_mode);
            if self.pipeline.is_empty() {
                sprites = sprites.with_clear(self.config.clear_color);
            }
            self.pipeline.add_pass(sprites);
        }
        self
    }

    pub fn frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Advance time by `delta` every frame instead of reading the clock.
    pub fn fixed_timestep(mut self, delta: Duration) -> Self {
        self.fixed_delta = Some(delta);
        self
    }

    /// Share an existing exit flag, e.g. one already bound in the kernel.
    pub fn exit_handle(mut self, exit: ExitHandle) -> Self {
        self.exit = exit;
        self
    }

    pub fn build(self) -> Game {
        log::debug!(
            "building `{}` with {} render passes",
            self.title,
            self.pipeline.len()
        );
        Game {
            title: self.title,
            scene: SceneTree::new(),
            pipeline: self.pipeline,
            backend: self.backend,
            time: Time::new(),
            fixed_delta: self.fixed_delta,
            frame_limit: self.frame_limit,
            exit: self.exit,
        }
    }
}
