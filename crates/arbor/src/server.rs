//! Servers: processes that simulate without rendering.
//!
//! A [`ServerConfiguration`](crate::startup::ServerConfiguration) constructs
//! a boxed [`Server`]. The crate ships [`HeadlessServer`], which runs the
//! same pre-order update sweep as a [`Game`](crate::game::Game) but has no
//! render pipeline or backend:
//!
//! ```text
//!   loop {
//!       time.advance(1 / tick_rate)
//!       update_all(scene)
//!       sleep until the next tick    (real-time servers only)
//!   }
//! ```

use std::time::{Duration, Instant};

use crate::component::{Component, short_type_name};
use crate::entity::Entity;
use crate::error::{EngineError, FrameError, InjectionError};
use crate::game::ExitHandle;
use crate::kernel::{Injectable, Kernel};
use crate::scene::{NodeId, SceneTree};
use crate::time::Time;
use crate::update::update_all;

/// Ticks per second when none is configured.
pub const DEFAULT_TICK_RATE: u32 = 30;

/// Something [`Application::run`](crate::startup::Application::run) can run
/// instead of a game.
pub trait Server {
    fn run(&mut self) -> Result<(), EngineError>;

    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Update-only tick loop over a scene.
pub struct HeadlessServer {
    name: String,
    scene: SceneTree,
    time: Time,
    tick: Duration,
    tick_limit: Option<u64>,
    real_time: bool,
    exit: ExitHandle,
}

impl HeadlessServer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scene: SceneTree::new(),
            time: Time::new(),
            tick: tick_duration(DEFAULT_TICK_RATE),
            tick_limit: None,
            real_time: true,
            exit: ExitHandle::new(),
        }
    }

    /// Ticks per second. Zero is treated as one.
    pub fn with_tick_rate(mut self, ticks_per_second: u32) -> Self {
        self.tick = tick_duration(ticks_per_second);
        self
    }

    /// Stop after `ticks` ticks.
    pub fn with_tick_limit(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }

    /// Tick as fast as possible instead of pacing ticks to the wall clock.
    pub fn unpaced(mut self) -> Self {
        self.real_time = false;
        self
    }

    pub fn scene(&self) -> &SceneTree {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneTree {
        &mut self.scene
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick
    }

    pub fn exit_handle(&self) -> ExitHandle {
        self.exit.clone()
    }

    pub fn spawn<E>(&mut self, kernel: &Kernel, parent: Option<NodeId>) -> Result<Entity, InjectionError>
    where
        E: Component + Injectable,
    {
        Entity::spawn::<E>(kernel, &mut self.scene, parent)
    }

    /// Advance by one tick and update every component. Returns the number of
    /// update calls.
    pub fn tick(&mut self) -> Result<usize, FrameError> {
        self.time.advance(self.tick);
        update_all(&mut self.scene, &self.time)
    }

    fn should_continue(&self) -> bool {
        !self.exit.is_exit_requested()
            && self
                .tick_limit
                .is_none_or(|limit| self.time.frame_count() < limit)
    }
}

impl Server for HeadlessServer {
    fn run(&mut self) -> Result<(), EngineError> {
        log::info!(
            "server `{}` running at {:.1} ticks/s",
            self.name,
            1.0 / self.tick.as_secs_f32()
        );
        while self.should_continue() {
            let started = Instant::now();
            self.tick()?;
            if self.real_time {
                if let Some(remaining) = self.tick.checked_sub(started.elapsed()) {
                    std::thread::sleep(remaining);
                }
            }
        }
        log::info!(
            "server `{}` stopped after {} ticks",
            self.name,
            self.time.frame_count()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn tick_duration(ticks_per_second: u32) -> Duration {
    Duration::from_secs(1) / ticks_per_second.max(1)
}
