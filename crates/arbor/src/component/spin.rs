use crate::error::{FrameError, InjectionError};
use crate::kernel::{Injectable, InjectionContext};
use crate::math::Vec3;
use crate::update::UpdateContext;

use super::{Component, Enabled, Updatable};

/// Rotates the nearest transform above it at a constant angular speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinComponent {
    pub axis: Vec3,
    /// Radians per second.
    pub speed: f32,
    pub enabled: bool,
}

impl SpinComponent {
    pub fn new(axis: Vec3, speed: f32) -> Self {
        Self {
            axis,
            speed,
            enabled: true,
        }
    }
}

impl Default for SpinComponent {
    fn default() -> Self {
        Self::new(Vec3::Y, 1.0)
    }
}

impl Enabled for SpinComponent {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Updatable for SpinComponent {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Result<(), FrameError> {
        let angle = self.speed * ctx.time().delta_secs();
        if let Some(transform) = ctx.nearest_transform_mut() {
            transform.transform_mut().rotate_axis(self.axis, angle);
        }
        Ok(())
    }
}

impl Component for SpinComponent {
    fn as_enabled(&self) -> Option<&dyn Enabled> {
        Some(self)
    }

    fn as_enabled_mut(&mut self) -> Option<&mut dyn Enabled> {
        Some(self)
    }

    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        Some(self)
    }
}

impl Injectable for SpinComponent {
    fn inject(_ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
        Ok(Self::default())
    }
}
