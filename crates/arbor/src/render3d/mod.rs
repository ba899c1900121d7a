//! # Render3d — Perspective Pass
//!
//! The 3D pass draws meshes immediately: each `draw_mesh` call goes straight
//! to the backend while the scene is walked. There is no queue and no sort,
//! so nothing can be left over between frames.
//!
//! ```text
//!   Perspective3dPass::begin     camera view + perspective projection bound
//!        │                       before any component renders
//!        ▼
//!   scene walk ── PlaneComponent::render ──► ctx.draw_mesh(..) ──► backend
//!        ▼
//!   Perspective3dPass::end       backend.end_pass()
//! ```
//!
//! ## Coordinate System
//!
//! Right-handed, y up, the camera looks down its `target - eye` direction.
//! Matrices come from glam's `look_at_rh` and `perspective_rh`.
//!
//! ## Comparison
//!
//! - **XNA / MonoGame**: `BasicEffect` with `View` / `Projection` set before
//!   drawing and one `DrawIndexedPrimitives` per mesh. Same model.
//! - **Bevy**: opaque 3D phase sorted front to back with pipelines
//!   specialized per material. Far more general.

mod mesh;

pub use mesh::{MeshDraw, MeshKind, MeshVertex};

use std::rc::Rc;

use crate::asset::EffectAsset;
use crate::component::{Component, Enabled, Renderable};
use crate::error::{FrameError, InjectionError};
use crate::kernel::{Injectable, InjectionContext};
use crate::math::{Mat4, Vec2, Vec3};
use crate::render::{
    Color, GraphicsBackend, PassDescriptor, Projection, RenderContext, RenderPass, RenderStats,
    Viewport,
};

/// Name of the effect [`PlaneComponent`] shades with.
pub const COLOR_EFFECT: &str = "effect.Color";

/// A look-at perspective camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera3d {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3d {
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            ..Self::default()
        }
    }

    pub fn with_fov(mut self, fov_y: f32) -> Self {
        self.fov_y = fov_y;
        self
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self) -> Projection {
        Projection::Perspective {
            fov_y: self.fov_y,
            near: self.near,
            far: self.far,
        }
    }
}

impl Default for Camera3d {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: std::f32::consts::FRAC_PI_3,
            near: 0.1,
            far: 100.0,
        }
    }
}

// ── Pass ─────────────────────────────────────────────────────────────────

/// Perspective pass with immediate mesh draws.
#[derive(Debug)]
pub struct Perspective3dPass {
    name: String,
    viewport: Viewport,
    camera: Camera3d,
    clear: Option<Color>,
}

impl Perspective3dPass {
    pub fn new(name: impl Into<String>, viewport: Viewport, camera: Camera3d) -> Self {
        Self {
            name: name.into(),
            viewport,
            camera,
            clear: None,
        }
    }

    pub fn with_clear(mut self, color: Color) -> Self {
        self.clear = Some(color);
        self
    }

    pub fn camera(&self) -> &Camera3d {
        &self.camera
    }

    /// Takes effect at the next `begin`.
    pub fn camera_mut(&mut self) -> &mut Camera3d {
        &mut self.camera
    }

    fn descriptor(&self) -> PassDescriptor {
        PassDescriptor {
            label: self.name.clone(),
            viewport: self.viewport,
            view: self.camera.view(),
            projection: self.camera.projection().matrix(&self.viewport),
            clear: self.clear,
        }
    }
}

impl RenderPass for Perspective3dPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn projection(&self) -> Projection {
        self.camera.projection()
    }

    fn begin(&mut self, backend: &mut dyn GraphicsBackend) -> Result<(), FrameError> {
        backend.begin_pass(&self.descriptor())
    }

    fn end(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        _stats: &mut RenderStats,
    ) -> Result<(), FrameError> {
        backend.end_pass()
    }
}

impl RenderContext<'_> {
    /// Draw a mesh in the active 3D pass, immediately.
    ///
    /// Fails with [`FrameError::WrongPass`] when the active pass is not a
    /// [`Perspective3dPass`].
    pub fn draw_mesh(&mut self, draw: &MeshDraw) -> Result<(), FrameError> {
        if !self.pass.is::<Perspective3dPass>() {
            return Err(FrameError::WrongPass {
                draw: "mesh",
                pass: self.pass.name().to_string(),
            });
        }
        self.backend.draw_mesh(draw)?;
        self.stats.meshes += 1;
        Ok(())
    }
}

// ── PlaneComponent ───────────────────────────────────────────────────────

/// A flat colored plane drawn at its node's accumulated transform.
///
/// Only renders during [`Perspective3dPass`]es. Needs the
/// [`COLOR_EFFECT`] asset when it is constructed.
#[derive(Debug, Clone)]
pub struct PlaneComponent {
    pub effect: Rc<EffectAsset>,
    pub color: Color,
    /// Extent along x and z.
    pub size: Vec2,
    pub enabled: bool,
}

impl PlaneComponent {
    pub fn new(effect: Rc<EffectAsset>) -> Self {
        Self {
            effect,
            color: Color::WHITE,
            size: Vec2::ONE,
            enabled: true,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }
}

impl Enabled for PlaneComponent {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Renderable for PlaneComponent {
    fn supports_pass(&self, pass: &dyn RenderPass) -> bool {
        pass.is::<Perspective3dPass>()
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), FrameError> {
        let scale = Mat4::from_scale(Vec3::new(self.size.x, 1.0, self.size.y));
        let draw = MeshDraw {
            mesh: MeshKind::Plane,
            effect: self.effect.name.clone(),
            world: ctx.accumulated_transform() * scale,
            color: self.color,
        };
        ctx.draw_mesh(&draw)
    }
}

impl Component for PlaneComponent {
    fn as_enabled(&self) -> Option<&dyn Enabled> {
        Some(self)
    }

    fn as_enabled_mut(&mut self) -> Option<&mut dyn Enabled> {
        Some(self)
    }

    fn as_renderable(&mut self) -> Option<&mut dyn Renderable> {
        Some(self)
    }
}

impl Injectable for PlaneComponent {
    fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
        let effect = ctx.asset::<EffectAsset>(COLOR_EFFECT)?;
        Ok(Self::new(effect))
    }
}
