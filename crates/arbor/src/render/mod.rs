//! # Render Pass Dispatcher
//!
//! A frame is rendered as an ordered list of *passes*. Each pass owns a
//! viewport and a coordinate mode, and the same scene is walked once per pass:
//!
//! ```text
//!   RenderPipeline::render_frame
//!     for pass in passes (registration order)
//!       pass.begin(backend)            bind viewport / camera
//!       for root in scene.roots()
//!         pre-order walk               render(ctx) on every enabled
//!                                      Renderable that accepts the pass
//!       pass.end(backend)              flush (2D) and close the pass
//!     backend.present()
//! ```
//!
//! ## Pass Types
//!
//! | pass                         | projection   | draws                        |
//! |------------------------------|--------------|------------------------------|
//! | [`Batched2dPass`]            | orthographic | queued, one flush at `end`   |
//! | [`Perspective3dPass`]        | perspective  | straight to the backend      |
//!
//! Components find out which pass they are in with
//! [`RenderContext::is_current_render_pass`]. A sprite only draws in the 2D
//! pass, a plane only in the 3D one, even though both are visited by both.
//!
//! ## Transforms
//!
//! The matrix a component draws with is
//! [`RenderContext::accumulated_transform`]: the product of its ancestors'
//! `HasTransform` matrices, root first, stopping at the first ancestor that
//! does not have one.
//!
//! ## Comparison
//!
//! - **XNA / MonoGame**: `SpriteBatch.Begin` / `End` bracket 2D draws the same
//!   way the 2D pass does, with the same sort modes.
//! - **Bevy**: render phases are sorted item lists extracted from the world
//!   each frame; passes are nodes in a render graph. Far more general.
//!
//! [`Batched2dPass`]: crate::render2d::Batched2dPass
//! [`Perspective3dPass`]: crate::render3d::Perspective3dPass

mod backend;
mod context;
mod dispatch;
mod pass;

pub use backend::{BackendCommand, GraphicsBackend, NullBackend, RecordingBackend};
pub use context::RenderContext;
pub use dispatch::{RenderPipeline, RenderStats, render_subtree};
pub use pass::{PassDescriptor, RenderPass};

use serde::{Deserialize, Serialize};

use crate::math::Mat4;

/// An RGBA color with floating-point components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const RED: Self = Self { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const GREEN: Self = Self { r: 0.0, g: 1.0, b: 0.0, a: 1.0 };
    pub const BLUE: Self = Self { r: 0.0, g: 0.0, b: 1.0, a: 1.0 };
    pub const CORNFLOWER_BLUE: Self = Self::rgb(0.392, 0.584, 0.929);

    /// Create a color from RGB (alpha = 1).
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Opaque id of a texture owned by the graphics backend.
///
/// Handle 0 is the built-in 1x1 white texture, used by untextured sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    pub const WHITE: Self = Self(0);
}

/// Pixel rectangle a pass draws into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// A viewport at the origin.
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Coordinate mode of a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// 1 unit = 1 pixel, (0,0) at the viewport's top-left, y down.
    Orthographic,
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    /// Projection matrix for `viewport`.
    pub fn matrix(&self, viewport: &Viewport) -> Mat4 {
        match *self {
            Projection::Orthographic => {
                Mat4::orthographic_rh(0.0, viewport.width, viewport.height, 0.0, -1.0, 1.0)
            }
            Projection::Perspective { fov_y, near, far } => {
                Mat4::perspective_rh(fov_y, viewport.aspect_ratio(), near, far)
            }
        }
    }
}

/// Order in which queued 2D draws are submitted at flush time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Submission order.
    #[default]
    Deferred,
    /// Grouped by texture to minimize batch breaks; submission order within
    /// a texture.
    Texture,
    /// Highest depth first.
    BackToFront,
    /// Lowest depth first.
    FrontToBack,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn orthographic_maps_top_left_to_clip_corner() {
        let viewport = Viewport::new(800.0, 600.0);
        let projection = Projection::Orthographic.matrix(&viewport);
        let top_left = projection.project_point3(Vec3::new(0.0, 0.0, 0.0));
        let bottom_right = projection.project_point3(Vec3::new(800.0, 600.0, 0.0));
        assert!(top_left.truncate().abs_diff_eq(glam::Vec2::new(-1.0, 1.0), 1e-6));
        assert!(bottom_right.truncate().abs_diff_eq(glam::Vec2::new(1.0, -1.0), 1e-6));
    }

    #[test]
    fn sort_mode_parses_from_json() {
        let mode: SortMode = serde_json::from_str("\"BackToFront\"").unwrap();
        assert_eq!(mode, SortMode::BackToFront);
        assert_eq!(SortMode::default(), SortMode::Deferred);
    }

    #[test]
    fn aspect_ratio_handles_zero_height() {
        assert_eq!(Viewport::new(10.0, 0.0).aspect_ratio(), 1.0);
        assert_eq!(Viewport::new(200.0, 100.0).aspect_ratio(), 2.0);
    }
}
