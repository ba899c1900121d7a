//! # Render2d — Batched Sprite Pass
//!
//! A 2D sprite renderer turns a collection of textured (or solid-colored)
//! rectangles into pixels. Each sprite is a *quad*, four vertices forming a
//! rectangle, placed by the accumulated transform of its node's ancestors.
//!
//! ## Architecture
//!
//! Sprites are never drawn while the scene is walked. They are queued into the
//! pass's [`SpriteBatch`] and handed to the backend in one flush at pass end:
//!
//! ```text
//!   Batched2dPass::begin           orthographic projection, (0,0) top-left
//!        │
//!        ▼
//!   scene walk ── SpriteComponent::render ──► ctx.draw_sprite(..)
//!        │                                         │
//!        │                                 ┌───────▼────────┐
//!        │                                 │  SpriteBatch   │ queued draws
//!        │                                 └───────┬────────┘
//!        ▼                                         │
//!   Batched2dPass::end ──► finish(sort_mode) ◄─────┘
//!        │                   sort · emit quads · group by texture
//!        ▼
//!   backend.submit_batch(..)   exactly once per pass, even when empty
//!   backend.end_pass()
//! ```
//!
//! ## Design Decisions
//!
//! **One flush per pass.** The flush count is fixed, so a frame's draw cost is
//! predictable and the backend sees every sprite of a pass together. A batch
//! still holding draws when the pass begins again is reported as
//! [`FrameError::UnflushedBatch`] rather than silently mixed into the next
//! frame.
//!
//! **CPU-side vertex transform.** Each sprite's world matrix is multiplied
//! into its four corners before submission. The backend then only applies
//! the pass's projection, so sprites with different transforms but the same
//! texture share a draw.
//!
//! **Orthographic coordinates.** One unit is one pixel of the pass viewport,
//! x grows right and y grows down.
//!
//! ## Comparison
//!
//! - **XNA / MonoGame**: `SpriteBatch.Begin(sortMode)` / `End()` is the same
//!   shape; `End` flushes.
//! - **Bevy** (`bevy_sprite`): instanced rendering with a per-instance
//!   transform buffer and automatic atlasing. Far more complex, scales to
//!   many more sprites.
//! - **Macroquad**: immediate-mode API that builds vertex buffers each frame
//!   without explicit sort modes.

mod batch;
mod vertex;

pub use batch::{BatchSubmission, DrawBatch, SpriteBatch, SpriteDraw};
pub use vertex::SpriteVertex;

use crate::asset::TextureAsset;
use crate::component::{Component, Enabled, Renderable};
use crate::error::{FrameError, InjectionError};
use crate::kernel::{Injectable, InjectionContext};
use crate::math::{Mat4, Rect, Vec2};
use crate::render::{
    Color, GraphicsBackend, PassDescriptor, Projection, RenderContext, RenderPass, RenderStats,
    SortMode, TextureHandle, Viewport,
};

// ── Pass ─────────────────────────────────────────────────────────────────

/// Orthographic pass that batches sprite draws and flushes them at `end`.
#[derive(Debug)]
pub struct Batched2dPass {
    name: String,
    viewport: Viewport,
    sort_mode: SortMode,
    clear: Option<Color>,
    batch: SpriteBatch,
}

impl Batched2dPass {
    pub fn new(name: impl Into<String>, viewport: Viewport) -> Self {
        Self {
            name: name.into(),
            viewport,
            sort_mode: SortMode::default(),
            clear: None,
            batch: SpriteBatch::new(),
        }
    }

    pub fn with_sort_mode(mut self, sort_mode: SortMode) -> Self {
        self.sort_mode = sort_mode;
        self
    }

    /// Clear the viewport before drawing.
    pub fn with_clear(mut self, color: Color) -> Self {
        self.clear = Some(color);
        self
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn set_sort_mode(&mut self, sort_mode: SortMode) {
        self.sort_mode = sort_mode;
    }

    /// Draws queued since the last flush.
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Queue a draw for the next flush.
    pub fn queue(&mut self, draw: SpriteDraw) {
        self.batch.push(draw);
    }
}

impl RenderPass for Batched2dPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn projection(&self) -> Projection {
        Projection::Orthographic
    }

    fn begin(&mut self, backend: &mut dyn GraphicsBackend) -> Result<(), FrameError> {
        if !self.batch.is_empty() {
            return Err(FrameError::UnflushedBatch {
                pass: self.name.clone(),
                pending: self.batch.len(),
            });
        }
        backend.begin_pass(&PassDescriptor {
            label: self.name.clone(),
            viewport: self.viewport,
            view: Mat4::IDENTITY,
            projection: Projection::Orthographic.matrix(&self.viewport),
            clear: self.clear,
        })
    }

    fn end(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        stats: &mut RenderStats,
    ) -> Result<(), FrameError> {
        let submission = self.batch.finish(self.sort_mode);
        log::trace!(
            "pass `{}` flushing {} sprites in {} batches",
            self.name,
            submission.sprite_count,
            submission.batches.len()
        );
        backend.submit_batch(&submission)?;
        stats.flushes += 1;
        backend.end_pass()
    }

    fn discard(&mut self) {
        self.batch.clear();
    }
}

impl RenderContext<'_> {
    /// Queue a sprite into the active 2D pass.
    ///
    /// Fails with [`FrameError::WrongPass`] when the active pass is not a
    /// [`Batched2dPass`].
    pub fn draw_sprite(&mut self, draw: SpriteDraw) -> Result<(), FrameError> {
        let Some(pass) = self.pass.downcast_mut::<Batched2dPass>() else {
            return Err(FrameError::WrongPass {
                draw: "sprite",
                pass: self.pass.name().to_string(),
            });
        };
        pass.queue(draw);
        self.stats.sprites += 1;
        Ok(())
    }
}

// ── SpriteComponent ──────────────────────────────────────────────────────

/// A textured quad drawn at its node's accumulated transform.
///
/// Only renders during [`Batched2dPass`]es.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteComponent {
    pub texture: TextureHandle,
    /// Size in pixels; the quad is centered on the transform origin.
    pub size: Vec2,
    pub color: Color,
    /// 0.0 = front.
    pub depth: f32,
    pub source: Rect,
    pub flip_x: bool,
    pub flip_y: bool,
    pub enabled: bool,
}

impl SpriteComponent {
    pub fn new(texture: TextureHandle, size: Vec2) -> Self {
        Self {
            texture,
            size,
            color: Color::WHITE,
            depth: 0.0,
            source: Rect::FULL,
            flip_x: false,
            flip_y: false,
            enabled: true,
        }
    }

    /// A sprite covering the whole texture at its native size.
    pub fn from_texture(texture: &TextureAsset) -> Self {
        Self::new(
            texture.handle,
            Vec2::new(texture.width as f32, texture.height as f32),
        )
    }

    /// Solid-colored quad on the white texture.
    pub fn solid(color: Color, size: Vec2) -> Self {
        Self {
            color,
            ..Self::new(TextureHandle::WHITE, size)
        }
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }
}

impl Default for SpriteComponent {
    fn default() -> Self {
        Self::new(TextureHandle::WHITE, Vec2::splat(64.0))
    }
}

impl Enabled for SpriteComponent {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Renderable for SpriteComponent {
    fn supports_pass(&self, pass: &dyn RenderPass) -> bool {
        pass.is::<Batched2dPass>()
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), FrameError> {
        let mut draw = SpriteDraw::new(self.texture, ctx.accumulated_transform(), self.size)
            .with_color(self.color)
            .with_depth(self.depth)
            .with_source(self.source);
        draw.flip_x = self.flip_x;
        draw.flip_y = self.flip_y;
        ctx.draw_sprite(draw)
    }
}

impl Component for SpriteComponent {
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

impl Injectable for SpriteComponent {
    fn inject(_ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
        Ok(Self::default())
    }
}
