//! # Batch — Queue, Sort, and Group Sprites for One Flush
//!
//! During a 2D pass every sprite draw is queued, not drawn. At the end of the
//! pass the queue is flushed exactly once:
//!
//! 1. sort the queued draws by the pass's [`SortMode`]
//! 2. emit four world-space vertices and six indices per sprite
//! 3. merge consecutive sprites sharing a texture into one [`DrawBatch`]
//!
//! ## Why Batching Matters
//!
//! Every backend draw call carries overhead. A scene with 500 sprites over 3
//! textures should cost 3 draws, not 500. Merging same-texture neighbours
//! after sorting gets there as long as the sort keeps them together, which
//! is exactly what [`SortMode::Texture`] is for.
//!
//! ## Depth
//!
//! `depth` is a layer value: 0.0 is the front, larger values are further
//! back. [`SortMode::BackToFront`] submits the largest depth first so nearer
//! sprites paint over farther ones with alpha blending. All sorts are stable,
//! so equal keys keep submission order.
//!
//! ## Comparison
//!
//! - **XNA / MonoGame**: `SpriteSortMode` has the same `Deferred`, `Texture`,
//!   `BackToFront` and `FrontToBack` modes and flushes in `End()`.
//! - **Love2D**: automatic batching of consecutive same-texture draws, very
//!   similar to our approach, without explicit sort modes.

use crate::math::{Mat4, Rect, Vec2, Vec3};
use crate::render::{Color, SortMode, TextureHandle};

use super::vertex::SpriteVertex;

/// One queued sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDraw {
    pub texture: TextureHandle,
    /// World matrix; the quad is centered on its origin.
    pub world: Mat4,
    /// Size in pixels.
    pub size: Vec2,
    pub color: Color,
    /// Layer depth, 0.0 = front.
    pub depth: f32,
    /// UV sub-region of the texture.
    pub source: Rect,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl SpriteDraw {
    pub fn new(texture: TextureHandle, world: Mat4, size: Vec2) -> Self {
        Self {
            texture,
            world,
            size,
            color: Color::WHITE,
            depth: 0.0,
            source: Rect::FULL,
            flip_x: false,
            flip_y: false,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_source(mut self, source: Rect) -> Self {
        self.source = source;
        self
    }

    /// Four corners in world space: top-left, top-right, bottom-right,
    /// bottom-left (y grows downward).
    fn vertices(&self) -> [SpriteVertex; 4] {
        let half = self.size * 0.5;
        let color = self.color.to_array();

        let rect = &self.source;
        let (u_min, u_max) = if self.flip_x {
            (rect.max.x, rect.min.x)
        } else {
            (rect.min.x, rect.max.x)
        };
        let (v_min, v_max) = if self.flip_y {
            (rect.max.y, rect.min.y)
        } else {
            (rect.min.y, rect.max.y)
        };

        let corners = [
            Vec3::new(-half.x, -half.y, 0.0), // top-left
            Vec3::new(half.x, -half.y, 0.0),  // top-right
            Vec3::new(half.x, half.y, 0.0),   // bottom-right
            Vec3::new(-half.x, half.y, 0.0),  // bottom-left
        ];
        let uvs = [
            [u_min, v_min],
            [u_max, v_min],
            [u_max, v_max],
            [u_min, v_max],
        ];

        std::array::from_fn(|i| {
            let world_pos = self.world.transform_point3(corners[i]);
            SpriteVertex {
                position: world_pos.to_array(),
                uv: uvs[i],
                color,
            }
        })
    }
}

/// A run of indices drawn with one texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawBatch {
    pub texture: TextureHandle,
    /// Range into the submission's index buffer.
    pub index_start: u32,
    pub index_count: u32,
}

/// Everything one flush hands to the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSubmission {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub batches: Vec<DrawBatch>,
    /// Number of sprites in this flush.
    pub sprite_count: usize,
}

impl BatchSubmission {
    pub fn is_empty(&self) -> bool {
        self.sprite_count == 0
    }

    /// The vertex buffer as raw bytes, ready for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Queue of sprite draws for the current 2D pass.
#[derive(Debug, Default)]
pub struct SpriteBatch {
    draws: Vec<SpriteDraw>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, draw: SpriteDraw) {
        self.draws.push(draw);
    }

    /// Number of queued draws.
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Drop everything queued.
    pub fn clear(&mut self) {
        self.draws.clear();
    }

    /// Sort, emit geometry and group by texture. Leaves the queue empty.
    pub fn finish(&mut self, sort: SortMode) -> BatchSubmission {
        let mut draws = std::mem::take(&mut self.draws);
        match sort {
            SortMode::Deferred => {}
            SortMode::Texture => draws.sort_by_key(|draw| draw.texture),
            SortMode::BackToFront => draws.sort_by(|a, b| b.depth.total_cmp(&a.depth)),
            SortMode::FrontToBack => draws.sort_by(|a, b| a.depth.total_cmp(&b.depth)),
        }

        let mut vertices = Vec::with_capacity(draws.len() * 4);
        let mut indices = Vec::with_capacity(draws.len() * 6);
        let mut batches: Vec<DrawBatch> = Vec::new();

        for draw in &draws {
            let base_vertex = vertices.len() as u32;
            vertices.extend_from_slice(&draw.vertices());

            let index_start = indices.len() as u32;
            indices.extend([0, 1, 2, 0, 2, 3].map(|local| base_vertex + local));

            // Extend the current batch or start a new one.
            if let Some(last) = batches.last_mut() {
                if last.texture == draw.texture {
                    last.index_count += 6;
                    continue;
                }
            }
            batches.push(DrawBatch {
                texture: draw.texture,
                index_start,
                index_count: 6,
            });
        }

        BatchSubmission {
            vertices,
            indices,
            batches,
            sprite_count: draws.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(texture: u32, x: f32, depth: f32) -> SpriteDraw {
        SpriteDraw::new(
            TextureHandle(texture),
            Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
            Vec2::splat(2.0),
        )
        .with_depth(depth)
    }

    /// Sprite origins in flush order, read back from the first vertex.
    fn order(submission: &BatchSubmission) -> Vec<f32> {
        submission
            .vertices
            .chunks(4)
            .map(|quad| quad[0].position[0] + 1.0)
            .collect()
    }

    fn queued() -> SpriteBatch {
        let mut batch = SpriteBatch::new();
        batch.push(at(2, 0.0, 0.5));
        batch.push(at(1, 10.0, 0.9));
        batch.push(at(2, 20.0, 0.1));
        batch.push(at(1, 30.0, 0.5));
        batch
    }

    #[test]
    fn deferred_keeps_submission_order() {
        let submission = queued().finish(SortMode::Deferred);
        assert_eq!(order(&submission), vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(submission.batches.len(), 4);
    }

    #[test]
    fn texture_sort_groups_batches() {
        let submission = queued().finish(SortMode::Texture);
        assert_eq!(order(&submission), vec![10.0, 30.0, 0.0, 20.0]);
        assert_eq!(
            submission.batches,
            vec![
                DrawBatch {
                    texture: TextureHandle(1),
                    index_start: 0,
                    index_count: 12,
                },
                DrawBatch {
                    texture: TextureHandle(2),
                    index_start: 12,
                    index_count: 12,
                },
            ]
        );
    }

    #[test]
    fn back_to_front_is_descending_depth_and_stable() {
        let submission = queued().finish(SortMode::BackToFront);
        assert_eq!(order(&submission), vec![10.0, 0.0, 30.0, 20.0]);
    }

    #[test]
    fn front_to_back_is_ascending_depth_and_stable() {
        let submission = queued().finish(SortMode::FrontToBack);
        assert_eq!(order(&submission), vec![20.0, 0.0, 30.0, 10.0]);
    }

    #[test]
    fn finish_empties_the_queue() {
        let mut batch = queued();
        let submission = batch.finish(SortMode::Deferred);
        assert_eq!(submission.sprite_count, 4);
        assert_eq!(submission.indices.len(), 24);
        assert_eq!(submission.vertex_bytes().len(), 16 * SpriteVertex::STRIDE);
        assert!(batch.is_empty());
        assert!(batch.finish(SortMode::Deferred).is_empty());
    }

    #[test]
    fn quad_corners_follow_world_matrix_with_y_down() {
        let draw = SpriteDraw::new(
            TextureHandle::WHITE,
            Mat4::from_translation(Vec3::new(100.0, 50.0, 0.0)),
            Vec2::new(20.0, 10.0),
        );
        let vertices = draw.vertices();
        assert_eq!(vertices[0].position, [90.0, 45.0, 0.0]);
        assert_eq!(vertices[0].uv, [0.0, 0.0]);
        assert_eq!(vertices[2].position, [110.0, 55.0, 0.0]);
        assert_eq!(vertices[2].uv, [1.0, 1.0]);
    }
}
