//! # Vertex — Per-Corner Data Handed to the Backend
//!
//! Every sprite quad becomes four vertices. Each one carries a position, a
//! texture coordinate (UV) and a tint color, packed into a flat struct so a
//! backend can upload the whole batch as one byte slice.
//!
//! ## Memory Layout
//!
//! `#[repr(C)]` fixes field order and padding. The `bytemuck` traits `Pod`
//! and `Zeroable` let [`BatchSubmission::vertex_bytes`] view
//! `&[SpriteVertex]` as `&[u8]` without copying.
//!
//! ```text
//! SpriteVertex (36 bytes per vertex)
//! ┌────────────────┬──────────────┬────────────────────────┐
//! │ position       │ uv           │ color                  │
//! │ [f32; 3]       │ [f32; 2]     │ [f32; 4]               │
//! │ 12 bytes       │ 8 bytes      │ 16 bytes               │
//! │ offset 0       │ offset 12    │ offset 20              │
//! └────────────────┴──────────────┴────────────────────────┘
//! ```
//!
//! ## Why Position Is World-Space
//!
//! Positions are pre-multiplied by the sprite's accumulated transform on the
//! CPU. The backend only applies the pass's view-projection, so sprites with
//! different transforms still share one draw per texture.
//!
//! [`BatchSubmission::vertex_bytes`]: super::BatchSubmission::vertex_bytes

use bytemuck::{Pod, Zeroable};

/// Per-vertex data for sprite quads, in world space.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl SpriteVertex {
    /// Bytes between consecutive vertices.
    pub const STRIDE: usize = std::mem::size_of::<SpriteVertex>();

    /// Byte offsets of `position`, `uv` and `color`.
    pub const OFFSETS: [usize; 3] = [0, 12, 20];
}
