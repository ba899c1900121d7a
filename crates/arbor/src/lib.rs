//! # Arbor — Component-Tree Game Runtime
//!
//! A game or server process is assembled from registered configurations,
//! built through a small injection kernel and driven by a frame loop:
//!
//! ```text
//!   Startup ── configurations ──► Kernel ──► Game / HeadlessServer
//!                                   │
//!                Entity::spawn ◄────┘   (planner builds component trees)
//!                     │
//!   every frame:  update_all ──► RenderPipeline ──► GraphicsBackend
//!                 (pre-order)    (2D batched, 3D)
//! ```
//!
//! Entities and components live on the nodes of one [`SceneTree`]. A
//! component's constructor asks the planner for the components it needs,
//! either creating them as its children or finding them elsewhere in the
//! tree being built.
//!
//! Start with `use arbor::prelude::*`, register a
//! [`GameConfiguration`](startup::GameConfiguration) on a
//! [`Startup`](startup::Startup) and hand it to [`launch`](protect::launch).
//!
//! [`SceneTree`]: scene::SceneTree

pub mod asset;
pub mod component;
pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod kernel;
pub mod logging;
pub mod math;
pub mod planner;
pub mod prelude;
pub mod protect;
pub mod render;
pub mod scene;
pub mod server;
pub mod startup;
pub mod time;
pub mod update;

#[cfg(feature = "render2d")]
pub mod render2d;

#[cfg(feature = "render3d")]
pub mod render3d;
