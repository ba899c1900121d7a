//! Convenience re-exports: `use arbor::prelude::*` for the common items.

// Core
pub use crate::asset::{
    AssetManager, AssetManagerProvider, AssetManagerProviderInitializer, EffectAsset,
    PreloadedAssetProvider, TextureAsset,
};
pub use crate::component::{
    Component, ComponentRef, Enabled, HasTransform, Renderable, SpinComponent,
    TransformComponent, Updatable,
};
pub use crate::config::{EngineConfig, LaunchArguments, LaunchOptions};
pub use crate::entity::Entity;
pub use crate::error::{
    AssetError, ConfigError, ConfigurationError, EngineError, FrameError, InjectionError,
    SceneError,
};
pub use crate::game::{ExitHandle, Game, GameBuilder};
pub use crate::kernel::{Injectable, InjectionContext, Kernel};
pub use crate::math::{Mat4, Quat, Rect, Transform, Vec2, Vec3, Vec4};
pub use crate::planner::DescendantMode;
pub use crate::protect::{ErrorReport, LogErrorReport, launch};
pub use crate::render::{
    Color, GraphicsBackend, NullBackend, RecordingBackend, RenderContext, RenderPass,
    RenderPipeline, SortMode, TextureHandle, Viewport,
};
pub use crate::scene::{NodeId, SceneTree};
pub use crate::server::{HeadlessServer, Server};
pub use crate::startup::{Application, GameConfiguration, ServerConfiguration, Startup};
pub use crate::time::Time;
pub use crate::update::UpdateContext;

// Render 2D (feature-gated)
#[cfg(feature = "render2d")]
pub use crate::render2d::{Batched2dPass, SpriteComponent};

// Render 3D (feature-gated)
#[cfg(feature = "render3d")]
pub use crate::render3d::{COLOR_EFFECT, Camera3d, MeshKind, Perspective3dPass, PlaneComponent};
