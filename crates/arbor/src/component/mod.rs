//! # Components and Capabilities
//!
//! A component is a unit of behaviour attached to exactly one scene node.
//! Instead of a fixed class hierarchy, each component answers a handful of
//! *capability queries*. The dispatcher asks, the component either hands back
//! a trait object or `None`:
//!
//! ```text
//!                  ┌──────────────┐
//!                  │  Component   │
//!                  └──────┬───────┘
//!     as_enabled  as_renderable  as_updatable  as_transform
//!         │             │              │             │
//!     Enabled      Renderable      Updatable    HasTransform
//!   (on/off)     (render passes)  (per frame)  (matrix for descendants)
//! ```
//!
//! A component without the `Enabled` capability is always enabled. Every
//! capability is optional and independent: a sprite is `Enabled +
//! Renderable`, a transform node is `Enabled + HasTransform`, a spinner is
//! only `Updatable`.
//!
//! ## Type Queries
//!
//! Nodes store `Box<dyn Component>`. Concrete types are recovered with
//! [`downcast_ref`](dyn Component::downcast_ref) through the [`AsAny`]
//! supertrait, which is implemented for every `'static` type.

mod spin;
mod transform;

pub use spin::SpinComponent;
pub use transform::TransformComponent;

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::error::FrameError;
use crate::math::{Mat4, Transform};
use crate::render::{RenderContext, RenderPass};
use crate::scene::NodeId;
use crate::update::UpdateContext;

/// Upcast to `&dyn Any` for downcasting trait objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ── Capabilities ─────────────────────────────────────────────────────────

/// On/off toggle. Disabled components get neither update nor render calls,
/// and neither does anything below them.
pub trait Enabled {
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
}

/// Contributes a local matrix to every descendant's accumulated transform.
pub trait HasTransform {
    fn transform(&self) -> &Transform;
    fn transform_mut(&mut self) -> &mut Transform;

    /// The matrix handed to descendants. Defaults to the local transform.
    fn matrix(&self) -> Mat4 {
        self.transform().matrix()
    }
}

/// Takes part in render passes.
pub trait Renderable {
    /// Whether this component wants a render call during `pass`. The default
    /// accepts every pass; components may still check
    /// [`RenderContext::is_current_render_pass`] inside `render`.
    fn supports_pass(&self, _pass: &dyn RenderPass) -> bool {
        true
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), FrameError>;
}

/// Takes part in the per-frame update sweep.
pub trait Updatable {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Result<(), FrameError>;
}

// ── Component ────────────────────────────────────────────────────────────

/// A unit of behaviour attached to a scene node.
///
/// All methods have defaults; implement the capability accessors for the
/// capabilities the type actually has:
///
/// ```ignore
/// impl Component for Sprite {
///     fn as_enabled(&self) -> Option<&dyn Enabled> { Some(self) }
///     fn as_enabled_mut(&mut self) -> Option<&mut dyn Enabled> { Some(self) }
///     fn as_renderable(&mut self) -> Option<&mut dyn Renderable> { Some(self) }
/// }
/// ```
pub trait Component: AsAny {
    fn as_enabled(&self) -> Option<&dyn Enabled> {
        None
    }

    fn as_enabled_mut(&mut self) -> Option<&mut dyn Enabled> {
        None
    }

    fn as_renderable(&mut self) -> Option<&mut dyn Renderable> {
        None
    }

    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        None
    }

    fn as_transform(&self) -> Option<&dyn HasTransform> {
        None
    }

    fn as_transform_mut(&mut self) -> Option<&mut dyn HasTransform> {
        None
    }

    /// Short type name used in logs and errors.
    fn component_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}

impl dyn Component + '_ {
    /// `false` only when the component has the `Enabled` capability and it
    /// is switched off.
    pub fn is_enabled(&self) -> bool {
        self.as_enabled().is_none_or(|enabled| enabled.is_enabled())
    }

    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

// ── ComponentRef ─────────────────────────────────────────────────────────

/// Typed handle to a component living on a scene node.
///
/// Returned by the planner's instantiate/require calls. The component itself
/// stays owned by its node; look it up with
/// [`SceneTree::get`](crate::scene::SceneTree::get).
pub struct ComponentRef<T> {
    node: NodeId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ComponentRef<T> {
    pub(crate) fn new(node: NodeId) -> Self {
        Self {
            node,
            _marker: PhantomData,
        }
    }

    /// The node that owns the component.
    pub fn node(self) -> NodeId {
        self.node
    }
}

impl<T> Clone for ComponentRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ComponentRef<T> {}

impl<T> PartialEq for ComponentRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T> Eq for ComponentRef<T> {}

impl<T> fmt::Debug for ComponentRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ComponentRef<{}>({})",
            short_type_name(std::any::type_name::<T>()),
            self.node
        )
    }
}

/// Strip the module path from a fully-qualified type name
/// (`arbor::render2d::SpriteComponent` → `SpriteComponent`). Generic
/// arguments are dropped.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl Component for Plain {}

    #[test]
    fn component_without_enabled_capability_is_enabled() {
        let plain: Box<dyn Component> = Box::new(Plain);
        assert!(plain.is_enabled());
    }

    #[test]
    fn disabled_transform_reports_disabled() {
        let mut boxed: Box<dyn Component> = Box::new(TransformComponent::default());
        boxed.as_enabled_mut().expect("enabled").set_enabled(false);
        assert!(!boxed.is_enabled());
    }

    #[test]
    fn downcast_recovers_concrete_type() {
        let boxed: Box<dyn Component> = Box::new(TransformComponent::default());
        assert!(boxed.is::<TransformComponent>());
        assert!(!boxed.is::<Plain>());
        assert!(boxed.downcast_ref::<TransformComponent>().is_some());
        assert_eq!(boxed.component_name(), "TransformComponent");
    }

    #[test]
    fn short_names() {
        assert_eq!(short_type_name("a::b::Sprite"), "Sprite");
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper");
        assert_eq!(short_type_name("Plain"), "Plain");
    }
}
