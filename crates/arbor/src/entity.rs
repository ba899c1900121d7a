//! Entities: a scene node plus the component tree resolved onto it.
//!
//! [`Entity::spawn`] runs one resolution episode. The entity type's
//! constructor instantiates its components through the planner, which hangs
//! each of them under the entity node:
//!
//! ```text
//! Entity::spawn::<Ship>(kernel, scene, None)
//!
//!   Ship (node 0) ─┬─ TransformComponent (node 1) ── SpriteComponent (node 2)
//!                  └─ Engine (node 3)
//! ```
//!
//! The entity has no update or render logic of its own. Both delegate to the
//! same pre-order traversal the game loop and the render dispatcher use.

use crate::component::Component;
use crate::error::{FrameError, InjectionError};
use crate::kernel::{Injectable, InjectionContext, Kernel, ServiceId};
use crate::planner::ComponentHierarchyParameter;
use crate::render::{GraphicsBackend, RenderPass, RenderStats, render_subtree};
use crate::scene::{NodeId, SceneTree};
use crate::time::Time;
use crate::update::update_subtree;

/// Handle to a spawned entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    node: NodeId,
}

impl Entity {
    /// Resolve an `E` with a fresh component hierarchy and attach it under
    /// `parent` (or as a new root).
    ///
    /// On failure nothing of the entity is left in the scene.
    pub fn spawn<E>(
        kernel: &Kernel,
        scene: &mut SceneTree,
        parent: Option<NodeId>,
    ) -> Result<Entity, InjectionError>
    where
        E: Component + Injectable,
    {
        let node = match parent {
            Some(parent) => scene.create_child(parent, None)?,
            None => scene.create_root(None),
        };

        let service = ServiceId::of::<E>();
        let mut parameter = ComponentHierarchyParameter::new();
        let built = {
            let mut ctx = InjectionContext::with_hierarchy(kernel, scene, &mut parameter, node);
            ctx.within(service, Some(node), E::inject)
        };

        match built {
            Ok(entity) => {
                scene.set_value(node, Box::new(entity))?;
                log::debug!(
                    "spawned `{service}` on {node} with {} components",
                    parameter.len()
                );
                Ok(Entity { node })
            }
            Err(err) => {
                log::debug!("spawning `{service}` failed: {err}");
                scene.destroy(node);
                Err(err)
            }
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The entity's own value as an `E`.
    pub fn get<'s, E: Component>(&self, scene: &'s SceneTree) -> Option<&'s E> {
        scene.component::<E>(self.node)
    }

    pub fn get_mut<'s, E: Component>(&self, scene: &'s mut SceneTree) -> Option<&'s mut E> {
        scene.component_mut::<E>(self.node)
    }

    pub fn is_alive(&self, scene: &SceneTree) -> bool {
        scene.is_alive(self.node)
    }

    /// Update the entity and its components.
    pub fn update(&self, scene: &mut SceneTree, time: &Time) -> Result<usize, FrameError> {
        update_subtree(scene, self.node, time)
    }

    /// Render the entity and its components during an already begun `pass`.
    pub fn render(
        &self,
        scene: &mut SceneTree,
        pass: &mut dyn RenderPass,
        backend: &mut dyn GraphicsBackend,
        time: &Time,
        stats: &mut RenderStats,
    ) -> Result<(), FrameError> {
        render_subtree(scene, self.node, pass, backend, time, stats)
    }

    /// Destroy the entity node and all its components.
    pub fn despawn(self, scene: &mut SceneTree) -> bool {
        scene.destroy(self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::component::{ComponentRef, HasTransform, SpinComponent, TransformComponent};
    use crate::math::{Quat, Transform, Vec3};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Speed(f32);

    // Ship ── Pivot ── Spin   (the spinner turns the pivot)

    struct Ship {
        pivot: ComponentRef<Pivot>,
    }

    impl Component for Ship {}

    impl Injectable for Ship {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            let pivot = ctx.instantiate_component::<Pivot>()?;
            Ok(Ship { pivot })
        }
    }

    struct Pivot {
        transform: Transform,
        spin: ComponentRef<SpinComponent>,
    }

    impl HasTransform for Pivot {
        fn transform(&self) -> &Transform {
            &self.transform
        }
        fn transform_mut(&mut self) -> &mut Transform {
            &mut self.transform
        }
    }

    impl Component for Pivot {
        fn as_transform(&self) -> Option<&dyn HasTransform> {
            Some(self)
        }
        fn as_transform_mut(&mut self) -> Option<&mut dyn HasTransform> {
            Some(self)
        }
    }

    impl Injectable for Pivot {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            let Speed(speed) = ctx.get::<Speed>()?;
            let spin = ctx.instantiate_component::<SpinComponent>()?;
            if let Some(spinner) = ctx.scene_mut().and_then(|scene| scene.get_mut(spin)) {
                spinner.speed = speed;
            }
            Ok(Pivot {
                transform: Transform::IDENTITY,
                spin,
            })
        }
    }

    /// Builds a child, then fails on a missing requirement.
    struct Doomed;

    impl Component for Doomed {}

    impl Injectable for Doomed {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            ctx.instantiate_component::<TransformComponent>()?;
            ctx.require_component_in_descendants::<SpinComponent>()?;
            Ok(Doomed)
        }
    }

    fn kernel() -> Kernel {
        let mut kernel = Kernel::new();
        kernel.bind::<Speed>().to_constant(Speed(2.0));
        kernel
    }

    #[test]
    fn spawn_builds_components_under_the_entity() {
        let kernel = kernel();
        let mut scene = SceneTree::new();
        let ship = Entity::spawn::<Ship>(&kernel, &mut scene, None).unwrap();

        assert_eq!(scene.roots(), &[ship.node()]);
        assert_eq!(scene.len(), 3);
        let pivot = ship.get::<Ship>(&scene).unwrap().pivot;
        assert_eq!(scene.parent(pivot.node()), Some(ship.node()));
        let spin = scene.get(pivot).unwrap().spin;
        assert_eq!(scene.parent(spin.node()), Some(pivot.node()));
        assert_eq!(scene.get(spin).unwrap().speed, 2.0);
    }

    #[test]
    fn failed_spawn_leaves_nothing_behind() {
        let kernel = kernel();
        let mut scene = SceneTree::new();
        let err = Entity::spawn::<Doomed>(&kernel, &mut scene, None).unwrap_err();
        assert!(matches!(
            err,
            InjectionError::MissingHierarchyComponent {
                component: "SpinComponent",
                ..
            }
        ));
        assert!(scene.is_empty());
        assert!(scene.roots().is_empty());
    }

    #[test]
    fn unbound_service_fails_spawn() {
        let mut scene = SceneTree::new();
        let err = Entity::spawn::<Ship>(&Kernel::new(), &mut scene, None).unwrap_err();
        assert_eq!(err, InjectionError::Unbound { service: "Speed" });
        assert!(scene.is_empty());
    }

    #[test]
    fn spawn_under_parent_and_despawn() {
        let kernel = kernel();
        let mut scene = SceneTree::new();
        let group = scene.create_root(None);
        let ship = Entity::spawn::<Ship>(&kernel, &mut scene, Some(group)).unwrap();
        assert_eq!(scene.parent(ship.node()), Some(group));

        assert!(ship.despawn(&mut scene));
        assert!(!ship.is_alive(&scene));
        assert_eq!(scene.len(), 1);
        assert!(scene.children(group).is_empty());
    }

    #[test]
    fn update_delegates_to_the_component_tree() {
        let kernel = kernel();
        let mut scene = SceneTree::new();
        let ship = Entity::spawn::<Ship>(&kernel, &mut scene, None).unwrap();

        let mut time = Time::new();
        time.advance(Duration::from_millis(500));
        assert_eq!(ship.update(&mut scene, &time).unwrap(), 1);

        let pivot = ship.get::<Ship>(&scene).unwrap().pivot;
        let rotation = scene.get(pivot).unwrap().transform.rotation;
        assert!(rotation.abs_diff_eq(Quat::from_axis_angle(Vec3::Y, 1.0), 1e-5));
    }

    #[cfg(feature = "render2d")]
    #[test]
    fn render_delegates_to_the_component_tree() {
        use crate::render::{RecordingBackend, Viewport};
        use crate::render2d::{Batched2dPass, SpriteComponent};

        struct Marker;
        impl Component for Marker {}
        impl Injectable for Marker {
            fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
                ctx.instantiate_component::<SpriteComponent>()?;
                ctx.instantiate_component::<SpriteComponent>()?;
                Ok(Marker)
            }
        }

        let mut scene = SceneTree::new();
        let marker = Entity::spawn::<Marker>(&Kernel::new(), &mut scene, None).unwrap();

        let mut pass = Batched2dPass::new("sprites", Viewport::default());
        let mut backend = RecordingBackend::new();
        let mut stats = RenderStats::default();
        pass.begin(&mut backend).unwrap();
        marker
            .render(&mut scene, &mut pass, &mut backend, &Time::new(), &mut stats)
            .unwrap();
        assert_eq!(pass.pending(), 2);
        pass.end(&mut backend, &mut stats).unwrap();
        assert_eq!(stats.sprites, 2);
        assert_eq!(stats.flushes, 1);
    }
}
