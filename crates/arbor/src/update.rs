//! Per-frame update traversal.
//!
//! Updates run before any render pass, in pre-order over every root:
//!
//! ```text
//!   Ship ─┬─ Transform ── Spin        visit order:
//!         └─ Sprite                   Ship, Transform, Spin, Sprite
//! ```
//!
//! Each component is moved out of its node for the duration of its call,
//! which is what lets [`UpdateContext`] hand out `&mut SceneTree` to the
//! component without aliasing it. A disabled component is skipped together
//! with its whole subtree. A failing callback aborts the frame; the error is
//! wrapped with the component's name and node and never retried.

use crate::component::HasTransform;
use crate::error::FrameError;
use crate::scene::{NodeId, SceneTree};
use crate::time::Time;

/// What an `Updatable` component sees during its update call.
pub struct UpdateContext<'a> {
    scene: &'a mut SceneTree,
    node: NodeId,
    time: &'a Time,
}

impl<'a> UpdateContext<'a> {
    /// The scene the component lives in. Its own node is empty for the
    /// duration of the call.
    pub fn scene(&self) -> &SceneTree {
        &*self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneTree {
        &mut *self.scene
    }

    /// The node this component is attached to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.scene.parent(self.node)
    }

    pub fn time(&self) -> &Time {
        self.time
    }

    /// The nearest ancestor with the `HasTransform` capability.
    pub fn nearest_transform_mut(&mut self) -> Option<&mut dyn HasTransform> {
        let target = self.scene.ancestors(self.node).find(|&ancestor| {
            self.scene
                .value(ancestor)
                .is_some_and(|value| value.as_transform().is_some())
        })?;
        self.scene.value_mut(target)?.as_transform_mut()
    }
}

/// Update every tree in the scene.
pub fn update_all(scene: &mut SceneTree, time: &Time) -> Result<usize, FrameError> {
    let mut updated = 0;
    for root in scene.roots().to_vec() {
        if scene.is_alive(root) {
            updated += update_subtree(scene, root, time)?;
        }
    }
    Ok(updated)
}

/// Update `node` and everything below it. Returns the number of update
/// callbacks made.
pub fn update_subtree(scene: &mut SceneTree, node: NodeId, time: &Time) -> Result<usize, FrameError> {
    let mut updated = 0;
    if let Some(mut component) = scene.take_value(node)? {
        if !component.is_enabled() {
            scene.restore_value(node, component);
            return Ok(0);
        }

        let result = match component.as_updatable() {
            Some(updatable) => {
                updated += 1;
                let mut ctx = UpdateContext {
                    scene: &mut *scene,
                    node,
                    time,
                };
                updatable.update(&mut ctx)
            }
            None => Ok(()),
        };
        let name = component.component_name();
        scene.restore_value(node, component);
        result.map_err(|source| FrameError::Callback {
            component: name,
            node,
            source: Box::new(source),
        })?;
    }

    // Snapshot: callbacks may add or destroy nodes.
    for child in scene.children(node).to_vec() {
        if scene.is_alive(child) {
            updated += update_subtree(scene, child, time)?;
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::f32::consts::FRAC_PI_2;
    use std::rc::Rc;
    use std::time::Duration;

    use crate::component::{Component, Enabled, SpinComponent, TransformComponent, Updatable};
    use crate::math::{Quat, Vec3};

    type Log = Rc<RefCell<Vec<&'static str>>>;

    struct Recorder {
        label: &'static str,
        log: Log,
        enabled: bool,
    }

    impl Recorder {
        fn boxed(label: &'static str, log: &Log) -> Option<Box<dyn Component>> {
            Some(Box::new(Recorder {
                label,
                log: Rc::clone(log),
                enabled: true,
            }))
        }
    }

    impl Enabled for Recorder {
        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
    }

    impl Updatable for Recorder {
        fn update(&mut self, _ctx: &mut UpdateContext<'_>) -> Result<(), FrameError> {
            self.log.borrow_mut().push(self.label);
            Ok(())
        }
    }

    impl Component for Recorder {
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

    struct Failing;

    impl Updatable for Failing {
        fn update(&mut self, _ctx: &mut UpdateContext<'_>) -> Result<(), FrameError> {
            Err(FrameError::Component("out of fuel".into()))
        }
    }

    impl Component for Failing {
        fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
            Some(self)
        }
    }

    /// Destroys its own node when updated.
    struct SelfDestruct;

    impl Updatable for SelfDestruct {
        fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Result<(), FrameError> {
            let node = ctx.node();
            ctx.scene_mut().destroy(node);
            Ok(())
        }
    }

    impl Component for SelfDestruct {
        fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
            Some(self)
        }
    }

    fn frame(secs: f32) -> Time {
        let mut time = Time::new();
        time.advance(Duration::from_secs_f32(secs));
        time
    }

    #[test]
    fn updates_run_in_pre_order() {
        let log = Log::default();
        let mut scene = SceneTree::new();
        let a = scene.create_root(Recorder::boxed("a", &log));
        let b = scene.create_child(a, Recorder::boxed("b", &log)).unwrap();
        scene.create_child(b, Recorder::boxed("b1", &log)).unwrap();
        scene.create_child(a, Recorder::boxed("c", &log)).unwrap();
        scene.create_root(Recorder::boxed("d", &log));

        let count = update_all(&mut scene, &frame(0.016)).unwrap();
        assert_eq!(count, 5);
        assert_eq!(*log.borrow(), vec!["a", "b", "b1", "c", "d"]);
    }

    #[test]
    fn disabled_component_skips_its_subtree() {
        let log = Log::default();
        let mut scene = SceneTree::new();
        let a = scene.create_root(Recorder::boxed("a", &log));
        let b = scene.create_child(a, Recorder::boxed("b", &log)).unwrap();
        scene.create_child(b, Recorder::boxed("b1", &log)).unwrap();
        scene.create_child(a, Recorder::boxed("c", &log)).unwrap();
        scene
            .value_mut(b)
            .and_then(|value| value.as_enabled_mut())
            .unwrap()
            .set_enabled(false);

        update_all(&mut scene, &frame(0.016)).unwrap();
        assert_eq!(*log.borrow(), vec!["a", "c"]);
        assert!(scene.value(b).is_some());
    }

    #[test]
    fn nodes_without_value_still_walk_children() {
        let log = Log::default();
        let mut scene = SceneTree::new();
        let root = scene.create_root(None);
        scene.create_child(root, Recorder::boxed("child", &log)).unwrap();
        update_all(&mut scene, &frame(0.016)).unwrap();
        assert_eq!(*log.borrow(), vec!["child"]);
    }

    #[test]
    fn callback_error_is_wrapped_and_stops_the_walk() {
        let log = Log::default();
        let mut scene = SceneTree::new();
        let root = scene.create_root(None);
        let bad = scene.create_child(root, Some(Box::new(Failing))).unwrap();
        scene.create_child(root, Recorder::boxed("after", &log)).unwrap();

        let err = update_all(&mut scene, &frame(0.016)).unwrap_err();
        assert_eq!(
            err,
            FrameError::Callback {
                component: "Failing",
                node: bad,
                source: Box::new(FrameError::Component("out of fuel".into())),
            }
        );
        assert!(log.borrow().is_empty());
        assert!(scene.component::<Failing>(bad).is_some());
    }

    #[test]
    fn component_may_destroy_its_own_node() {
        let log = Log::default();
        let mut scene = SceneTree::new();
        let root = scene.create_root(None);
        let doomed = scene.create_child(root, Some(Box::new(SelfDestruct))).unwrap();
        scene.create_child(doomed, Recorder::boxed("orphan", &log)).unwrap();
        scene.create_child(root, Recorder::boxed("sibling", &log)).unwrap();

        update_all(&mut scene, &frame(0.016)).unwrap();
        assert!(!scene.is_alive(doomed));
        assert_eq!(*log.borrow(), vec!["sibling"]);
    }

    #[test]
    fn spin_rotates_nearest_transform() {
        let mut scene = SceneTree::new();
        let transform = scene
            .attach(None, TransformComponent::default())
            .unwrap();
        scene
            .attach(Some(transform.node()), SpinComponent::new(Vec3::Z, FRAC_PI_2))
            .unwrap();

        update_all(&mut scene, &frame(1.0)).unwrap();
        let rotation = scene.get(transform).unwrap().transform.rotation;
        let expected = Quat::from_rotation_z(FRAC_PI_2);
        assert!(rotation.abs_diff_eq(expected, 1e-5));
    }
}
