//! # Component Hierarchy Planner
//!
//! While an entity is being spawned, its constructor (and the constructors of
//! everything it instantiates) can do two things with components:
//!
//! - **instantiate** a component: build it as a child node of whatever is
//!   under construction, and remember where it was built;
//! - **require** a component: find one that something further up the chain
//!   has already instantiated.
//!
//! "Where" is a [`ContextPath`]: the service types of the request chain,
//! root first. Every instantiation is recorded in the episode's
//! [`ComponentHierarchyParameter`] under its path, and requirements look
//! entries up by path.
//!
//! ```text
//!   Entity::spawn::<Ship>
//!     requests: [Ship]
//!     ├─ instantiate::<Hull>          recorded at  Ship
//!     ├─ instantiate::<Bridge>        recorded at  Ship (once built)
//!     │    requests: [Ship, Bridge]
//!     │    ├─ instantiate::<Radar>    recorded at  Ship/Bridge
//!     │    └─ instantiate::<Console>  recorded at  Ship/Bridge
//!     │         requests: [Ship, Bridge, Console]
//!     │         ├─ require_component_in_hierarchy::<Radar>
//!     │         │       at or below Ship/Bridge              ──► Radar
//!     │         └─ require_component_in_enclosing_scopes::<Hull>
//!     │                 Ship/Bridge (nothing)  then  Ship    ──► Hull
//!     └─ require_component_in_descendants::<Console>
//!              anything recorded in the episode              ──► Console
//! ```
//!
//! An entry is recorded when its constructor returns, so a component can
//! never require one of its own ancestors that is still under construction.
//!
//! ## Require Flavours
//!
//! | method                                   | skip | match                   |
//! |------------------------------------------|------|-------------------------|
//! | [`require_component`]                    | 1    | exactly at the path     |
//! | [`require_component_in_descendants`]     | 1    | at or below the path    |
//! | [`require_component_in_hierarchy`]       | 1    | at or below the path    |
//! | [`require_component_in_enclosing_scopes`]| 1..  | at or below, widening   |
//!
//! `skip` counts frames dropped from the innermost end of the chain. With a
//! skip of one the path is the requester's owner, so `require_component`
//! finds the requester's siblings, and the two `Full` flavours also find
//! anything those siblings instantiated. The descendants and hierarchy
//! flavours resolve identically. The enclosing-scopes flavour retries with
//! the owner's owner, and so on up to the root of the episode, until an
//! entry matches.
//!
//! ## Known Limitation
//!
//! Paths record service *types* only. Two components of the same type
//! instantiated by the same owner share a path, and anything they each
//! instantiate is recorded under the same key. A requirement resolved from
//! either subtree matches whichever entry was recorded first.
//!
//! [`require_component`]: InjectionContext::require_component
//! [`require_component_in_descendants`]: InjectionContext::require_component_in_descendants
//! [`require_component_in_hierarchy`]: InjectionContext::require_component_in_hierarchy
//! [`require_component_in_enclosing_scopes`]: InjectionContext::require_component_in_enclosing_scopes

use crate::component::{Component, ComponentRef};
use crate::error::InjectionError;
use crate::kernel::{ContextPath, HierarchyScope, Injectable, InjectionContext, ServiceId};
use crate::scene::{NodeId, SceneTree};

/// How far below a path an entry may be recorded and still match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescendantMode {
    /// Only entries recorded exactly at the path.
    Immediate,
    /// Entries recorded at the path or anywhere below it.
    Full,
}

/// One recorded instantiation.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyEntry {
    path: ContextPath,
    node: NodeId,
    service: ServiceId,
}

impl HierarchyEntry {
    pub fn path(&self) -> &ContextPath {
        &self.path
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn service(&self) -> ServiceId {
        self.service
    }
}

/// Per-episode record of which components were instantiated at which path.
///
/// Entries stay in recording order, so lookups return the earliest match.
#[derive(Debug, Default)]
pub struct ComponentHierarchyParameter {
    entries: Vec<HierarchyEntry>,
}

impl ComponentHierarchyParameter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component_at_path(&mut self, path: ContextPath, node: NodeId, service: ServiceId) {
        self.entries.push(HierarchyEntry {
            path,
            node,
            service,
        });
    }

    /// Entries recorded under `path`, filtered by `mode`.
    pub fn components_under_path<'p>(
        &'p self,
        path: &'p ContextPath,
        mode: DescendantMode,
    ) -> impl Iterator<Item = &'p HierarchyEntry> + 'p {
        self.entries.iter().filter(move |entry| match mode {
            DescendantMode::Immediate => entry.path == *path,
            DescendantMode::Full => entry.path.starts_with(path),
        })
    }

    pub fn entries(&self) -> &[HierarchyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(
        &self,
        scene: &SceneTree,
        path: &ContextPath,
        mode: DescendantMode,
        service: ServiceId,
    ) -> Option<NodeId> {
        self.components_under_path(path, mode)
            .find(|entry| entry.service == service && scene.is_alive(entry.node))
            .map(|entry| entry.node)
    }
}

impl<'a> InjectionContext<'a> {
    /// Build a `T` as a new child of the node under construction.
    ///
    /// `T`'s constructor runs with the new node as the node under
    /// construction, so whatever it instantiates lands below it. On failure
    /// the new node (and anything built under it) is destroyed.
    pub fn instantiate_component<T>(&mut self) -> Result<ComponentRef<T>, InjectionError>
    where
        T: Component + Injectable,
    {
        let service = ServiceId::of::<T>();
        let path = self.context_path(0);

        let (owner, child) = {
            let scope = self.hierarchy_scope_mut(service)?;
            let owner = scope.node;
            let child = scope.scene.create_child(owner, None)?;
            scope.node = child;
            (owner, child)
        };

        let built = self.within(service, Some(child), T::inject);

        let scope = self.hierarchy_scope_mut(service)?;
        scope.node = owner;
        match built {
            Ok(component) => {
                scope.scene.set_value(child, Box::new(component))?;
                log::trace!("instantiated `{service}` on {child} at `{path}`");
                scope.parameter.add_component_at_path(path, child, service);
                Ok(ComponentRef::new(child))
            }
            Err(err) => {
                scope.scene.destroy(child);
                Err(err)
            }
        }
    }

    /// Find a `T` among the components instantiated by the requester's owner.
    pub fn require_component<T: Component>(&self) -> Result<ComponentRef<T>, InjectionError> {
        self.require_at::<T>(1, DescendantMode::Immediate)
    }

    /// Find a `T` among the components instantiated by the requester's owner
    /// or anything below them.
    pub fn require_component_in_descendants<T: Component>(
        &self,
    ) -> Result<ComponentRef<T>, InjectionError> {
        self.require_at::<T>(1, DescendantMode::Full)
    }

    /// Same lookup as [`require_component_in_descendants`].
    ///
    /// [`require_component_in_descendants`]: Self::require_component_in_descendants
    pub fn require_component_in_hierarchy<T: Component>(
        &self,
    ) -> Result<ComponentRef<T>, InjectionError> {
        self.require_at::<T>(1, DescendantMode::Full)
    }

    /// Find a `T` in the nearest enclosing scope that has one, widening from
    /// the requester's owner up to the root of the episode.
    pub fn require_component_in_enclosing_scopes<T: Component>(
        &self,
    ) -> Result<ComponentRef<T>, InjectionError> {
        let service = ServiceId::of::<T>();
        let scope = self.hierarchy_scope(service)?;
        for skip in 1..=self.requests.len() {
            let path = self.context_path(skip);
            if let Some(node) = scope
                .parameter
                .find(&*scope.scene, &path, DescendantMode::Full, service)
            {
                return Ok(ComponentRef::new(node));
            }
        }
        Err(InjectionError::MissingHierarchyComponent {
            component: service.name(),
            path: self.context_path(1).to_string(),
        })
    }

    /// Look up `T` at the path `skip` frames up, filtered by `mode`.
    pub fn require_component_at<T: Component>(
        &self,
        skip: usize,
        mode: DescendantMode,
    ) -> Result<ComponentRef<T>, InjectionError> {
        self.require_at::<T>(skip, mode)
    }

    fn require_at<T: Component>(
        &self,
        skip: usize,
        mode: DescendantMode,
    ) -> Result<ComponentRef<T>, InjectionError> {
        let service = ServiceId::of::<T>();
        let scope = self.hierarchy_scope(service)?;
        let path = self.context_path(skip);
        scope
            .parameter
            .find(&*scope.scene, &path, mode, service)
            .map(ComponentRef::new)
            .ok_or_else(|| InjectionError::MissingHierarchyComponent {
                component: service.name(),
                path: path.to_string(),
            })
    }

    fn hierarchy_scope(&self, service: ServiceId) -> Result<&HierarchyScope<'a>, InjectionError> {
        self.scope
            .as_ref()
            .ok_or(InjectionError::NoHierarchyScope {
                component: service.name(),
            })
    }

    fn hierarchy_scope_mut(
        &mut self,
        service: ServiceId,
    ) -> Result<&mut HierarchyScope<'a>, InjectionError> {
        self.scope
            .as_mut()
            .ok_or(InjectionError::NoHierarchyScope {
                component: service.name(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::TransformComponent;
    use crate::kernel::Kernel;
    use crate::math::Transform;

    // Ship ─┬─ Hull
    //       └─ Mount ── Turret   (Turret requires Hull from an enclosing scope)

    struct Ship {
        hull: ComponentRef<Hull>,
        mount: ComponentRef<Mount>,
        turret: ComponentRef<Turret>,
    }
    impl Component for Ship {}
    impl Injectable for Ship {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            let hull = ctx.instantiate_component::<Hull>()?;
            let mount = ctx.instantiate_component::<Mount>()?;
            let turret = ctx.require_component_in_descendants::<Turret>()?;
            Ok(Ship {
                hull,
                mount,
                turret,
            })
        }
    }

    struct Hull;
    impl Component for Hull {}
    impl Injectable for Hull {
        fn inject(_ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            Ok(Hull)
        }
    }

    struct Mount {
        turret: ComponentRef<Turret>,
    }
    impl Component for Mount {}
    impl Injectable for Mount {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            Ok(Mount {
                turret: ctx.instantiate_component::<Turret>()?,
            })
        }
    }

    struct Turret {
        hull: ComponentRef<Hull>,
    }
    impl Component for Turret {}
    impl Injectable for Turret {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            Ok(Turret {
                hull: ctx.require_component_in_enclosing_scopes::<Hull>()?,
            })
        }
    }

    // Sprite requires a sibling Transform of the same owner.
    struct Sprite {
        transform: ComponentRef<TransformComponent>,
    }
    impl Component for Sprite {}
    impl Injectable for Sprite {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            Ok(Sprite {
                transform: ctx.require_component::<TransformComponent>()?,
            })
        }
    }

    struct Player;
    impl Component for Player {}
    impl Injectable for Player {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            ctx.instantiate_component::<TransformComponent>()?;
            ctx.instantiate_component::<Sprite>()?;
            Ok(Player)
        }
    }

    struct Lonely;
    impl Component for Lonely {}
    impl Injectable for Lonely {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            ctx.instantiate_component::<Sprite>()?;
            Ok(Lonely)
        }
    }

    // Two bays of the same type, each with its own Hull and Turret.
    struct Bay {
        hull: ComponentRef<Hull>,
        turret: ComponentRef<Turret>,
    }
    impl Component for Bay {}
    impl Injectable for Bay {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            let hull = ctx.instantiate_component::<Hull>()?;
            let turret = ctx.instantiate_component::<Turret>()?;
            Ok(Bay { hull, turret })
        }
    }

    struct Twins {
        first: ComponentRef<Bay>,
        second: ComponentRef<Bay>,
    }
    impl Component for Twins {}
    impl Injectable for Twins {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            Ok(Twins {
                first: ctx.instantiate_component::<Bay>()?,
                second: ctx.instantiate_component::<Bay>()?,
            })
        }
    }

    // Frigate ─┬─ Hull
    //          └─ Bridge ─┬─ Radar
    //                     └─ Console
    //
    // Console looks for Radar (recorded beside it) and Hull (recorded one
    // scope further out) with every flavour.

    struct Frigate {
        hull: ComponentRef<Hull>,
        bridge: ComponentRef<Bridge>,
    }
    impl Component for Frigate {}
    impl Injectable for Frigate {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            Ok(Frigate {
                hull: ctx.instantiate_component::<Hull>()?,
                bridge: ctx.instantiate_component::<Bridge>()?,
            })
        }
    }

    struct Bridge {
        radar: ComponentRef<Radar>,
        console: ComponentRef<Console>,
        console_in_descendants: Option<ComponentRef<Console>>,
        console_immediate: Option<ComponentRef<Console>>,
    }
    impl Component for Bridge {}
    impl Injectable for Bridge {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            let radar = ctx.instantiate_component::<Radar>()?;
            let console = ctx.instantiate_component::<Console>()?;
            Ok(Bridge {
                radar,
                console,
                console_in_descendants: ctx.require_component_in_descendants::<Console>().ok(),
                console_immediate: ctx.require_component::<Console>().ok(),
            })
        }
    }

    struct Radar;
    impl Component for Radar {}
    impl Injectable for Radar {
        fn inject(_ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            Ok(Radar)
        }
    }

    struct Console {
        radar_in_hierarchy: Result<ComponentRef<Radar>, InjectionError>,
        radar_in_descendants: Result<ComponentRef<Radar>, InjectionError>,
        hull_in_hierarchy: Result<ComponentRef<Hull>, InjectionError>,
        hull_in_descendants: Result<ComponentRef<Hull>, InjectionError>,
        hull_in_enclosing_scopes: Result<ComponentRef<Hull>, InjectionError>,
    }
    impl Component for Console {}
    impl Injectable for Console {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            Ok(Console {
                radar_in_hierarchy: ctx.require_component_in_hierarchy::<Radar>(),
                radar_in_descendants: ctx.require_component_in_descendants::<Radar>(),
                hull_in_hierarchy: ctx.require_component_in_hierarchy::<Hull>(),
                hull_in_descendants: ctx.require_component_in_descendants::<Hull>(),
                hull_in_enclosing_scopes: ctx.require_component_in_enclosing_scopes::<Hull>(),
            })
        }
    }

    /// Run one episode building `E` on a fresh root, the way `Entity::spawn`
    /// does, and hand back the scene and recorded hierarchy.
    fn build<E: Component + Injectable>(
        kernel: &Kernel,
    ) -> (SceneTree, ComponentHierarchyParameter, NodeId, Result<E, InjectionError>) {
        let mut scene = SceneTree::new();
        let mut parameter = ComponentHierarchyParameter::new();
        let root = scene.create_root(None);
        let result = {
            let mut ctx = InjectionContext::with_hierarchy(kernel, &mut scene, &mut parameter, root);
            ctx.within(ServiceId::of::<E>(), Some(root), E::inject)
        };
        (scene, parameter, root, result)
    }

    #[test]
    fn instantiate_creates_child_nodes_and_records_paths() {
        let kernel = Kernel::new();
        let (scene, parameter, root, ship) = build::<Ship>(&kernel);
        let ship = ship.unwrap();

        assert_eq!(scene.children(root), &[ship.hull.node(), ship.mount.node()]);
        let mount = scene.get(ship.mount).unwrap();
        assert_eq!(scene.children(ship.mount.node()), &[mount.turret.node()]);

        let recorded: Vec<String> = parameter
            .entries()
            .iter()
            .map(|entry| format!("{} @ {}", entry.service(), entry.path()))
            .collect();
        assert_eq!(
            recorded,
            vec!["Hull @ Ship", "Turret @ Ship/Mount", "Mount @ Ship"]
        );
    }

    #[test]
    fn enclosing_scopes_widen_to_the_owner() {
        let kernel = Kernel::new();
        let (scene, _, _, ship) = build::<Ship>(&kernel);
        let ship = ship.unwrap();
        let turret = scene.get(ship.turret).unwrap();
        assert_eq!(turret.hull, ship.hull);
    }

    #[test]
    fn require_in_descendants_sees_nested_instantiations() {
        let kernel = Kernel::new();
        let (scene, _, _, ship) = build::<Ship>(&kernel);
        let ship = ship.unwrap();
        let mount = scene.get(ship.mount).unwrap();
        assert_eq!(ship.turret, mount.turret);
    }

    #[test]
    fn hierarchy_and_descendants_look_at_or_below_the_owner() {
        let kernel = Kernel::new();
        let (scene, _, _, frigate) = build::<Frigate>(&kernel);
        let frigate = frigate.unwrap();
        let bridge = scene.get(frigate.bridge).unwrap();
        let console = scene.get(bridge.console).unwrap();

        assert_eq!(console.radar_in_hierarchy, Ok(bridge.radar));
        assert_eq!(console.radar_in_descendants, Ok(bridge.radar));

        // Hull sits at Frigate, outside Frigate/Bridge.
        let missing = Err(InjectionError::MissingHierarchyComponent {
            component: "Hull",
            path: "Frigate/Bridge".into(),
        });
        assert_eq!(console.hull_in_hierarchy, missing);
        assert_eq!(console.hull_in_descendants, missing);
        assert_eq!(console.hull_in_enclosing_scopes, Ok(frigate.hull));
    }

    #[test]
    fn full_mode_reaches_below_the_owner_where_immediate_does_not() {
        let kernel = Kernel::new();
        let (scene, _, _, frigate) = build::<Frigate>(&kernel);
        let frigate = frigate.unwrap();
        let bridge = scene.get(frigate.bridge).unwrap();

        // Console is recorded at Frigate/Bridge; the bridge's owner path is
        // Frigate.
        assert_eq!(bridge.console_in_descendants, Some(bridge.console));
        assert_eq!(bridge.console_immediate, None);
    }

    #[test]
    fn hierarchy_lookup_fails_when_nothing_encloses() {
        struct Needy;
        impl Component for Needy {}
        impl Injectable for Needy {
            fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
                ctx.instantiate_component::<Turret>()?;
                Ok(Needy)
            }
        }

        let kernel = Kernel::new();
        let (_, _, _, needy) = build::<Needy>(&kernel);
        assert!(matches!(
            needy.err(),
            Some(InjectionError::MissingHierarchyComponent {
                component: "Hull",
                ..
            })
        ));
    }

    #[test]
    fn require_component_finds_sibling_of_same_owner() {
        let kernel = Kernel::new();
        let (scene, _, root, player) = build::<Player>(&kernel);
        player.unwrap();
        let children = scene.children(root);
        assert_eq!(children.len(), 2);
        let sprite = scene.component::<Sprite>(children[1]).unwrap();
        assert_eq!(sprite.transform.node(), children[0]);
    }

    #[test]
    fn missing_requirement_names_component_and_rolls_back() {
        let kernel = Kernel::new();
        let (scene, parameter, root, lonely) = build::<Lonely>(&kernel);
        let err = lonely.err().unwrap();
        assert_eq!(
            err,
            InjectionError::MissingHierarchyComponent {
                component: "TransformComponent",
                path: "Lonely".into(),
            }
        );
        assert!(scene.children(root).is_empty());
        assert!(parameter.is_empty());
    }

    #[test]
    fn require_outside_spawn_has_no_scope() {
        let kernel = Kernel::new();
        let ctx = InjectionContext::root(&kernel);
        assert_eq!(
            ctx.require_component::<Hull>().unwrap_err(),
            InjectionError::NoHierarchyScope { component: "Hull" }
        );
    }

    #[test]
    fn same_type_siblings_share_a_path() {
        let kernel = Kernel::new();
        let (scene, parameter, _, twins) = build::<Twins>(&kernel);
        let twins = twins.unwrap();
        let first = scene.get(twins.first).unwrap();
        let second = scene.get(twins.second).unwrap();
        assert_ne!(first.hull, second.hull);

        // Both bays record their Hull under Twins/Bay, so the second bay's
        // turret resolves to the Hull recorded first.
        let first_turret = scene.get(first.turret).unwrap();
        let second_turret = scene.get(second.turret).unwrap();
        assert_eq!(first_turret.hull, first.hull);
        assert_eq!(second_turret.hull, first.hull);

        let paths: Vec<String> = parameter
            .entries()
            .iter()
            .filter(|entry| entry.service() == ServiceId::of::<Hull>())
            .map(|entry| entry.path().to_string())
            .collect();
        assert_eq!(paths, vec!["Twins/Bay", "Twins/Bay"]);
    }

    #[test]
    fn immediate_and_full_modes() {
        let mut parameter = ComponentHierarchyParameter::new();
        let mut scene = SceneTree::new();
        let a = scene.create_root(None);
        let b = scene.create_root(None);
        let shallow = ContextPath::from(vec![ServiceId::of::<Ship>()]);
        let deep = ContextPath::from(vec![ServiceId::of::<Ship>(), ServiceId::of::<Hull>()]);
        parameter.add_component_at_path(deep.clone(), a, ServiceId::of::<Turret>());
        parameter.add_component_at_path(shallow.clone(), b, ServiceId::of::<Hull>());

        let immediate: Vec<_> = parameter
            .components_under_path(&shallow, DescendantMode::Immediate)
            .map(HierarchyEntry::node)
            .collect();
        let full: Vec<_> = parameter
            .components_under_path(&shallow, DescendantMode::Full)
            .map(HierarchyEntry::node)
            .collect();
        assert_eq!(immediate, vec![b]);
        assert_eq!(full, vec![a, b]);
    }

    #[test]
    fn positioning_an_instantiated_component() {
        struct Placed;
        impl Component for Placed {}
        impl Injectable for Placed {
            fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
                let transform = ctx.instantiate_component::<TransformComponent>()?;
                if let Some(component) = ctx.scene_mut().and_then(|scene| scene.get_mut(transform)) {
                    component.transform = Transform::from_xy(3.0, 4.0);
                }
                Ok(Placed)
            }
        }

        let kernel = Kernel::new();
        let (scene, _, root, placed) = build::<Placed>(&kernel);
        placed.unwrap();
        let child = scene.children(root)[0];
        assert_eq!(
            scene.component::<TransformComponent>(child).unwrap().transform,
            Transform::from_xy(3.0, 4.0)
        );
    }
}
