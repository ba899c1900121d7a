//! The per-episode resolution context.

use std::rc::Rc;

use super::request::{ContextPath, Request, ServiceId};
use super::{Kernel, MAX_RESOLUTION_DEPTH};
use crate::asset::AssetManagerProvider;
use crate::error::InjectionError;
use crate::planner::ComponentHierarchyParameter;
use crate::scene::{NodeId, SceneTree};

/// The scene-side half of a spawn episode: where new component nodes go and
/// where their context paths are recorded.
pub(crate) struct HierarchyScope<'a> {
    pub scene: &'a mut SceneTree,
    pub parameter: &'a mut ComponentHierarchyParameter,
    /// Node currently under construction. New components become its
    /// children.
    pub node: NodeId,
}

/// State threaded through one resolution episode.
///
/// Holds the chain of in-flight [`Request`]s (outermost first) and, inside
/// [`Entity::spawn`](crate::entity::Entity::spawn), the hierarchy scope the
/// component planner works in.
pub struct InjectionContext<'a> {
    pub(crate) kernel: &'a Kernel,
    pub(crate) requests: Vec<Request>,
    pub(crate) scope: Option<HierarchyScope<'a>>,
}

impl<'a> InjectionContext<'a> {
    /// A service-only episode: no scene, no hierarchy.
    pub(crate) fn root(kernel: &'a Kernel) -> Self {
        Self {
            kernel,
            requests: Vec::new(),
            scope: None,
        }
    }

    /// An episode that builds components under `node`.
    pub(crate) fn with_hierarchy(
        kernel: &'a Kernel,
        scene: &'a mut SceneTree,
        parameter: &'a mut ComponentHierarchyParameter,
        node: NodeId,
    ) -> Self {
        Self {
            kernel,
            requests: Vec::new(),
            scope: Some(HierarchyScope {
                scene,
                parameter,
                node,
            }),
        }
    }

    pub fn kernel(&self) -> &'a Kernel {
        self.kernel
    }

    /// Resolve a service as a child request of the current one.
    pub fn get<S: Clone + 'static>(&mut self) -> Result<S, InjectionError> {
        let kernel = self.kernel;
        kernel.resolve::<S>(self)
    }

    /// Look up an asset through the bound [`AssetManagerProvider`].
    pub fn asset<A: 'static>(&mut self, name: &str) -> Result<Rc<A>, InjectionError> {
        let provider = self.get::<Rc<dyn AssetManagerProvider>>()?;
        Ok(provider.asset_manager().get::<A>(name)?)
    }

    /// In-flight requests, outermost first. The last entry is the request
    /// currently being constructed.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn current_request(&self) -> Option<&Request> {
        self.requests.last()
    }

    /// Node under construction, if this is a spawn episode.
    pub fn node(&self) -> Option<NodeId> {
        self.scope.as_ref().map(|scope| scope.node)
    }

    /// Read access to the scene being built into, if any.
    pub fn scene(&self) -> Option<&SceneTree> {
        self.scope.as_ref().map(|scope| &*scope.scene)
    }

    /// Mutable access to the scene being built into, e.g. to position a
    /// component right after instantiating it.
    pub fn scene_mut(&mut self) -> Option<&mut SceneTree> {
        match self.scope.as_mut() {
            Some(scope) => Some(&mut *scope.scene),
            None => None,
        }
    }

    pub fn hierarchy(&self) -> Option<&ComponentHierarchyParameter> {
        self.scope.as_ref().map(|scope| &*scope.parameter)
    }

    /// Context path of the current position in the chain, see
    /// [`ContextPath::from_requests`].
    pub fn context_path(&self, skip: usize) -> ContextPath {
        ContextPath::from_requests(&self.requests, skip)
    }

    /// Run `f` with `service` pushed as a child request.
    pub(crate) fn within<R>(
        &mut self,
        service: ServiceId,
        node: Option<NodeId>,
        f: impl FnOnce(&mut Self) -> Result<R, InjectionError>,
    ) -> Result<R, InjectionError> {
        if self.requests.len() >= MAX_RESOLUTION_DEPTH {
            return Err(InjectionError::ResolutionTooDeep {
                depth: MAX_RESOLUTION_DEPTH,
                chain: self.chain(None),
            });
        }
        // Component frames may legitimately nest the same type (a turret on
        // a turret); services may not.
        let cyclic = node.is_none()
            && self
                .requests
                .iter()
                .any(|request| !request.is_component() && request.service == service);
        if cyclic {
            return Err(InjectionError::CyclicDependency {
                service: service.name(),
                chain: self.chain(Some(service)),
            });
        }

        self.requests.push(Request { service, node });
        let result = f(self);
        self.requests.pop();
        result
    }

    fn chain(&self, next: Option<ServiceId>) -> String {
        self.requests
            .iter()
            .map(|request| request.service)
            .chain(next)
            .map(ServiceId::name)
            .collect::<Vec<_>>()
            .join("/")
    }
}
