//! # Dependency Kernel
//!
//! The kernel maps a service type to a factory and builds instances on
//! demand. Everything the engine creates at startup (configurations, the
//! asset provider, entities and their components) is resolved through it.
//!
//! ```text
//!   kernel.bind::<Rc<dyn ErrorReport>>()
//!         .to_method(|_| Ok(Rc::new(LogErrorReport) as Rc<dyn ErrorReport>))
//!         .in_singleton_scope();
//!
//!   kernel.get::<Rc<dyn ErrorReport>>()
//!     │
//!     ├─ singleton cache hit? ──► clone and return
//!     │
//!     └─ push Request { service } ──► factory(ctx) ──► pop
//!                                       │
//!                                       └─ ctx.get::<Dep>() ... (nested)
//! ```
//!
//! ## Request Chains
//!
//! Every nested resolution pushes a [`Request`] onto the
//! [`InjectionContext`]. The chain is what the component planner reads to
//! derive context paths, and it is how cycles are caught: a service that
//! appears twice in its own chain is a [`CyclicDependency`]. Any chain longer
//! than [`MAX_RESOLUTION_DEPTH`] fails with [`ResolutionTooDeep`].
//!
//! ## Scopes
//!
//! Bindings are transient by default (one instance per `get`). Singleton
//! bindings cache the first instance and hand out clones, so singleton
//! services are typically `Rc<..>`.
//!
//! ## Comparison
//!
//! Reflection-based containers discover constructors at runtime. Here a
//! binding is just a closure, and constructor injection is the
//! [`Injectable`] trait: the type pulls what it needs out of the context.
//!
//! [`CyclicDependency`]: crate::error::InjectionError::CyclicDependency
//! [`ResolutionTooDeep`]: crate::error::InjectionError::ResolutionTooDeep

mod context;
mod request;

pub use context::InjectionContext;
pub use request::{ContextPath, Request, ServiceId};

pub(crate) use context::HierarchyScope;

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::InjectionError;

/// Longest request chain a single resolution may build.
pub const MAX_RESOLUTION_DEPTH: usize = 64;

/// A type the kernel can construct by pulling its dependencies out of an
/// [`InjectionContext`].
///
/// ```ignore
/// impl Injectable for Ship {
///     fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
///         let hull = ctx.instantiate_component::<Hull>()?;
///         let effect = ctx.asset::<EffectAsset>("effect.Color")?;
///         Ok(Ship { hull, effect })
///     }
/// }
/// ```
pub trait Injectable: Sized + 'static {
    fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError>;
}

type Factory = Rc<dyn Fn(&mut InjectionContext<'_>) -> Result<Box<dyn Any>, InjectionError>>;

/// Lifetime of instances produced by a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// A new instance per request.
    #[default]
    Transient,
    /// One instance per kernel, cloned out on every request.
    Singleton,
}

struct Binding {
    service: ServiceId,
    factory: Factory,
    scope: Scope,
}

/// Service registry and resolver.
pub struct Kernel {
    bindings: HashMap<TypeId, Binding>,
    singletons: RefCell<HashMap<TypeId, Box<dyn Any>>>,
}

impl Kernel {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            singletons: RefCell::new(HashMap::new()),
        }
    }

    /// Start a binding for service `S`. Binding a service again replaces the
    /// previous binding and drops any cached singleton.
    pub fn bind<S: 'static>(&mut self) -> BindingBuilder<'_, S> {
        BindingBuilder {
            kernel: self,
            _marker: PhantomData,
        }
    }

    /// Remove the binding for `S`. Returns `false` if there was none.
    pub fn unbind<S: 'static>(&mut self) -> bool {
        let type_id = TypeId::of::<S>();
        self.singletons.borrow_mut().remove(&type_id);
        self.bindings.remove(&type_id).is_some()
    }

    pub fn is_bound<S: 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<S>())
    }

    /// Number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolve `S` in a fresh episode with an empty request chain.
    pub fn get<S: Clone + 'static>(&self) -> Result<S, InjectionError> {
        InjectionContext::root(self).get::<S>()
    }

    /// Like [`get`](Self::get), but an unbound service is `None`. A bound
    /// service that fails to build is logged and also reported as `None`.
    pub fn try_get<S: Clone + 'static>(&self) -> Option<S> {
        if !self.is_bound::<S>() {
            return None;
        }
        match self.get::<S>() {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("optional service `{}` failed to resolve: {err}", ServiceId::of::<S>());
                None
            }
        }
    }

    /// Resolve `S` as a child request of `ctx`.
    pub(crate) fn resolve<S: Clone + 'static>(
        &self,
        ctx: &mut InjectionContext<'_>,
    ) -> Result<S, InjectionError> {
        let type_id = TypeId::of::<S>();
        if let Some(cached) = self.cached::<S>() {
            return Ok(cached);
        }

        let service = ServiceId::of::<S>();
        let binding = self
            .bindings
            .get(&type_id)
            .ok_or(InjectionError::Unbound {
                service: service.name(),
            })?;
        let factory = Rc::clone(&binding.factory);
        let scope = binding.scope;

        let built = ctx.within(service, None, |ctx| factory(ctx))?;
        let value = built
            .downcast::<S>()
            .map_err(|_| InjectionError::Construction {
                service: service.name(),
                reason: "binding produced a value of another type".into(),
            })?;

        if scope == Scope::Singleton {
            self.singletons
                .borrow_mut()
                .insert(type_id, Box::new((*value).clone()));
        }
        Ok(*value)
    }

    fn cached<S: Clone + 'static>(&self) -> Option<S> {
        self.singletons
            .borrow()
            .get(&TypeId::of::<S>())
            .and_then(|value| value.downcast_ref::<S>())
            .cloned()
    }

    fn insert_binding<S: 'static>(&mut self, factory: Factory) -> BindingScope<'_> {
        let service = ServiceId::of::<S>();
        let type_id = service.type_id();
        self.singletons.borrow_mut().remove(&type_id);
        let previous = self.bindings.insert(
            type_id,
            Binding {
                service,
                factory,
                scope: Scope::Transient,
            },
        );
        if let Some(previous) = previous {
            log::debug!("rebinding `{}`", previous.service);
        }
        BindingScope {
            kernel: self,
            type_id,
        }
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

// ── Binding builders ─────────────────────────────────────────────────────

/// Returned by [`Kernel::bind`]; picks the implementation.
pub struct BindingBuilder<'k, S> {
    kernel: &'k mut Kernel,
    _marker: PhantomData<fn() -> S>,
}

impl<'k, S: 'static> BindingBuilder<'k, S> {
    /// Build instances with a closure.
    pub fn to_method<F>(self, factory: F) -> BindingScope<'k>
    where
        F: Fn(&mut InjectionContext<'_>) -> Result<S, InjectionError> + 'static,
    {
        let factory: Factory = Rc::new(move |ctx: &mut InjectionContext<'_>| {
            factory(ctx).map(|value| Box::new(value) as Box<dyn Any>)
        });
        self.kernel.insert_binding::<S>(factory)
    }

    /// Build instances with `S`'s own [`Injectable`] constructor.
    pub fn to_self(self) -> BindingScope<'k>
    where
        S: Injectable,
    {
        self.to_method(S::inject)
    }

    /// Build an `I` and convert it into `S`. This is how a trait-object
    /// service is bound to a concrete implementation.
    pub fn to<I>(self) -> BindingScope<'k>
    where
        I: Injectable,
        S: From<I>,
    {
        self.to_method(|ctx: &mut InjectionContext<'_>| I::inject(ctx).map(S::from))
    }

    /// Always hand out clones of `value`.
    pub fn to_constant(self, value: S)
    where
        S: Clone,
    {
        self.to_method(move |_: &mut InjectionContext<'_>| Ok(value.clone()))
            .in_singleton_scope();
    }
}

/// Returned by the `to_*` methods; adjusts the scope of the new binding.
pub struct BindingScope<'k> {
    kernel: &'k mut Kernel,
    type_id: TypeId,
}

impl BindingScope<'_> {
    pub fn in_singleton_scope(self) {
        self.set(Scope::Singleton);
    }

    pub fn in_transient_scope(self) {
        self.set(Scope::Transient);
    }

    fn set(self, scope: Scope) {
        if let Some(binding) = self.kernel.bindings.get_mut(&self.type_id) {
            binding.scope = scope;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq)]
    struct Greeting(String);

    #[derive(Debug, Clone)]
    struct Counter(Rc<Cell<u32>>);

    trait Speaker {
        fn speak(&self) -> String;
    }

    struct Dog;

    impl Speaker for Dog {
        fn speak(&self) -> String {
            "woof".into()
        }
    }

    impl Injectable for Dog {
        fn inject(_ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            Ok(Dog)
        }
    }

    impl From<Dog> for Rc<dyn Speaker> {
        fn from(dog: Dog) -> Self {
            Rc::new(dog)
        }
    }

    #[derive(Debug, Clone)]
    struct Ping;
    #[derive(Debug, Clone)]
    struct Pong;

    impl Injectable for Ping {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            ctx.get::<Pong>()?;
            Ok(Ping)
        }
    }

    impl Injectable for Pong {
        fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
            ctx.get::<Ping>()?;
            Ok(Pong)
        }
    }

    #[test]
    fn unbound_service_fails() {
        let kernel = Kernel::new();
        let err = kernel.get::<Greeting>().unwrap_err();
        assert_eq!(err, InjectionError::Unbound { service: "Greeting" });
        assert!(kernel.try_get::<Greeting>().is_none());
    }

    #[test]
    fn constant_binding() {
        let mut kernel = Kernel::new();
        kernel.bind::<Greeting>().to_constant(Greeting("hi".into()));
        assert_eq!(kernel.get::<Greeting>().unwrap(), Greeting("hi".into()));
        assert!(kernel.is_bound::<Greeting>());
    }

    #[test]
    fn transient_builds_every_time() {
        let calls = Rc::new(Cell::new(0));
        let mut kernel = Kernel::new();
        let seen = Rc::clone(&calls);
        kernel.bind::<Counter>().to_method(move |_| {
            seen.set(seen.get() + 1);
            Ok(Counter(Rc::clone(&seen)))
        });
        kernel.get::<Counter>().unwrap();
        kernel.get::<Counter>().unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn singleton_builds_once() {
        let calls = Rc::new(Cell::new(0));
        let mut kernel = Kernel::new();
        let seen = Rc::clone(&calls);
        kernel
            .bind::<Counter>()
            .to_method(move |_| {
                seen.set(seen.get() + 1);
                Ok(Counter(Rc::clone(&seen)))
            })
            .in_singleton_scope();
        let a = kernel.get::<Counter>().unwrap();
        let b = kernel.get::<Counter>().unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Rc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn rebinding_replaces_and_drops_cache() {
        let mut kernel = Kernel::new();
        kernel.bind::<Greeting>().to_constant(Greeting("one".into()));
        assert_eq!(kernel.get::<Greeting>().unwrap().0, "one");
        kernel.bind::<Greeting>().to_constant(Greeting("two".into()));
        assert_eq!(kernel.get::<Greeting>().unwrap().0, "two");
        assert_eq!(kernel.len(), 1);
    }

    #[test]
    fn trait_object_bound_to_implementation() {
        let mut kernel = Kernel::new();
        kernel.bind::<Rc<dyn Speaker>>().to::<Dog>();
        assert_eq!(kernel.get::<Rc<dyn Speaker>>().unwrap().speak(), "woof");
    }

    #[test]
    fn nested_resolution_sees_parent_requests() {
        let mut kernel = Kernel::new();
        kernel.bind::<Greeting>().to_method(|ctx| {
            let chain: Vec<_> = ctx
                .requests()
                .iter()
                .map(|request| request.service().name())
                .collect();
            Ok(Greeting(chain.join("/")))
        });
        kernel.bind::<String>().to_method(|ctx| Ok(ctx.get::<Greeting>()?.0));
        assert_eq!(kernel.get::<String>().unwrap(), "String/Greeting");
    }

    #[test]
    fn cycles_are_detected() {
        let mut kernel = Kernel::new();
        kernel.bind::<Ping>().to_self();
        kernel.bind::<Pong>().to_self();
        let err = kernel.get::<Ping>().unwrap_err();
        match err {
            InjectionError::CyclicDependency { service, chain } => {
                assert_eq!(service, "Ping");
                assert_eq!(chain, "Ping/Pong/Ping");
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn unbind_removes_binding() {
        let mut kernel = Kernel::new();
        kernel.bind::<Greeting>().to_constant(Greeting("x".into()));
        assert!(kernel.unbind::<Greeting>());
        assert!(!kernel.unbind::<Greeting>());
        assert!(kernel.try_get::<Greeting>().is_none());
    }
}
