//! Service identities, request frames and context paths.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::component::short_type_name;
use crate::scene::NodeId;

/// Identity of a requested service: its `TypeId`, plus the type name for
/// messages. Equality and hashing only look at the `TypeId`.
#[derive(Clone, Copy)]
pub struct ServiceId {
    type_id: TypeId,
    name: &'static str,
}

impl ServiceId {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
        }
    }

    pub fn type_id(self) -> TypeId {
        self.type_id
    }

    /// Short type name (no module path).
    pub fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ServiceId {}

impl Hash for ServiceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One frame of a resolution chain.
///
/// Service requests carry no node. Component requests carry the node the
/// component is being built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub(crate) service: ServiceId,
    pub(crate) node: Option<NodeId>,
}

impl Request {
    pub fn service(&self) -> ServiceId {
        self.service
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_component(&self) -> bool {
        self.node.is_some()
    }
}

/// Root-to-current sequence of requested services.
///
/// This is the join key between component instantiation and later
/// requirement lookups. Only service *types* are recorded, so two sibling
/// components of the same type built at the same depth produce equal paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContextPath(Vec<ServiceId>);

impl ContextPath {
    /// The empty path, i.e. the root of a resolution episode.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Derive a path from a request chain.
    ///
    /// `requests` are the parents of an in-flight request, outermost first.
    /// They are walked from the innermost upward, the first `skip` entries
    /// are dropped, and the result is reversed so it reads root-to-current.
    pub fn from_requests(requests: &[Request], skip: usize) -> Self {
        let mut services: Vec<ServiceId> = requests
            .iter()
            .rev()
            .skip(skip)
            .map(|request| request.service)
            .collect();
        services.reverse();
        Self(services)
    }

    pub fn services(&self) -> &[ServiceId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` if `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &ContextPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl From<Vec<ServiceId>> for ContextPath {
    fn from(services: Vec<ServiceId>) -> Self {
        Self(services)
    }
}

impl fmt::Display for ContextPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, service) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(service.name())?;
        }
        Ok(())
    }
}
