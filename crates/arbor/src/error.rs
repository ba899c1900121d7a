//! Error types.
//!
//! One enum per concern, all `thiserror`-derived, plus [`EngineError`] which
//! wraps them for the startup / run entry points.
//!
//! ```text
//! EngineError
//!  ├── ConfigurationError   startup: no configurations, nothing built, game + server
//!  ├── InjectionError       kernel / planner: unbound, missing component, cycles
//!  ├── FrameError           update / render callbacks, pass state
//!  ├── ConfigError          engine config file
//!  └── AssetError           asset lookup
//! ```

use std::path::PathBuf;

use crate::scene::NodeId;

/// The scene tree rejected a node handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The node was destroyed, or the id belongs to a recycled slot.
    #[error("node {0} is not alive")]
    StaleNode(NodeId),
}

/// An asset lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    #[error("asset `{name}` not found")]
    NotFound { name: String },
    #[error("asset `{name}` is not a `{expected}`")]
    WrongType { name: String, expected: &'static str },
}

/// Fatal startup problems with the registered configurations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error(
        "no game or server configuration was registered; register at least one \
         GameConfiguration or ServerConfiguration"
    )]
    NoConfigurations,
    #[error(
        "no game configuration constructed a game and no server configuration \
         constructed a server"
    )]
    NothingConstructed,
    #[error(
        "a game configuration constructed a game and a server configuration \
         constructed a server; cannot decide which one to run"
    )]
    GameAndServer,
}

/// A resolution episode failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InjectionError {
    #[error("no binding for service `{service}`")]
    Unbound { service: &'static str },

    /// A `require_component*` query found nothing of the requested type.
    #[error("component `{component}` is required but was not found under `{path}`")]
    MissingHierarchyComponent { component: &'static str, path: String },

    /// Component instantiation/requirement outside of a spawn episode.
    #[error("`{component}` needs a component hierarchy; resolve it through Entity::spawn")]
    NoHierarchyScope { component: &'static str },

    #[error("cyclic dependency on `{service}` ({chain})")]
    CyclicDependency { service: &'static str, chain: String },

    #[error("resolution exceeded {depth} nested requests ({chain})")]
    ResolutionTooDeep { depth: usize, chain: String },

    /// A constructor rejected its inputs.
    #[error("failed to construct `{service}`: {reason}")]
    Construction { service: &'static str, reason: String },

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Failures inside a frame: update/render callbacks and pass bookkeeping.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// A component callback failed. Wraps the callback's own error.
    #[error("component `{component}` on node {node} failed: {source}")]
    Callback {
        component: &'static str,
        node: NodeId,
        #[source]
        source: Box<FrameError>,
    },

    /// A batched pass was started while draws from a previous pass were
    /// still waiting to be flushed.
    #[error("render pass `{pass}` began with {pending} unflushed draws")]
    UnflushedBatch { pass: String, pending: usize },

    /// A draw was issued that the active pass cannot accept.
    #[error("`{draw}` cannot be drawn during pass `{pass}`")]
    WrongPass { draw: &'static str, pass: String },

    /// Free-form failure raised by a component.
    #[error("{0}")]
    Component(String),

    /// The graphics backend rejected a command.
    #[error("graphics backend: {0}")]
    Backend(String),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Launch argument and engine configuration file problems.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid launch arguments: {0}")]
    Arguments(#[from] clap::Error),
}

/// Top-level error returned by startup and run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Injection(#[from] InjectionError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}
