//! # Startup
//!
//! A process is assembled from configurations registered on a [`Startup`]:
//!
//! ```text
//!   Startup::new(args)
//!     .game(MyGame)            ─┐
//!     .server(MyServer)         │  explicit registration list
//!     .run()                   ─┘
//!
//!   kernel.bind::<LaunchArguments>()     constant
//!   kernel.bind::<EngineConfig>()        constant, from --config or defaults
//!
//!   for each game configuration, then each server configuration:
//!       configure_kernel(kernel)
//!       initialize_asset_manager_provider(initializer)
//!       construct_game / construct_server     only while none is kept yet
//!
//!   Application { kernel, game, server }
//!     .run()                   exactly one of game / server
//! ```
//!
//! Every configuration configures the kernel, even after a game or server
//! has been constructed. A library that only contributes bindings returns
//! `None` from its constructor.
//!
//! Deciding what to run is left to [`Application::run`]: a startup that
//! constructed nothing, or both a game and a server, fails there.
//!
//! ## Tracing
//!
//! Every step logs at `trace` on the [`STARTUP_TARGET`] target. Pass
//! `--debug-startup` to see them.

use crate::asset::AssetManagerProviderInitializer;
use crate::component::short_type_name;
use crate::config::{EngineConfig, LaunchArguments};
use crate::error::{ConfigurationError, EngineError};
use crate::game::Game;
use crate::kernel::Kernel;
use crate::logging::STARTUP_TARGET;
use crate::server::Server;

// ── Configurations ───────────────────────────────────────────────────────

/// Sets up a game.
pub trait GameConfiguration {
    /// Add the game's bindings.
    fn configure_kernel(&mut self, kernel: &mut Kernel);

    /// Install an asset provider. The default binds an empty one unless a
    /// previous configuration already installed a provider.
    fn initialize_asset_manager_provider(
        &mut self,
        initializer: &mut AssetManagerProviderInitializer<'_>,
    ) {
        initializer.use_empty_if_unbound();
    }

    /// Build the game, or `None` to leave it to another configuration.
    fn construct_game(&mut self, kernel: &Kernel) -> Result<Option<Game>, EngineError>;

    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Sets up a server.
pub trait ServerConfiguration {
    fn configure_kernel(&mut self, kernel: &mut Kernel);

    fn initialize_asset_manager_provider(
        &mut self,
        initializer: &mut AssetManagerProviderInitializer<'_>,
    ) {
        initializer.use_empty_if_unbound();
    }

    fn construct_server(
        &mut self,
        kernel: &Kernel,
    ) -> Result<Option<Box<dyn Server>>, EngineError>;

    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

// ── Startup ──────────────────────────────────────────────────────────────

/// Registered configurations plus the launch arguments.
pub struct Startup {
    args: LaunchArguments,
    games: Vec<Box<dyn GameConfiguration>>,
    servers: Vec<Box<dyn ServerConfiguration>>,
}

impl Startup {
    pub fn new(args: LaunchArguments) -> Self {
        Self {
            args,
            games: Vec::new(),
            servers: Vec::new(),
        }
    }

    pub fn args(&self) -> &LaunchArguments {
        &self.args
    }

    /// Register a game configuration. Configurations run in registration
    /// order.
    pub fn game<C: GameConfiguration + 'static>(mut self, configuration: C) -> Self {
        self.games.push(Box::new(configuration));
        self
    }

    /// Register a server configuration. Server configurations run after all
    /// game configurations.
    pub fn server<C: ServerConfiguration + 'static>(mut self, configuration: C) -> Self {
        self.servers.push(Box::new(configuration));
        self
    }

    /// Configure a kernel and construct the game and/or server.
    pub fn run(self) -> Result<Application, EngineError> {
        log::trace!(target: STARTUP_TARGET, "protected startup has begun");
        let Startup {
            args,
            mut games,
            mut servers,
        } = self;

        log::trace!(
            target: STARTUP_TARGET,
            "{} game configurations, {} server configurations registered",
            games.len(),
            servers.len()
        );
        if games.is_empty() && servers.is_empty() {
            return Err(ConfigurationError::NoConfigurations.into());
        }

        let config = EngineConfig::resolve(&args)?;
        let mut kernel = Kernel::new();
        kernel.bind::<LaunchArguments>().to_constant(args.clone());
        kernel.bind::<EngineConfig>().to_constant(config);

        let mut game = None;
        log::trace!(target: STARTUP_TARGET, "iterating game configurations");
        for configuration in &mut games {
            let name = configuration.name().to_string();
            log::trace!(target: STARTUP_TARGET, "configuring kernel with {name}");
            configuration.configure_kernel(&mut kernel);

            log::trace!(target: STARTUP_TARGET, "initializing asset manager provider with {name}");
            let mut initializer = AssetManagerProviderInitializer::new(&mut kernel, &args);
            configuration.initialize_asset_manager_provider(&mut initializer);

            if game.is_none() {
                log::trace!(target: STARTUP_TARGET, "attempting to construct game with {name}");
                game = configuration.construct_game(&kernel)?;
                if game.is_some() {
                    log::trace!(target: STARTUP_TARGET, "constructed game with {name}");
                }
            }
        }

        let mut server = None;
        log::trace!(target: STARTUP_TARGET, "iterating server configurations");
        for configuration in &mut servers {
            let name = configuration.name().to_string();
            log::trace!(target: STARTUP_TARGET, "configuring kernel with {name}");
            configuration.configure_kernel(&mut kernel);

            log::trace!(target: STARTUP_TARGET, "initializing asset manager provider with {name}");
            let mut initializer = AssetManagerProviderInitializer::new(&mut kernel, &args);
            configuration.initialize_asset_manager_provider(&mut initializer);

            if server.is_none() {
                log::trace!(target: STARTUP_TARGET, "attempting to construct server with {name}");
                server = configuration.construct_server(&kernel)?;
                if server.is_some() {
                    log::trace!(target: STARTUP_TARGET, "constructed server with {name}");
                }
            }
        }

        log::trace!(target: STARTUP_TARGET, "protected startup finished");
        Ok(Application {
            kernel,
            game,
            server,
        })
    }
}

// ── Application ──────────────────────────────────────────────────────────

/// Which of the two constructed things [`Application::run`] will run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTarget {
    Game,
    Server,
}

/// Result of a successful [`Startup::run`].
pub struct Application {
    kernel: Kernel,
    game: Option<Game>,
    server: Option<Box<dyn Server>>,
}

impl Application {
    /// The kernel every configuration contributed to.
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn game_mut(&mut self) -> Option<&mut Game> {
        self.game.as_mut()
    }

    pub fn server(&self) -> Option<&dyn Server> {
        self.server.as_deref()
    }

    /// Fails unless exactly one of game and server was constructed.
    pub fn target(&self) -> Result<RunTarget, ConfigurationError> {
        match (&self.game, &self.server) {
            (None, None) => Err(ConfigurationError::NothingConstructed),
            (Some(_), Some(_)) => Err(ConfigurationError::GameAndServer),
            (Some(_), None) => Ok(RunTarget::Game),
            (None, Some(_)) => Ok(RunTarget::Server),
        }
    }

    /// Run the game or the server to completion.
    pub fn run(&mut self) -> Result<(), EngineError> {
        log::trace!(target: STARTUP_TARGET, "protected run has begun");
        let target = self.target()?;
        match (target, &mut self.game, &mut self.server) {
            (RunTarget::Game, Some(game), _) => {
                log::trace!(target: STARTUP_TARGET, "starting game");
                game.run()?;
            }
            (RunTarget::Server, _, Some(server)) => {
                log::trace!(target: STARTUP_TARGET, "starting server `{}`", server.name());
                server.run()?;
            }
            _ => return Err(ConfigurationError::NothingConstructed.into()),
        }
        Ok(())
    }
}
