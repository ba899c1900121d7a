//! Logger setup.
//!
//! Everything in the crate logs through the `log` facade. [`init_logger`]
//! installs `env_logger` with `info` as the default level; `RUST_LOG`
//! overrides it as usual. `--debug-startup` additionally turns on `trace`
//! for [`STARTUP_TARGET`], which narrates every step of [`Startup::run`].
//!
//! [`Startup::run`]: crate::startup::Startup::run

use log::LevelFilter;

use crate::config::LaunchArguments;

/// Log target of the startup sequence.
pub const STARTUP_TARGET: &str = "arbor::startup";

/// Install the global logger. Calling it again is harmless.
pub fn init_logger(args: &LaunchArguments) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder.parse_default_env();
    if args.debug_startup() {
        builder.filter_module(STARTUP_TARGET, LevelFilter::Trace);
    }
    if builder.try_init().is_err() {
        log::debug!("logger already installed");
    }
}
