//! Protected launch: turn a [`Startup`] into a process exit code.
//!
//! ```text
//!   launch(startup)
//!     init_logger(args)
//!     startup.run()           failure → LogErrorReport       → exit 1
//!     application.run()       failure → kernel's ErrorReport → exit 2
//!                                        (LogErrorReport when unbound)
//!     success                                                → exit 0
//! ```
//!
//! A configuration can bind its own report, e.g. to show a crash dialog:
//!
//! ```ignore
//! kernel
//!     .bind::<Rc<dyn ErrorReport>>()
//!     .to_constant(Rc::new(CrashDialog) as Rc<dyn ErrorReport>);
//! ```

use std::error::Error;
use std::process::ExitCode;
use std::rc::Rc;

use crate::error::EngineError;
use crate::logging::{STARTUP_TARGET, init_logger};
use crate::startup::Startup;

/// Receives the error that ended a run.
pub trait ErrorReport {
    fn report(&self, error: &EngineError);
}

/// Logs the error and its chain of sources at `error` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorReport;

impl ErrorReport for LogErrorReport {
    fn report(&self, error: &EngineError) {
        log::error!("{error}");
        let mut source = error.source();
        while let Some(cause) = source {
            log::error!("  caused by: {cause}");
            source = cause.source();
        }
    }
}

/// How a protected launch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Success,
    StartupFailed,
    RunFailed,
}

impl From<LaunchOutcome> for ExitCode {
    fn from(outcome: LaunchOutcome) -> Self {
        match outcome {
            LaunchOutcome::Success => ExitCode::SUCCESS,
            LaunchOutcome::StartupFailed => ExitCode::from(1),
            LaunchOutcome::RunFailed => ExitCode::from(2),
        }
    }
}

/// Install the logger, then start up and run under protection. Meant to be
/// returned from `main`.
pub fn launch(startup: Startup) -> ExitCode {
    init_logger(startup.args());
    run_protected(startup).into()
}

/// [`launch`] without touching the global logger.
pub fn run_protected(startup: Startup) -> LaunchOutcome {
    let mut application = match startup.run() {
        Ok(application) => application,
        Err(err) => {
            log::trace!(target: STARTUP_TARGET, "protected startup failed");
            LogErrorReport.report(&err);
            return LaunchOutcome::StartupFailed;
        }
    };

    match application.run() {
        Ok(()) => LaunchOutcome::Success,
        Err(err) => {
            let report = application
                .kernel()
                .try_get::<Rc<dyn ErrorReport>>()
                .unwrap_or_else(|| Rc::new(LogErrorReport));
            report.report(&err);
            LaunchOutcome::RunFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::config::LaunchArguments;
    use crate::error::{ConfigurationError, FrameError};
    use crate::game::Game;
    use crate::kernel::Kernel;
    use crate::server::{HeadlessServer, Server};
    use crate::startup::{GameConfiguration, ServerConfiguration};

    /// Keeps the rendered messages of reported errors.
    #[derive(Default)]
    struct RecordingReport(RefCell<Vec<String>>);

    impl ErrorReport for RecordingReport {
        fn report(&self, error: &EngineError) {
            self.0.borrow_mut().push(error.to_string());
        }
    }

    struct Reporting {
        report: Rc<RecordingReport>,
    }

    impl ServerConfiguration for Reporting {
        fn configure_kernel(&mut self, kernel: &mut Kernel) {
            let report: Rc<dyn ErrorReport> = self.report.clone();
            kernel.bind::<Rc<dyn ErrorReport>>().to_constant(report);
        }

        fn construct_server(
            &mut self,
            _kernel: &Kernel,
        ) -> Result<Option<Box<dyn Server>>, EngineError> {
            Ok(None)
        }
    }

    struct EmptyGame;

    impl GameConfiguration for EmptyGame {
        fn configure_kernel(&mut self, _kernel: &mut Kernel) {}

        fn construct_game(&mut self, kernel: &Kernel) -> Result<Option<Game>, EngineError> {
            let config = kernel.get::<crate::config::EngineConfig>()?;
            Ok(Some(Game::builder(&config).frame_limit(1).build()))
        }
    }

    struct FailingServer;

    impl Server for FailingServer {
        fn run(&mut self) -> Result<(), EngineError> {
            Err(FrameError::Component("lost connection".into()).into())
        }
    }

    struct Failing;

    impl ServerConfiguration for Failing {
        fn configure_kernel(&mut self, _kernel: &mut Kernel) {}

        fn construct_server(
            &mut self,
            _kernel: &Kernel,
        ) -> Result<Option<Box<dyn Server>>, EngineError> {
            Ok(Some(Box::new(FailingServer)))
        }
    }

    #[test]
    fn successful_run() {
        let startup = Startup::new(LaunchArguments::default()).game(EmptyGame);
        assert_eq!(run_protected(startup), LaunchOutcome::Success);
    }

    #[test]
    fn startup_failure_is_not_a_run_failure() {
        let startup = Startup::new(LaunchArguments::default());
        assert_eq!(run_protected(startup), LaunchOutcome::StartupFailed);
    }

    #[test]
    fn run_failure_goes_to_the_bound_report() {
        let report = Rc::new(RecordingReport::default());
        let startup = Startup::new(LaunchArguments::default())
            .server(Reporting {
                report: Rc::clone(&report),
            })
            .server(Failing);

        assert_eq!(run_protected(startup), LaunchOutcome::RunFailed);
        assert_eq!(*report.0.borrow(), vec!["lost connection".to_string()]);
    }

    #[test]
    fn ambiguous_application_is_reported() {
        let report = Rc::new(RecordingReport::default());
        let startup = Startup::new(LaunchArguments::default())
            .game(EmptyGame)
            .server(Reporting {
                report: Rc::clone(&report),
            })
            .server(Failing);

        assert_eq!(run_protected(startup), LaunchOutcome::RunFailed);
        assert_eq!(
            *report.0.borrow(),
            vec![ConfigurationError::GameAndServer.to_string()]
        );
    }

    #[test]
    fn unbound_report_falls_back_to_logging() {
        let startup = Startup::new(LaunchArguments::default()).server(Failing);
        assert_eq!(run_protected(startup), LaunchOutcome::RunFailed);
    }

    #[test]
    fn headless_server_launch() {
        struct Sim;
        impl ServerConfiguration for Sim {
            fn configure_kernel(&mut self, _kernel: &mut Kernel) {}

            fn construct_server(
                &mut self,
                _kernel: &Kernel,
            ) -> Result<Option<Box<dyn Server>>, EngineError> {
                Ok(Some(Box::new(
                    HeadlessServer::new("sim").with_tick_limit(2).unpaced(),
                )))
            }
        }

        let startup = Startup::new(LaunchArguments::default()).server(Sim);
        assert_eq!(run_protected(startup), LaunchOutcome::Success);
    }
}
