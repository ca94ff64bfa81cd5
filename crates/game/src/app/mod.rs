mod bootstrap;
pub mod gameplay;
pub mod loop_runner;

use std::process::ExitCode;

use tracing::error;

/// Builds the demo arena and runs it headless until the configured frame
/// count is reached.
pub fn run() -> ExitCode {
    let mut app = match bootstrap::build_app() {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };
    loop_runner::run_headless(&mut app.level, &app.config, &app.script);
    ExitCode::SUCCESS
}
