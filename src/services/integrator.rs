//! Running the modpack's `modimporter.py` after the Mods folder changes.
//!
//! The importer is an external script we cannot modify. Some versions stop
//! and wait for the user to press Enter, so while it runs we poll it on a
//! fixed tick and write a blank line to its stdin each time it is still
//! alive. The wait has no timeout; a caller that needs one cancels the
//! [`CancellationToken`] instead, which kills the child.

use super::archive::INTEGRATOR_SCRIPT;
use super::error::InstallError;
use camino::Utf8Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

/// Interval between liveness checks / Enter presses
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How a finished importer run ended
///
/// The exit code is reported for the caller to display; it does not decide
/// whether the install or uninstall counts as successful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegratorOutcome {
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

impl IntegratorOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Launches the importer script through the platform shell
#[derive(Debug, Clone)]
pub struct ScriptIntegrator {
    command: String,
    poll_interval: Duration,
}

impl ScriptIntegrator {
    /// Integrator using the platform's default way of running `modimporter.py`
    pub fn new() -> Self {
        Self {
            command: default_command(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Use a custom shell command line; an empty string keeps the default
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        let command = command.into();
        if !command.trim().is_empty() {
            self.command = command;
        }
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn shell_command(&self, content_dir: &Utf8Path) -> Command {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", &self.command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", &self.command]);
            c
        };

        cmd.current_dir(content_dir).stdin(Stdio::piped());
        cmd
    }

    /// Run the importer in `content_dir` and wait for it to exit.
    ///
    /// # Errors
    ///
    /// - [`InstallError::IntegratorSpawn`] if the shell cannot be started
    /// - [`InstallError::Cancelled`] if `cancel` fires before the child exits
    /// - [`InstallError::Io`] if the child's status cannot be polled
    pub async fn run(
        &self,
        content_dir: &Utf8Path,
        cancel: &CancellationToken,
    ) -> Result<IntegratorOutcome, InstallError> {
        tracing::info!("Running `{}` in {}", self.command, content_dir);

        let start = Instant::now();
        let mut child = self
            .shell_command(content_dir)
            .spawn()
            .map_err(InstallError::IntegratorSpawn)?;

        let status = self.wait_feeding_input(&mut child, content_dir, cancel).await?;

        let outcome = IntegratorOutcome {
            exit_code: status.code(),
            duration: start.elapsed(),
        };

        if outcome.succeeded() {
            tracing::info!(
                "modimporter completed in {:.2}s",
                outcome.duration.as_secs_f32()
            );
        } else {
            tracing::warn!(
                "modimporter exited with {:?} after {:.2}s",
                outcome.exit_code,
                outcome.duration.as_secs_f32()
            );
        }

        Ok(outcome)
    }

    async fn wait_feeding_input(
        &self,
        child: &mut Child,
        content_dir: &Utf8Path,
        cancel: &CancellationToken,
    ) -> Result<ExitStatus, InstallError> {
        let mut stdin = child.stdin.take();

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = cancel.cancelled() => {
                    tracing::warn!("Cancelling modimporter");
                    if let Err(e) = child.kill().await {
                        tracing::warn!("Failed to kill modimporter: {}", e);
                    }
                    return Err(InstallError::Cancelled);
                }
            }

            if let Some(status) = child
                .try_wait()
                .map_err(|e| InstallError::io(content_dir.join(INTEGRATOR_SCRIPT), e))?
            {
                return Ok(status);
            }

            if let Some(input) = stdin.as_mut() {
                let fed = match input.write_all(b"\n").await {
                    Ok(()) => input.flush().await,
                    Err(e) => Err(e),
                };
                if let Err(e) = fed {
                    // The script closed its stdin; keep polling without input.
                    tracing::debug!("Stopped feeding modimporter input: {}", e);
                    stdin = None;
                }
            }
        }
    }
}

impl Default for ScriptIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

fn default_command() -> String {
    if cfg!(target_os = "windows") {
        INTEGRATOR_SCRIPT.to_string()
    } else {
        format!("python3 {}", INTEGRATOR_SCRIPT)
    }
}
