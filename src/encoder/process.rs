use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::{Child, ChildStderr};
use tracing::{debug, info, warn};

use super::command::{find_executable, EncoderCommand, EncoderSettings};
use super::error::EncoderError;
use super::probe::AudioProbe;
use crate::streams::StreamJob;

/// How a stopped encoder ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub status: ExitStatus,

    /// Whether the grace period ran out and the process had to be killed
    pub forced_kill: bool,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Human-readable exit description, e.g. `code 255` or `signal 15`.
    pub fn describe(&self) -> String {
        if let Some(code) = self.status.code() {
            return format!("code {}", code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = self.status.signal() {
                return format!("signal {}", signal);
            }
        }

        self.status.to_string()
    }
}

/// A running encoder child process
///
/// The diagnostic stream is handed out once via [`EncoderHandle::take_stderr`];
/// the process is reaped by [`EncoderHandle::stop`].
pub struct EncoderHandle {
    child: Child,
    pid: Option<u32>,
    stderr: Option<ChildStderr>,
    exit: Option<ExitStatus>,
    command: EncoderCommand,
}

impl EncoderHandle {
    /// Check preconditions, probe the input and start the encoder for `job`.
    ///
    /// No process is spawned when the video file or the encoder executable is missing.
    pub async fn launch(
        job: &StreamJob,
        base_dir: &Path,
        settings: &EncoderSettings,
        probe: &dyn AudioProbe,
    ) -> Result<Self, EncoderError> {
        let video_path = job.video_path(base_dir);
        if !video_path.is_file() {
            return Err(EncoderError::VideoNotFound(video_path));
        }

        if find_executable(&settings.binary).is_none() {
            return Err(EncoderError::EncoderNotFound(settings.binary.clone()));
        }

        let has_audio = match probe.has_audio(&video_path).await {
            Ok(has_audio) => has_audio,
            Err(e) => {
                warn!(
                    "Audio probe {} failed for {}, assuming no audio: {:#}",
                    probe.name(),
                    video_path.display(),
                    e
                );
                false
            }
        };
        if !has_audio {
            info!("{} has no audio stream, adding silent track", job.video_file);
        }

        let mut settings = settings.clone();
        if settings.nice_level != 0 && find_executable("nice").is_none() {
            warn!("`nice` not found, running encoder at normal priority");
            settings.nice_level = 0;
        }

        let command =
            EncoderCommand::build(&settings, &video_path, &job.destination_url, has_audio);
        Self::spawn(command)
    }

    /// Spawn an already built command.
    pub fn spawn(command: EncoderCommand) -> Result<Self, EncoderError> {
        debug!("Spawning encoder: {} {:?}", command.program, command.args);

        let mut child = command.to_command().spawn().map_err(EncoderError::Spawn)?;
        let pid = child.id();
        let stderr = child.stderr.take();

        info!("Encoder started (pid {:?})", pid);

        Ok(Self {
            child,
            pid,
            stderr,
            exit: None,
            command,
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    pub fn command(&self) -> &EncoderCommand {
        &self.command
    }

    /// Take the diagnostic output stream. Returns `None` after the first call.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Wait until the process exits on its own.
    pub async fn wait_exit(&mut self) -> Result<ExitStatus, EncoderError> {
        if let Some(status) = self.exit {
            return Ok(status);
        }

        let status = self.child.wait().await.map_err(EncoderError::Wait)?;
        self.exit = Some(status);
        Ok(status)
    }

    /// Request graceful termination, escalating to a kill after `grace`.
    ///
    /// Always reaps the process. A non-zero exit is reported in the outcome,
    /// not as an error.
    pub async fn stop(mut self, grace: Duration) -> Result<ExitOutcome, EncoderError> {
        if self.exit.is_none() {
            self.exit = self.child.try_wait().map_err(EncoderError::Wait)?;
        }
        if let Some(status) = self.exit {
            debug!("Encoder already exited with {}", status);
            return Ok(ExitOutcome {
                status,
                forced_kill: false,
            });
        }

        self.request_terminate()?;

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(status) => {
                let status = status.map_err(EncoderError::Wait)?;
                info!("Encoder stopped with {}", status);
                Ok(ExitOutcome {
                    status,
                    forced_kill: false,
                })
            }
            Err(_) => {
                warn!(
                    "Encoder (pid {:?}) still running after {:?}, killing",
                    self.pid, grace
                );
                self.child.start_kill().map_err(EncoderError::Kill)?;
                let status = self.child.wait().await.map_err(EncoderError::Wait)?;
                Ok(ExitOutcome {
                    status,
                    forced_kill: true,
                })
            }
        }
    }

    #[cfg(unix)]
    fn request_terminate(&mut self) -> Result<(), EncoderError> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.child.id() else {
            return Ok(());
        };

        match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(EncoderError::Signal {
                pid,
                reason: e.to_string(),
            }),
        }
    }

    #[cfg(not(unix))]
    fn request_terminate(&mut self) -> Result<(), EncoderError> {
        self.child.start_kill().map_err(EncoderError::Kill)
    }
}
