use serde::Deserialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Encoder settings (the `[encoder]` config section)
#[derive(Debug, Clone, Deserialize)]
pub struct EncoderSettings {
    /// Encoder executable name or path
    pub binary: String,

    /// Probe executable used to detect audio streams
    pub probe_binary: String,

    /// Scheduling niceness for the encoder; 0 runs it without the `nice` wrapper
    pub nice_level: i32,

    pub video_codec: String,
    pub audio_codec: String,
    pub audio_bitrate: String,

    /// Encoder thread cap
    pub threads: u32,

    /// Output container format for live ingestion
    pub format: String,

    /// lavfi source used when the input carries no audio
    pub silent_audio: String,
}

/// Fully built encoder invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EncoderCommand {
    /// Build the invocation that loops `input` forever at real-time rate and
    /// pushes it to `destination_url`.
    pub fn build(
        settings: &EncoderSettings,
        input: &Path,
        destination_url: &str,
        has_audio: bool,
    ) -> Self {
        let mut encoder_args: Vec<String> = vec![
            "-nostdin".into(),
            "-re".into(),
            "-stream_loop".into(),
            "-1".into(),
            "-i".into(),
            input.display().to_string(),
        ];

        if !has_audio {
            encoder_args.extend([
                "-f".into(),
                "lavfi".into(),
                "-i".into(),
                settings.silent_audio.clone(),
            ]);
        }

        encoder_args.extend(["-c:v".into(), settings.video_codec.clone()]);
        encoder_args.extend(["-c:a".into(), settings.audio_codec.clone()]);
        if settings.audio_codec != "copy" && !settings.audio_bitrate.is_empty() {
            encoder_args.extend(["-b:a".into(), settings.audio_bitrate.clone()]);
        }
        encoder_args.extend(["-threads".into(), settings.threads.to_string()]);
        encoder_args.extend([
            "-f".into(),
            settings.format.clone(),
            destination_url.to_string(),
        ]);

        if settings.nice_level == 0 {
            return Self {
                program: settings.binary.clone(),
                args: encoder_args,
            };
        }

        let mut args = vec![format!("-n{}", settings.nice_level), settings.binary.clone()];
        args.extend(encoder_args);

        Self {
            program: "nice".to_string(),
            args,
        }
    }

    /// Whether a synthesized silent audio input was added.
    pub fn has_silent_audio(&self) -> bool {
        self.args.windows(2).any(|pair| pair[0] == "-f" && pair[1] == "lavfi")
    }

    /// Whether the encoder runs under the `nice` wrapper.
    pub fn is_niced(&self) -> bool {
        self.program == "nice"
    }

    /// Process command with stdin closed, stdout discarded and stderr piped.
    ///
    /// On unix the encoder gets its own process group, so a terminal Ctrl-C
    /// reaches only this program and the encoder is stopped through `stop`.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

/// Resolve an executable the way a shell would: paths are checked directly,
/// bare names are searched on `PATH`.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(OsStr::new(name)))
        .find(|path| path.is_file())
}
