use crate::config::TranscodeConfig;
use crate::error::AssemblyError;
use async_trait::async_trait;
use log::debug;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

const STDERR_TAIL: usize = 512;

/// Re-encodes an ordered list of compressed segments into one stream.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Joins the files named in the concat manifest `list` into `output`.
    async fn concat(&self, list: &Path, output: &Path) -> Result<(), AssemblyError>;
}

/// Transcoder backed by an `ffmpeg` binary using the concat demuxer.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTranscoder {
    config: TranscodeConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: TranscodeConfig) -> Self {
        Self { config }
    }

    pub fn args(&self, list: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error"]
            .into_iter()
            .chain(["-f", "concat", "-safe", "0", "-i"])
            .map(OsString::from)
            .collect();
        args.push(list.as_os_str().to_owned());
        args.extend(
            [
                "-c:a".to_string(),
                self.config.codec.clone(),
                "-ar".to_string(),
                self.config.sample_rate.to_string(),
                "-ac".to_string(),
                self.config.channels.to_string(),
                "-q:a".to_string(),
                self.config.quality.to_string(),
                "-y".to_string(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn concat(&self, list: &Path, output: &Path) -> Result<(), AssemblyError> {
        let bin = &self.config.ffmpeg_bin;
        debug!("Running {bin} on {}", list.display());

        let child = Command::new(bin)
            .args(self.args(list, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AssemblyError::subprocess(format!("failed to start {bin}: {e}")))?;

        let waited = match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    AssemblyError::subprocess(format!("{bin} timed out after {limit:?}"))
                })?,
            None => child.wait_with_output().await,
        };
        let result = waited
            .map_err(|e| AssemblyError::subprocess(format!("failed to wait for {bin}: {e}")))?;

        if !result.status.success() {
            return Err(AssemblyError::TranscodeSubprocessFailed {
                status: result.status.code(),
                reason: stderr_tail(&result.stderr),
            });
        }
        Ok(())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let start = text
        .char_indices()
        .rev()
        .nth(STDERR_TAIL - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let tail = &text[start..];
    if tail.is_empty() {
        "no diagnostic output".to_string()
    } else {
        tail.to_string()
    }
}
