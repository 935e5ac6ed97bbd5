//! Merges per-line segments into one playable buffer.
//!
//! Segments from a single provider share an encoder, so their MP3 frames can
//! be joined byte for byte. Mixed providers disagree on sample rate, bitrate
//! and channel layout, so those are re-encoded to one target through a
//! [`Transcoder`] working in a throwaway [`ScratchDir`].

mod scratch;
mod transcode;

pub use scratch::{ScratchDir, concat_list};
pub use transcode::{FfmpegTranscoder, Transcoder};

use crate::config::TranscodeFailurePolicy;
use crate::error::AssemblyError;
use crate::segment::AudioSegment;
use dialogcast_speech::ProviderKind;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

/// How the final buffer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyStrategy {
    /// Single segment returned untouched
    Passthrough,
    /// Raw concatenation of segments from one provider
    Concatenated,
    /// Re-encoded through the transcoder
    Transcoded,
    /// Transcoder failed; raw concatenation of mixed providers
    DegradedConcatenation,
}

#[derive(Debug, Clone)]
pub struct AssembledAudio {
    pub audio: Vec<u8>,
    pub strategy: AssemblyStrategy,
}

pub struct Assembler {
    transcoder: Arc<dyn Transcoder>,
    on_failure: TranscodeFailurePolicy,
    scratch_root: Option<PathBuf>,
}

impl Assembler {
    pub fn new(transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            transcoder,
            on_failure: TranscodeFailurePolicy::default(),
            scratch_root: None,
        }
    }

    pub fn with_failure_policy(mut self, policy: TranscodeFailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    /// Places scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub async fn assemble(
        &self,
        mut segments: Vec<AudioSegment>,
    ) -> Result<AssembledAudio, AssemblyError> {
        if segments.len() <= 1 {
            let segment = segments.pop().ok_or(AssemblyError::EmptyInput)?;
            return Ok(AssembledAudio {
                audio: segment.audio,
                strategy: AssemblyStrategy::Passthrough,
            });
        }

        let providers: BTreeSet<ProviderKind> = segments.iter().map(|s| s.provider).collect();
        if providers.len() == 1 {
            return Ok(AssembledAudio {
                audio: concatenate(&segments),
                strategy: AssemblyStrategy::Concatenated,
            });
        }

        info!(
            "Re-encoding {} segments from {} providers",
            segments.len(),
            providers.len()
        );
        match self.transcode(&segments).await {
            Ok(audio) => Ok(AssembledAudio {
                audio,
                strategy: AssemblyStrategy::Transcoded,
            }),
            Err(err @ AssemblyError::TranscodeSubprocessFailed { .. })
                if self.on_failure == TranscodeFailurePolicy::Degrade =>
            {
                warn!("{err}; falling back to raw concatenation");
                Ok(AssembledAudio {
                    audio: concatenate(&segments),
                    strategy: AssemblyStrategy::DegradedConcatenation,
                })
            }
            Err(err) => Err(err),
        }
    }

    async fn transcode(&self, segments: &[AudioSegment]) -> Result<Vec<u8>, AssemblyError> {
        let scratch = match &self.scratch_root {
            Some(root) => ScratchDir::new_in(root)?,
            None => ScratchDir::new()?,
        };

        let mut inputs = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            let path = scratch.file(&format!("segment_{index:04}.mp3"));
            tokio::fs::write(&path, &segment.audio).await?;
            inputs.push(path);
        }

        let list = scratch.file("concat.txt");
        tokio::fs::write(&list, concat_list(&inputs)).await?;

        let output = scratch.file("output.mp3");
        self.transcoder.concat(&list, &output).await?;
        let audio = tokio::fs::read(&output).await.map_err(|e| {
            AssemblyError::subprocess(format!("transcoder produced no output: {e}"))
        })?;

        scratch.close();
        Ok(audio)
    }
}

fn concatenate(segments: &[AudioSegment]) -> Vec<u8> {
    let mut audio = Vec::with_capacity(segments.iter().map(|s| s.audio.len()).sum());
    for segment in segments {
        audio.extend_from_slice(&segment.audio);
    }
    audio
}
