//! # DialogCast Core
//!
//! Turns a two-speaker dialogue script into one audio buffer and a
//! timestamped transcript.
//!
//! Each line goes through a [`FallbackCascade`] that tries speech providers
//! cheapest first. A [`BatchScheduler`] runs lines concurrently in batches
//! while keeping script order. The [`Assembler`] joins the segments, through
//! a [`Transcoder`] when they came from different providers.
//!
//! ```rust,no_run
//! use dialogcast_core::{DialoguePipeline, DialogueRequest, PipelineConfig};
//! use dialogcast_speech::{ScriptLine, Speaker};
//!
//! # async fn run() -> Result<(), dialogcast_core::PipelineError> {
//! let pipeline = DialoguePipeline::from_config(PipelineConfig::default())?;
//! let request = DialogueRequest::new(vec![
//!     ScriptLine::new(Speaker::A, "Welcome to the show."),
//!     ScriptLine::new(Speaker::B, "Thanks for having me."),
//! ]);
//! let output = pipeline.run(request, None).await?;
//! std::fs::write("episode.mp3", &output.audio).ok();
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod cascade;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod scheduler;
pub mod segment;
pub mod transcript;

#[cfg(test)]
mod tests;

pub use assembler::{
    AssembledAudio, Assembler, AssemblyStrategy, FfmpegTranscoder, ScratchDir, Transcoder,
};
pub use cascade::FallbackCascade;
pub use config::{
    OutputValidation, PipelineConfig, SpeakerNames, TranscodeConfig, TranscodeFailurePolicy,
};
pub use error::{AssemblyError, ConfigError, PipelineError, Result, SynthesisError};
pub use pipeline::{
    DialogueAudio, DialoguePipeline, DialoguePipelineBuilder, DialogueRequest,
    providers_from_config,
};
pub use scheduler::{BatchScheduler, Progress, ProgressCallback};
pub use segment::{AudioSegment, SegmentInfo, estimate_duration};
pub use transcript::{TranscriptEntry, build_transcript, render_srt, render_text};

// Re-exported so callers need only one dependency.
pub use dialogcast_speech;
