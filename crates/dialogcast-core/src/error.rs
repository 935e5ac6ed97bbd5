use dialogcast_speech::{ProviderKind, SpeechError};
use std::path::PathBuf;
use thiserror::Error;

/// Failure of the per-line provider cascade.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error(
        "All providers exhausted for line {line} (attempted: {})",
        list_attempted(.attempted)
    )]
    AllProvidersExhausted {
        /// Zero-based position of the line in the script
        line: usize,
        attempted: Vec<ProviderKind>,
        failures: Vec<String>,
    },

    #[error("No segment was produced for line {line}")]
    MissingSegment { line: usize },
}

impl SynthesisError {
    pub fn line(&self) -> usize {
        match self {
            SynthesisError::AllProvidersExhausted { line, .. }
            | SynthesisError::MissingSegment { line } => *line,
        }
    }
}

fn list_attempted(attempted: &[ProviderKind]) -> String {
    if attempted.is_empty() {
        return "none configured".to_string();
    }
    attempted
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while merging segments into one buffer.
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("No segments to assemble")]
    EmptyInput,

    #[error("Transcoder failed{}: {reason}", exit_suffix(.status))]
    TranscodeSubprocessFailed { status: Option<i32>, reason: String },

    #[error("Failed to remove scratch directory {}: {source}", path.display())]
    TempResourceCleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scratch I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssemblyError {
    pub(crate) fn subprocess(reason: impl Into<String>) -> Self {
        AssemblyError::TranscodeSubprocessFailed {
            status: None,
            reason: reason.into(),
        }
    }
}

fn exit_suffix(status: &Option<i32>) -> String {
    status
        .map(|code| format!(" with exit code {code}"))
        .unwrap_or_default()
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Provider(#[from] SpeechError),
}

/// Top-level error of a pipeline run, tagged by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Script contains no lines")]
    EmptyScript,

    #[error("Synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_names_line_and_providers() {
        let err = SynthesisError::AllProvidersExhausted {
            line: 3,
            attempted: vec![ProviderKind::GoogleCloud, ProviderKind::OpenAI],
            failures: vec!["boom".into(), "bang".into()],
        };
        assert_eq!(err.line(), 3);
        assert_eq!(
            err.to_string(),
            "All providers exhausted for line 3 (attempted: google_cloud, openai)"
        );
    }

    #[test]
    fn test_exhausted_without_configured_providers() {
        let err = SynthesisError::AllProvidersExhausted {
            line: 0,
            attempted: vec![],
            failures: vec![],
        };
        assert!(err.to_string().contains("none configured"));
    }

    #[test]
    fn test_transcode_failure_display() {
        let err = AssemblyError::TranscodeSubprocessFailed {
            status: Some(1),
            reason: "Invalid data found".into(),
        };
        assert_eq!(
            err.to_string(),
            "Transcoder failed with exit code 1: Invalid data found"
        );
        assert_eq!(
            AssemblyError::subprocess("not found").to_string(),
            "Transcoder failed: not found"
        );
    }

    #[test]
    fn test_pipeline_error_wraps_stage() {
        let err: PipelineError = AssemblyError::EmptyInput.into();
        assert!(matches!(err, PipelineError::Assembly(_)));
        assert_eq!(err.to_string(), "Assembly failed: No segments to assemble");
    }
}
