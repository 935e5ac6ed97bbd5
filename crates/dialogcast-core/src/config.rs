//! Pipeline configuration, loadable from TOML.
//!
//! Every field has a default so an empty file (or no file at all) yields the
//! standard pipeline: batches of 7, a 500 ms pause between batches, a 30 s
//! per-call timeout and the full provider cascade.

use crate::error::ConfigError;
use dialogcast_speech::{ProviderKind, Speaker, SpeakerVoices};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 7;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 500;
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// What to do with provider output that does not look like MP3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputValidation {
    /// Accept whatever the provider returns.
    #[default]
    Trust,
    /// Treat an unrecognised header as a failed request and fall back.
    RequireMp3,
}

/// What to do when the external transcoder fails on a mixed-provider script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscodeFailurePolicy {
    /// Fall back to raw concatenation and log a warning.
    #[default]
    Degrade,
    Fail,
}

/// Display names used in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerNames {
    pub a: String,
    pub b: String,
}

impl Default for SpeakerNames {
    fn default() -> Self {
        Self {
            a: "Host".to_string(),
            b: "Guest".to_string(),
        }
    }
}

impl SpeakerNames {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    pub fn name(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::A => &self.a,
            Speaker::B => &self.b,
        }
    }
}

/// Target encoding and binary for the heterogeneous assembly path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    pub ffmpeg_bin: String,
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u8,
    /// VBR quality passed as `-q:a`
    pub quality: u8,
    /// 0 disables the timeout
    pub timeout_secs: u64,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            codec: "libmp3lame".to_string(),
            sample_rate: 44_100,
            channels: 1,
            quality: 2,
            timeout_secs: 120,
        }
    }
}

impl TranscodeConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// A voice pair as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePair {
    pub a: String,
    pub b: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    /// Per provider call; 0 disables the timeout
    pub call_timeout_secs: u64,
    pub output_validation: OutputValidation,
    pub on_transcode_failure: TranscodeFailurePolicy,
    /// Cascade order, cheapest first
    pub providers: Vec<ProviderKind>,
    pub speaker_names: SpeakerNames,
    pub transcode: TranscodeConfig,
    /// Default voices per provider, keyed by provider name
    pub voices: BTreeMap<String, VoicePair>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
            output_validation: OutputValidation::default(),
            on_transcode_failure: TranscodeFailurePolicy::default(),
            providers: ProviderKind::DEFAULT_CASCADE.to_vec(),
            speaker_names: SpeakerNames::default(),
            transcode: TranscodeConfig::default(),
            voices: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if self.providers.is_empty() {
            return Err(ConfigError::Invalid(
                "providers must name at least one provider".into(),
            ));
        }
        let mut seen = BTreeSet::new();
        for provider in &self.providers {
            if !seen.insert(*provider) {
                return Err(ConfigError::Invalid(format!(
                    "provider {provider} is listed more than once"
                )));
            }
        }
        if self.transcode.channels == 0 {
            return Err(ConfigError::Invalid(
                "transcode.channels must be at least 1".into(),
            ));
        }
        if self.transcode.sample_rate == 0 {
            return Err(ConfigError::Invalid(
                "transcode.sample_rate must be positive".into(),
            ));
        }
        if self.transcode.ffmpeg_bin.trim().is_empty() {
            return Err(ConfigError::Invalid("transcode.ffmpeg_bin is empty".into()));
        }
        for name in self.voices.keys() {
            ProviderKind::from_str(name).map_err(|_| {
                ConfigError::Invalid(format!("unknown provider '{name}' in [voices]"))
            })?;
        }
        Ok(())
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        (self.call_timeout_secs > 0).then(|| Duration::from_secs(self.call_timeout_secs))
    }

    /// Configured default voices for one provider, if any.
    pub fn voices_for(&self, provider: ProviderKind) -> Option<SpeakerVoices> {
        self.voices.iter().find_map(|(name, pair)| {
            (ProviderKind::from_str(name).ok() == Some(provider))
                .then(|| SpeakerVoices::new(pair.a.clone(), pair.b.clone()))
        })
    }
}
