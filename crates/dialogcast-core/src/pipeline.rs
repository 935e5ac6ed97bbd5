use crate::assembler::{Assembler, AssemblyStrategy, FfmpegTranscoder, Transcoder};
use crate::cascade::FallbackCascade;
use crate::config::{PipelineConfig, SpeakerNames};
use crate::error::{ConfigError, PipelineError, Result};
use crate::scheduler::{BatchScheduler, ProgressCallback};
use crate::segment::SegmentInfo;
use crate::transcript::{TranscriptEntry, build_transcript};
use dialogcast_speech::{
    ProviderKind, ScriptLine, SpeakerVoices, SpeechProvider, provider_from_env,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A dialogue to voice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueRequest {
    pub lines: Vec<ScriptLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voices: Option<SpeakerVoices>,
}

impl DialogueRequest {
    pub fn new(lines: Vec<ScriptLine>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn voices(mut self, voices: SpeakerVoices) -> Self {
        self.voices = Some(voices);
        self
    }
}

/// Assembled audio plus everything known about how it was made.
#[derive(Debug, Clone, Serialize)]
pub struct DialogueAudio {
    #[serde(skip)]
    pub audio: Vec<u8>,
    pub segments: Vec<SegmentInfo>,
    pub total_duration_seconds: f64,
    /// Segments produced per provider
    pub provider_usage: BTreeMap<ProviderKind, usize>,
    pub transcript: Vec<TranscriptEntry>,
    pub assembly: AssemblyStrategy,
}

/// Script in, one audio buffer and transcript out.
pub struct DialoguePipeline {
    scheduler: BatchScheduler,
    assembler: Assembler,
    speaker_names: SpeakerNames,
}

impl DialoguePipeline {
    pub fn builder() -> DialoguePipelineBuilder {
        DialoguePipelineBuilder::default()
    }

    /// Builds the configured cascade from environment credentials and an
    /// `ffmpeg` transcoder.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let providers = providers_from_config(&config)?;
        Self::builder().config(config).providers(providers).build()
    }

    pub fn cascade(&self) -> &FallbackCascade {
        self.scheduler.cascade()
    }

    pub async fn run(
        &self,
        request: DialogueRequest,
        progress: Option<ProgressCallback>,
    ) -> Result<DialogueAudio> {
        if request.lines.is_empty() {
            return Err(PipelineError::EmptyScript);
        }
        info!("Voicing {} script lines", request.lines.len());

        let segments = self
            .scheduler
            .run(
                &request.lines,
                request.language.as_deref(),
                request.voices.as_ref(),
                progress.as_ref(),
            )
            .await?;

        let transcript = build_transcript(&segments, &self.speaker_names);
        let infos: Vec<SegmentInfo> = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| SegmentInfo::from_segment(index, segment))
            .collect();
        let total_duration_seconds: f64 = infos.iter().map(|s| s.duration_seconds).sum();
        let mut provider_usage = BTreeMap::new();
        for info in &infos {
            *provider_usage.entry(info.provider).or_insert(0) += 1;
        }
        info!("Provider usage: {provider_usage:?}");

        let assembled = self.assembler.assemble(segments).await?;
        info!(
            "Assembled {} bytes ({:?}, ~{:.1}s)",
            assembled.audio.len(),
            assembled.strategy,
            total_duration_seconds
        );

        Ok(DialogueAudio {
            audio: assembled.audio,
            segments: infos,
            total_duration_seconds,
            provider_usage,
            transcript,
            assembly: assembled.strategy,
        })
    }
}

/// Builds one provider per configured kind, in cascade order, applying the
/// per-provider voices from the config.
pub fn providers_from_config(config: &PipelineConfig) -> Result<Vec<Arc<dyn SpeechProvider>>> {
    config
        .providers
        .iter()
        .map(|kind| {
            provider_from_env(*kind, None, config.voices_for(*kind))
                .map_err(|e| PipelineError::Config(ConfigError::Provider(e)))
        })
        .collect()
}

#[derive(Default)]
pub struct DialoguePipelineBuilder {
    config: Option<PipelineConfig>,
    providers: Vec<Arc<dyn SpeechProvider>>,
    transcoder: Option<Arc<dyn Transcoder>>,
    scratch_root: Option<PathBuf>,
}

impl DialoguePipelineBuilder {
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Providers in cascade order, cheapest first.
    pub fn providers(mut self, providers: Vec<Arc<dyn SpeechProvider>>) -> Self {
        self.providers = providers;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn SpeechProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Defaults to `ffmpeg` with the configured target encoding.
    pub fn transcoder(mut self, transcoder: Arc<dyn Transcoder>) -> Self {
        self.transcoder = Some(transcoder);
        self
    }

    pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn build(self) -> Result<DialoguePipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        if self.providers.is_empty() {
            return Err(ConfigError::Invalid("no speech providers supplied".into()).into());
        }

        let cascade = FallbackCascade::new(self.providers)
            .with_call_timeout(config.call_timeout())
            .with_validation(config.output_validation);
        let scheduler = BatchScheduler::new(cascade)
            .with_batch_size(config.batch_size)
            .with_batch_delay(config.batch_delay());

        let transcoder: Arc<dyn Transcoder> = match self.transcoder {
            Some(transcoder) => transcoder,
            None => Arc::new(FfmpegTranscoder::new(config.transcode.clone())),
        };
        let mut assembler =
            Assembler::new(transcoder).with_failure_policy(config.on_transcode_failure);
        if let Some(root) = self.scratch_root {
            assembler = assembler.with_scratch_root(root);
        }

        Ok(DialoguePipeline {
            scheduler,
            assembler,
            speaker_names: config.speaker_names,
        })
    }
}
