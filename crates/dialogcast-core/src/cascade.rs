//! Per-line fallback across interchangeable speech providers.

use crate::config::OutputValidation;
use crate::error::SynthesisError;
use crate::segment::AudioSegment;
use dialogcast_speech::{
    ProviderKind, ScriptLine, SpeakerVoices, SpeechError, SpeechProvider, SpeechResult,
    SynthesisRequest, sniff,
};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

/// Tries providers in order until one returns audio for a line.
///
/// Providers without credentials are skipped silently. Request failures,
/// timeouts and (under [`OutputValidation::RequireMp3`]) unrecognised audio
/// move on to the next provider.
pub struct FallbackCascade {
    providers: Vec<Arc<dyn SpeechProvider>>,
    call_timeout: Option<Duration>,
    validation: OutputValidation,
}

impl FallbackCascade {
    pub fn new(providers: Vec<Arc<dyn SpeechProvider>>) -> Self {
        Self {
            providers,
            call_timeout: None,
            validation: OutputValidation::Trust,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_validation(mut self, validation: OutputValidation) -> Self {
        self.validation = validation;
        self
    }

    pub fn providers(&self) -> &[Arc<dyn SpeechProvider>] {
        &self.providers
    }

    /// Kinds of the providers that currently hold a credential, in order.
    pub fn configured(&self) -> Vec<ProviderKind> {
        self.providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.kind())
            .collect()
    }

    pub async fn synthesize_line(
        &self,
        index: usize,
        line: &ScriptLine,
        language: Option<&str>,
        voices: Option<&SpeakerVoices>,
    ) -> Result<AudioSegment, SynthesisError> {
        let mut attempted = Vec::new();
        let mut failures = Vec::new();

        for provider in &self.providers {
            let kind = provider.kind();
            if !provider.is_configured() {
                debug!("Line {index}: skipping {kind}, no credential");
                continue;
            }

            let voice = voices
                .filter(|v| v.applies_to(kind))
                .map(|v| v.voice(line.speaker))
                .unwrap_or_else(|| provider.voice_for(line.speaker));
            let request = SynthesisRequest {
                text: line.text.clone(),
                voice,
                language: language.map(str::to_string),
                emotion: line.emotion,
            };

            match self.attempt(provider.as_ref(), &request).await {
                Ok(audio) => {
                    debug!("Line {index}: synthesized by {kind} ({} bytes)", audio.len());
                    return Ok(AudioSegment::new(line, audio, kind));
                }
                Err(SpeechError::ConfigurationMissing { .. }) => {
                    debug!("Line {index}: {kind} reported a missing credential, skipping");
                }
                Err(e) => {
                    warn!("Line {index}: {e}; falling back");
                    attempted.push(kind);
                    failures.push(e.to_string());
                }
            }
        }

        Err(SynthesisError::AllProvidersExhausted {
            line: index,
            attempted,
            failures,
        })
    }

    async fn attempt(
        &self,
        provider: &dyn SpeechProvider,
        request: &SynthesisRequest,
    ) -> SpeechResult<Vec<u8>> {
        let kind = provider.kind();
        let audio = match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, provider.synthesize(request))
                .await
                .map_err(|_| {
                    SpeechError::request_failed(kind, format!("timed out after {limit:?}"))
                })??,
            None => provider.synthesize(request).await?,
        };

        if self.validation == OutputValidation::RequireMp3 {
            let container = sniff(&audio);
            if !container.is_mp3() {
                return Err(SpeechError::request_failed(
                    kind,
                    format!("returned non-MP3 audio ({container:?})"),
                ));
            }
        }
        Ok(audio)
    }
}
