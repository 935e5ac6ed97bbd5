//! ElevenLabs text-to-speech adapter.
//!
//! Highest-fidelity tier. Authenticates with the `xi-api-key` header; emotions
//! are expressed through `voice_settings` (stability and style exaggeration).

use super::{http_client, read_audio_body, require_key};
use crate::{
    Emotion, ProviderKind, Speaker, SpeakerVoices, SpeechBuilder, SpeechError, SpeechProvider,
    SpeechResult, SynthesisRequest, VoiceIdentifier,
};
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/";
pub const DEFAULT_MODEL: &str = "eleven_turbo_v2_5";
const OUTPUT_FORMAT: &str = "mp3_44100_128";
const DEFAULT_VOICE_A: &str = "pNInz6obpgDQGcFmaJgB";
const DEFAULT_VOICE_B: &str = "EXAVITQu4vr4xnSDxMaL";

/// Client for the ElevenLabs text-to-speech API
pub struct ElevenLabsTts {
    pub(crate) api_key: Option<String>,
    pub(crate) base_url: String,
    pub(crate) model: String,
    pub(crate) voices: SpeakerVoices,
    client: reqwest::Client,
}

impl ElevenLabsTts {
    pub fn model(&self) -> &str {
        &self.model
    }

    /// (stability, style) pair for an emotion. Lower stability gives a more
    /// variable, expressive read.
    fn voice_settings(emotion: Emotion) -> serde_json::Value {
        let (stability, style) = match emotion {
            Emotion::Neutral => (0.5, 0.0),
            Emotion::Excited => (0.3, 0.6),
            Emotion::Curious => (0.45, 0.3),
            Emotion::Thoughtful => (0.7, 0.1),
            Emotion::Amused => (0.35, 0.5),
            Emotion::Skeptical => (0.55, 0.3),
            Emotion::Serious => (0.75, 0.0),
        };
        serde_json::json!({
            "stability": stability,
            "similarity_boost": 0.75,
            "style": style,
        })
    }

    /// `v1/text-to-speech/{voice}` under the base URL, with the voice
    /// percent-encoded as a single path segment.
    pub(crate) fn speech_url(&self, voice: &str) -> SpeechResult<reqwest::Url> {
        let invalid = |reason: String| SpeechError::InvalidConfiguration {
            provider: ProviderKind::ElevenLabs,
            reason,
        };
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("invalid base URL '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| invalid(format!("base URL '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(["v1", "text-to-speech", voice]);
        Ok(url)
    }

    pub(crate) fn request_body(&self, request: &SynthesisRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "text": request.text,
            "model_id": self.model,
            "voice_settings": Self::voice_settings(request.emotion),
        });
        // ISO 639-1 only; region subtags are rejected.
        if let Some(language) = request.language.as_deref() {
            let primary = language.split(['-', '_']).next().unwrap_or(language);
            body["language_code"] = serde_json::Value::String(primary.to_lowercase());
        }
        body
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsTts {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ElevenLabs
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn voice_for(&self, speaker: Speaker) -> VoiceIdentifier {
        self.voices.voice(speaker)
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> SpeechResult<Vec<u8>> {
        let key = require_key(self.kind(), &self.api_key)?;
        let url = self.speech_url(request.voice.name())?;
        let response = self
            .client
            .post(url)
            .query(&[("output_format", OUTPUT_FORMAT)])
            .header("xi-api-key", key)
            .header("Accept", "audio/mpeg")
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| SpeechError::from_reqwest(self.kind(), e))?;
        read_audio_body(self.kind(), response).await
    }
}

impl SpeechBuilder<ElevenLabsTts> {
    pub fn build(self) -> SpeechResult<Arc<ElevenLabsTts>> {
        let client = http_client(ProviderKind::ElevenLabs, self.timeout_seconds)?;
        Ok(Arc::new(ElevenLabsTts {
            api_key: self.api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            voices: self
                .voices
                .unwrap_or_else(|| SpeakerVoices::new(DEFAULT_VOICE_A, DEFAULT_VOICE_B)),
            client,
        }))
    }
}

impl ElevenLabsTts {
    /// Builds the adapter from `ELEVENLABS_API_KEY`.
    pub fn from_env() -> SpeechResult<Arc<Self>> {
        Self::env_builder().build()
    }

    pub(crate) fn env_builder() -> SpeechBuilder<Self> {
        SpeechBuilder::<Self>::new().api_key_opt(super::env_key(ProviderKind::ElevenLabs))
    }
}
