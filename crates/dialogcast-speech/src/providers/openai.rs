//! OpenAI speech adapter.
//!
//! Universal fallback tier: widely available and tolerant of any language.
//! Bearer-token auth against `/audio/speech`; emotions become a spoken-style
//! instruction on models that accept one.

use super::{http_client, join_url, read_audio_body, require_key};
use crate::{
    ProviderKind, Speaker, SpeakerVoices, SpeechBuilder, SpeechError, SpeechProvider,
    SpeechResult, SynthesisRequest, VoiceIdentifier,
};
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini-tts";
const DEFAULT_VOICE_A: &str = "onyx";
const DEFAULT_VOICE_B: &str = "nova";

/// Client for the OpenAI speech endpoint
pub struct OpenAiTts {
    pub(crate) api_key: Option<String>,
    pub(crate) base_url: String,
    pub(crate) model: String,
    pub(crate) voices: SpeakerVoices,
    client: reqwest::Client,
}

impl OpenAiTts {
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The legacy `tts-1` family rejects the `instructions` field.
    fn supports_instructions(&self) -> bool {
        !self.model.starts_with("tts-1")
    }

    pub(crate) fn request_body(&self, request: &SynthesisRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "input": request.text,
            "voice": request.voice.name(),
            "response_format": "mp3",
        });
        if self.supports_instructions() {
            body["instructions"] = serde_json::Value::String(format!(
                "Speak in {} tone, as one of two hosts in a conversation.",
                request.emotion.description()
            ));
        }
        body
    }
}

#[async_trait]
impl SpeechProvider for OpenAiTts {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn voice_for(&self, speaker: Speaker) -> VoiceIdentifier {
        self.voices.voice(speaker)
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> SpeechResult<Vec<u8>> {
        let key = require_key(self.kind(), &self.api_key)?;
        let response = self
            .client
            .post(join_url(&self.base_url, "audio/speech"))
            .bearer_auth(key)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| SpeechError::from_reqwest(self.kind(), e))?;
        read_audio_body(self.kind(), response).await
    }
}

impl SpeechBuilder<OpenAiTts> {
    pub fn build(self) -> SpeechResult<Arc<OpenAiTts>> {
        let client = http_client(ProviderKind::OpenAI, self.timeout_seconds)?;
        Ok(Arc::new(OpenAiTts {
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

impl OpenAiTts {
    /// Builds the adapter from `OPENAI_API_KEY`.
    pub fn from_env() -> SpeechResult<Arc<Self>> {
        Self::env_builder().build()
    }

    pub(crate) fn env_builder() -> SpeechBuilder<Self> {
        SpeechBuilder::<Self>::new().api_key_opt(super::env_key(ProviderKind::OpenAI))
    }
}
