//! Google Cloud Text-to-Speech adapter.
//!
//! Cheapest tier for bulk synthesis. Authenticates with an API key passed as
//! the `key` query parameter and returns base64-encoded MP3 inside JSON.

use super::{ensure_success, http_client, join_url, require_key};
use crate::{
    ProviderKind, Speaker, SpeakerVoices, SpeechBuilder, SpeechError, SpeechProvider,
    SpeechResult, SynthesisRequest, VoiceIdentifier,
};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com/";
const DEFAULT_VOICE_A: &str = "en-US-Neural2-D";
const DEFAULT_VOICE_B: &str = "en-US-Neural2-F";

/// Client for the Google Cloud Text-to-Speech REST API
pub struct GoogleCloudTts {
    pub(crate) api_key: Option<String>,
    pub(crate) base_url: String,
    pub(crate) voices: SpeakerVoices,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioContent")]
    audio_content: String,
}

impl GoogleCloudTts {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Google requires a `languageCode` matching the voice; a region-qualified
    /// hint wins, otherwise the code is taken from the voice name.
    fn language_code(language: Option<&str>, voice: &str) -> String {
        if let Some(hint) = language.filter(|h| h.contains('-')) {
            return hint.to_string();
        }
        let mut parts = voice.splitn(3, '-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(lang), Some(region), Some(_)) => format!("{lang}-{region}"),
            _ => language.unwrap_or("en-US").to_string(),
        }
    }
}

#[async_trait]
impl SpeechProvider for GoogleCloudTts {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GoogleCloud
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn voice_for(&self, speaker: Speaker) -> VoiceIdentifier {
        self.voices.voice(speaker)
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> SpeechResult<Vec<u8>> {
        let key = require_key(self.kind(), &self.api_key)?;
        let voice = request.voice.name();
        let body = serde_json::json!({
            "input": { "text": request.text },
            "voice": {
                "languageCode": Self::language_code(request.language.as_deref(), voice),
                "name": voice,
            },
            "audioConfig": { "audioEncoding": "MP3" },
        });

        let response = self
            .client
            .post(join_url(&self.base_url, "v1/text:synthesize"))
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| SpeechError::from_reqwest(self.kind(), e))?;
        let response = ensure_success(self.kind(), response).await?;

        let payload: SynthesizeResponse = response.json().await.map_err(|e| {
            SpeechError::request_failed(self.kind(), format!("malformed response: {e}"))
        })?;
        let audio = base64::engine::general_purpose::STANDARD
            .decode(payload.audio_content.as_bytes())
            .map_err(|e| {
                SpeechError::request_failed(self.kind(), format!("invalid audioContent: {e}"))
            })?;
        if audio.is_empty() {
            return Err(SpeechError::request_failed(
                self.kind(),
                "response contained no audio",
            ));
        }
        Ok(audio)
    }
}

impl SpeechBuilder<GoogleCloudTts> {
    pub fn build(self) -> SpeechResult<Arc<GoogleCloudTts>> {
        let client = http_client(ProviderKind::GoogleCloud, self.timeout_seconds)?;
        Ok(Arc::new(GoogleCloudTts {
            api_key: self.api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            voices: self
                .voices
                .unwrap_or_else(|| SpeakerVoices::new(DEFAULT_VOICE_A, DEFAULT_VOICE_B)),
            client,
        }))
    }
}

impl GoogleCloudTts {
    /// Builds the adapter from `GOOGLE_TTS_API_KEY`.
    pub fn from_env() -> SpeechResult<Arc<Self>> {
        Self::env_builder().build()
    }

    pub(crate) fn env_builder() -> SpeechBuilder<Self> {
        SpeechBuilder::<Self>::new().api_key_opt(super::env_key(ProviderKind::GoogleCloud))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code_from_voice() {
        assert_eq!(
            GoogleCloudTts::language_code(None, "en-GB-Neural2-A"),
            "en-GB"
        );
        assert_eq!(
            GoogleCloudTts::language_code(Some("fr"), "fr-FR-Wavenet-B"),
            "fr-FR"
        );
    }

    #[test]
    fn test_language_code_prefers_region_qualified_hint() {
        assert_eq!(
            GoogleCloudTts::language_code(Some("pt-BR"), "custom"),
            "pt-BR"
        );
        assert_eq!(GoogleCloudTts::language_code(Some("de"), "custom"), "de");
        assert_eq!(GoogleCloudTts::language_code(None, "custom"), "en-US");
    }

    #[test]
    fn test_builder_defaults() {
        let tts = SpeechBuilder::<GoogleCloudTts>::new().build().unwrap();
        assert!(!tts.is_configured());
        assert_eq!(tts.base_url(), DEFAULT_BASE_URL);
        assert_eq!(tts.voice_for(Speaker::A).name(), DEFAULT_VOICE_A);
        assert_eq!(tts.voice_for(Speaker::B).name(), DEFAULT_VOICE_B);
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_missing() {
        let tts = SpeechBuilder::<GoogleCloudTts>::new()
            .api_key("   ")
            .build()
            .unwrap();
        let request = SynthesisRequest {
            text: "hello".to_string(),
            voice: tts.voice_for(Speaker::A),
            language: None,
            emotion: Default::default(),
        };
        let err = tts.synthesize(&request).await.unwrap_err();
        assert!(matches!(err, SpeechError::ConfigurationMissing { .. }));
    }
}
