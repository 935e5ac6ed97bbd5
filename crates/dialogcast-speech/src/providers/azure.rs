//! Azure AI Speech adapter.
//!
//! Mid-cost tier. Sends SSML, authenticates with the
//! `Ocp-Apim-Subscription-Key` header and receives raw MP3. Emotions map to
//! `mstts:express-as` speaking styles.

use super::{http_client, join_url, read_audio_body, require_key};
use crate::{
    Emotion, ProviderKind, Speaker, SpeakerVoices, SpeechBuilder, SpeechError, SpeechProvider,
    SpeechResult, SynthesisRequest, VoiceIdentifier,
};
use async_trait::async_trait;
use quick_xml::escape::escape;
use std::sync::Arc;

pub const DEFAULT_REGION: &str = "eastus";
pub const REGION_ENV: &str = "AZURE_SPEECH_REGION";
const OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";
const DEFAULT_VOICE_A: &str = "en-US-GuyNeural";
const DEFAULT_VOICE_B: &str = "en-US-JennyNeural";

/// Client for the Azure AI Speech text-to-speech REST API
pub struct AzureTts {
    pub(crate) api_key: Option<String>,
    pub(crate) base_url: String,
    pub(crate) voices: SpeakerVoices,
    client: reqwest::Client,
}

impl AzureTts {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn style(emotion: Emotion) -> Option<&'static str> {
        match emotion {
            Emotion::Neutral => None,
            Emotion::Excited => Some("excited"),
            Emotion::Curious => Some("friendly"),
            Emotion::Thoughtful => Some("calm"),
            Emotion::Amused => Some("cheerful"),
            Emotion::Skeptical => Some("chat"),
            Emotion::Serious => Some("serious"),
        }
    }

    fn xml_lang(language: Option<&str>, voice: &str) -> String {
        if let Some(hint) = language {
            return hint.to_string();
        }
        let mut parts = voice.splitn(3, '-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(lang), Some(region), Some(_)) => format!("{lang}-{region}"),
            _ => "en-US".to_string(),
        }
    }

    pub(crate) fn ssml(request: &SynthesisRequest) -> String {
        let voice = request.voice.name();
        let text = escape(request.text.as_str());
        let inner = match Self::style(request.emotion) {
            Some(style) => {
                format!(r#"<mstts:express-as style="{style}">{text}</mstts:express-as>"#)
            }
            None => text.into_owned(),
        };
        format!(
            concat!(
                r#"<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" "#,
                r#"xmlns:mstts="https://www.w3.org/2001/mstts" xml:lang="{lang}">"#,
                r#"<voice name="{voice}">{inner}</voice></speak>"#
            ),
            lang = escape(Self::xml_lang(request.language.as_deref(), voice).as_str()),
            voice = escape(voice),
            inner = inner,
        )
    }
}

#[async_trait]
impl SpeechProvider for AzureTts {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Azure
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
            .post(join_url(&self.base_url, "cognitiveservices/v1"))
            .header("Ocp-Apim-Subscription-Key", key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header("User-Agent", "dialogcast")
            .body(Self::ssml(request))
            .send()
            .await
            .map_err(|e| SpeechError::from_reqwest(self.kind(), e))?;
        read_audio_body(self.kind(), response).await
    }
}

impl SpeechBuilder<AzureTts> {
    pub fn build(self) -> SpeechResult<Arc<AzureTts>> {
        let client = http_client(ProviderKind::Azure, self.timeout_seconds)?;
        let region = self.region.unwrap_or_else(|| DEFAULT_REGION.to_string());
        let base_url = self
            .base_url
            .unwrap_or_else(|| format!("https://{region}.tts.speech.microsoft.com/"));
        Ok(Arc::new(AzureTts {
            api_key: self.api_key,
            base_url,
            voices: self
                .voices
                .unwrap_or_else(|| SpeakerVoices::new(DEFAULT_VOICE_A, DEFAULT_VOICE_B)),
            client,
        }))
    }
}

impl AzureTts {
    /// Builds the adapter from `AZURE_SPEECH_KEY` and `AZURE_SPEECH_REGION`.
    pub fn from_env() -> SpeechResult<Arc<Self>> {
        Self::env_builder().build()
    }

    pub(crate) fn env_builder() -> SpeechBuilder<Self> {
        let builder =
            SpeechBuilder::<Self>::new().api_key_opt(super::env_key(ProviderKind::Azure));
        match std::env::var(REGION_ENV) {
            Ok(region) if !region.trim().is_empty() => builder.region(region),
            _ => builder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str, emotion: Emotion) -> SynthesisRequest {
        SynthesisRequest {
            text: text.to_string(),
            voice: VoiceIdentifier::new(DEFAULT_VOICE_B),
            language: None,
            emotion,
        }
    }

    #[test]
    fn test_ssml_escapes_text() {
        let ssml = AzureTts::ssml(&request("Cats & <dogs>", Emotion::Neutral));
        assert!(ssml.contains("Cats &amp; &lt;dogs&gt;"));
        assert!(ssml.contains(r#"<voice name="en-US-JennyNeural">"#));
        assert!(ssml.contains(r#"xml:lang="en-US""#));
        assert!(!ssml.contains("express-as"));
    }

    #[test]
    fn test_ssml_applies_style_for_emotion() {
        let ssml = AzureTts::ssml(&request("Wow", Emotion::Excited));
        assert!(ssml.contains(r#"<mstts:express-as style="excited">Wow</mstts:express-as>"#));
    }

    #[test]
    fn test_ssml_uses_language_hint() {
        let mut req = request("Hola", Emotion::Neutral);
        req.language = Some("es-ES".to_string());
        assert!(AzureTts::ssml(&req).contains(r#"xml:lang="es-ES""#));
    }

    #[test]
    fn test_builder_derives_base_url_from_region() {
        let tts = SpeechBuilder::<AzureTts>::new()
            .api_key("key")
            .region("westeurope")
            .build()
            .unwrap();
        assert!(tts.is_configured());
        assert_eq!(
            tts.base_url(),
            "https://westeurope.tts.speech.microsoft.com/"
        );
    }
}
