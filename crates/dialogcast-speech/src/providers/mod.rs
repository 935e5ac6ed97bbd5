//! HTTP adapters for the supported speech synthesis backends.
//!
//! Each adapter owns its authentication scheme and request/response shape and
//! exposes the uniform [`SpeechProvider`](crate::SpeechProvider) capability.

pub mod azure;
pub mod elevenlabs;
pub mod google;
pub mod openai;

pub use azure::AzureTts;
pub use elevenlabs::ElevenLabsTts;
pub use google::GoogleCloudTts;
pub use openai::OpenAiTts;

use crate::{
    ProviderKind, SpeakerVoices, SpeechBuilder, SpeechError, SpeechProvider, SpeechResult,
};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

pub(crate) fn http_client(
    provider: ProviderKind,
    timeout_seconds: Option<u64>,
) -> SpeechResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(
            timeout_seconds.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        ))
        .build()
        .map_err(|e| SpeechError::InvalidConfiguration {
            provider,
            reason: format!("failed to build HTTP client: {e}"),
        })
}

/// Returns the credential or `ConfigurationMissing`.
pub(crate) fn require_key(provider: ProviderKind, key: &Option<String>) -> SpeechResult<&str> {
    key.as_deref().ok_or(SpeechError::ConfigurationMissing {
        provider,
        credential: provider.credential_env(),
    })
}

/// Joins a base URL and a relative path with exactly one slash between them.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Checks the status and reads a raw audio body.
pub(crate) async fn read_audio_body(
    provider: ProviderKind,
    response: reqwest::Response,
) -> SpeechResult<Vec<u8>> {
    let response = ensure_success(provider, response).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| SpeechError::from_reqwest(provider, e))?;
    if bytes.is_empty() {
        return Err(SpeechError::request_failed(
            provider,
            "response contained no audio",
        ));
    }
    Ok(bytes.to_vec())
}

/// Maps a non-2xx response to `ProviderRequestFailed` carrying the body text.
pub(crate) async fn ensure_success(
    provider: ProviderKind,
    response: reqwest::Response,
) -> SpeechResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SpeechError::http_status(provider, status.as_u16(), body))
}

pub(crate) fn env_key(provider: ProviderKind) -> Option<String> {
    std::env::var(provider.credential_env())
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Builds one provider from its environment credential.
///
/// Missing credentials do not fail here: the provider is returned unconfigured
/// and the cascade skips it.
pub fn provider_from_env(
    kind: ProviderKind,
    timeout_seconds: Option<u64>,
    voices: Option<SpeakerVoices>,
) -> SpeechResult<Arc<dyn SpeechProvider>> {
    let timeout = timeout_seconds.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
    let provider: Arc<dyn SpeechProvider> = match kind {
        ProviderKind::GoogleCloud => {
            with_overrides(GoogleCloudTts::env_builder(), timeout, voices).build()?
        }
        ProviderKind::Azure => with_overrides(AzureTts::env_builder(), timeout, voices).build()?,
        ProviderKind::ElevenLabs => {
            with_overrides(ElevenLabsTts::env_builder(), timeout, voices).build()?
        }
        ProviderKind::OpenAI => with_overrides(OpenAiTts::env_builder(), timeout, voices).build()?,
    };
    Ok(provider)
}

fn with_overrides<P: SpeechProvider>(
    builder: SpeechBuilder<P>,
    timeout: u64,
    voices: Option<SpeakerVoices>,
) -> SpeechBuilder<P> {
    let builder = builder.timeout_seconds(timeout);
    match voices {
        Some(voices) => builder.voices(voices),
        None => builder,
    }
}
