use crate::{ProviderKind, Speaker, SpeechResult, SynthesisRequest, VoiceIdentifier};
use async_trait::async_trait;

/// Uniform capability every speech synthesis backend exposes.
///
/// Implementations wrap exactly one external service. The cascade only relies
/// on this trait, so any ordered list of providers can be injected.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Backend identifier recorded on every segment this provider produces.
    fn kind(&self) -> ProviderKind;

    /// Whether the credential needed to call the backend is present.
    fn is_configured(&self) -> bool;

    /// Voice this backend uses for the given speaker.
    fn voice_for(&self, speaker: Speaker) -> VoiceIdentifier;

    /// Synthesize one utterance into compressed audio bytes (MP3).
    ///
    /// Returns `ConfigurationMissing` without touching the network when the
    /// credential is absent, and `ProviderRequestFailed` on any call failure.
    async fn synthesize(&self, request: &SynthesisRequest) -> SpeechResult<Vec<u8>>;
}
