//! Builder module for configuring and instantiating speech providers.
//!
//! Mirrors a fluent builder per backend: every provider implements its own
//! `build()` on `SpeechBuilder<Provider>`.

use crate::{SpeakerVoices, SpeechProvider};
use std::marker::PhantomData;

/// Builder for configuring and instantiating speech providers.
///
/// A builder without an API key still builds; the resulting provider reports
/// `is_configured() == false` and is skipped by the cascade.
pub struct SpeechBuilder<P: SpeechProvider> {
    pub(crate) provider: PhantomData<P>,
    /// Credential used to authenticate with the backend
    pub(crate) api_key: Option<String>,
    /// Base URL override (self-hosted gateways, tests)
    pub(crate) base_url: Option<String>,
    /// Model identifier, for backends that expose several
    pub(crate) model: Option<String>,
    /// Request timeout duration in seconds
    pub(crate) timeout_seconds: Option<u64>,
    /// Voice pair overriding the backend defaults
    pub(crate) voices: Option<SpeakerVoices>,
    /// Service region (Azure)
    pub(crate) region: Option<String>,
}

impl<P: SpeechProvider> Default for SpeechBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SpeechProvider> SpeechBuilder<P> {
    pub fn new() -> Self {
        Self {
            provider: PhantomData,
            api_key: None,
            base_url: None,
            model: None,
            timeout_seconds: None,
            voices: None,
            region: None,
        }
    }

    /// Sets the API key; blank keys are treated as missing.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    /// Sets the API key only when one is provided.
    pub fn api_key_opt(mut self, key: Option<String>) -> Self {
        if let Some(key) = key {
            self = self.api_key(key);
        }
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    pub fn voices(mut self, voices: SpeakerVoices) -> Self {
        self.voices = Some(voices);
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}
