use crate::types::ProviderKind;
use thiserror::Error;

/// Errors raised by a single speech provider adapter.
#[derive(Error, Debug)]
pub enum SpeechError {
    /// The adapter has no credential, so it was never called.
    #[error(
        "Provider {provider} is not configured\nMissing credential: {credential}\nSuggestion: Export {credential} to enable this provider"
    )]
    ConfigurationMissing {
        provider: ProviderKind,
        credential: &'static str,
    },

    /// The backend call failed (network, HTTP status, timeout or unusable payload).
    #[error("Provider {provider} request failed{}: {reason}", status_suffix(.status))]
    ProviderRequestFailed {
        provider: ProviderKind,
        status: Option<u16>,
        reason: String,
    },

    /// The adapter itself was built with invalid settings.
    #[error("Invalid configuration for {provider}: {reason}")]
    InvalidConfiguration {
        provider: ProviderKind,
        reason: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" with HTTP {code}"))
        .unwrap_or_default()
}

impl SpeechError {
    pub fn request_failed(provider: ProviderKind, reason: impl Into<String>) -> Self {
        Self::ProviderRequestFailed {
            provider,
            status: None,
            reason: reason.into(),
        }
    }

    pub fn http_status(provider: ProviderKind, status: u16, body: impl Into<String>) -> Self {
        Self::ProviderRequestFailed {
            provider,
            status: Some(status),
            reason: body.into(),
        }
    }

    pub fn from_reqwest(provider: ProviderKind, err: reqwest::Error) -> Self {
        Self::ProviderRequestFailed {
            provider,
            status: err.status().map(|s| s.as_u16()),
            reason: err.to_string(),
        }
    }

    /// Provider the error originated from.
    pub fn provider(&self) -> ProviderKind {
        match self {
            SpeechError::ConfigurationMissing { provider, .. }
            | SpeechError::ProviderRequestFailed { provider, .. }
            | SpeechError::InvalidConfiguration { provider, .. } => *provider,
        }
    }
}

/// Result type for speech provider operations
pub type SpeechResult<T> = Result<T, SpeechError>;
