//! # DialogCast Speech
//!
//! Speech synthesis provider abstractions for DialogCast.
//!
//! Every backend is wrapped behind the [`SpeechProvider`] trait exposing one
//! capability: turn a line of text, a voice and a language hint into MP3
//! bytes. Callers hold providers as `Arc<dyn SpeechProvider>` and can order
//! them freely, which is how the fallback cascade is assembled.
//!
//! ## Providers
//!
//! | tier | provider | credential |
//! |---|---|---|
//! | cheapest bulk | [`GoogleCloudTts`] | `GOOGLE_TTS_API_KEY` |
//! | mid cost | [`AzureTts`] | `AZURE_SPEECH_KEY` (+ `AZURE_SPEECH_REGION`) |
//! | highest fidelity | [`ElevenLabsTts`] | `ELEVENLABS_API_KEY` |
//! | universal fallback | [`OpenAiTts`] | `OPENAI_API_KEY` |
//!
//! A provider without its credential still exists but reports
//! `is_configured() == false` and answers `ConfigurationMissing`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dialogcast_speech::{
//!     GoogleCloudTts, Speaker, SpeechBuilder, SpeechProvider, SynthesisRequest,
//! };
//!
//! async fn hello() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
//!     let tts = SpeechBuilder::<GoogleCloudTts>::new()
//!         .api_key("my-key")
//!         .build()?;
//!     let request = SynthesisRequest {
//!         text: "Hello and welcome.".to_string(),
//!         voice: tts.voice_for(Speaker::A),
//!         language: Some("en-US".to_string()),
//!         emotion: Default::default(),
//!     };
//!     Ok(tts.synthesize(&request).await?)
//! }
//! ```

pub mod builder;
pub mod error;
mod provider;
pub mod providers;
pub mod types;
pub mod validation;

pub use builder::SpeechBuilder;
pub use error::{SpeechError, SpeechResult};
pub use provider::SpeechProvider;
pub use providers::{
    AzureTts, ElevenLabsTts, GoogleCloudTts, OpenAiTts, provider_from_env,
};
pub use types::{
    Emotion, ProviderKind, ScriptLine, Speaker, SpeakerVoices, SynthesisRequest, VoiceIdentifier,
};
pub use validation::{AudioContainer, is_valid_mp3, sniff};
