use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One of the two participants of a dialogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Speaker {
    #[serde(alias = "a", alias = "host")]
    A,
    #[serde(alias = "b", alias = "guest")]
    B,
}

/// Delivery hint attached to a script line.
///
/// Providers that support expressive synthesis map this to their own style
/// controls; the others ignore it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Excited,
    Curious,
    Thoughtful,
    Amused,
    Skeptical,
    Serious,
    // `serde(other)` is only accepted on the last variant.
    #[default]
    #[serde(other)]
    Neutral,
}

impl Emotion {
    /// Short natural-language description of the delivery style.
    pub fn description(&self) -> &'static str {
        match self {
            Emotion::Neutral => "a calm, conversational",
            Emotion::Excited => "an excited, energetic",
            Emotion::Curious => "a curious, inquisitive",
            Emotion::Thoughtful => "a thoughtful, measured",
            Emotion::Amused => "an amused, lighthearted",
            Emotion::Skeptical => "a skeptical, questioning",
            Emotion::Serious => "a serious, focused",
        }
    }
}

/// A single speaker-attributed utterance of the dialogue script.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptLine {
    pub speaker: Speaker,
    pub text: String,
    #[serde(default)]
    pub emotion: Emotion,
}

impl ScriptLine {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            emotion: Emotion::default(),
        }
    }

    pub fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = emotion;
        self
    }
}

/// Identifies a speech synthesis backend.
///
/// Parsing is case-insensitive and accepts the short aliases used in
/// configuration files (`google`, `azure`, `elevenlabs`, `openai`).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum ProviderKind {
    #[serde(alias = "google")]
    #[strum(to_string = "google_cloud", serialize = "google")]
    GoogleCloud,
    #[strum(to_string = "azure")]
    Azure,
    #[serde(rename = "elevenlabs", alias = "eleven_labs")]
    #[strum(to_string = "elevenlabs", serialize = "eleven_labs")]
    ElevenLabs,
    #[serde(rename = "openai", alias = "open_ai")]
    #[strum(to_string = "openai", serialize = "open_ai")]
    OpenAI,
}

impl ProviderKind {
    /// Cost-ascending cascade order, ending with the most widely available backend.
    pub const DEFAULT_CASCADE: [ProviderKind; 4] = [
        ProviderKind::GoogleCloud,
        ProviderKind::Azure,
        ProviderKind::ElevenLabs,
        ProviderKind::OpenAI,
    ];

    /// Environment variable holding this provider's credential.
    pub fn credential_env(&self) -> &'static str {
        match self {
            ProviderKind::GoogleCloud => "GOOGLE_TTS_API_KEY",
            ProviderKind::Azure => "AZURE_SPEECH_KEY",
            ProviderKind::ElevenLabs => "ELEVENLABS_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
        }
    }
}

/// Provider-specific voice identifier.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoiceIdentifier {
    pub name: String,
}

impl VoiceIdentifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<String> for VoiceIdentifier {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for VoiceIdentifier {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Voice pair for the two speakers.
///
/// When `provider` is set the pair only applies to that backend, otherwise it
/// overrides the voices of every backend in the cascade.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeakerVoices {
    pub a: String,
    pub b: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
}

impl SpeakerVoices {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            provider: None,
        }
    }

    pub fn for_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn applies_to(&self, provider: ProviderKind) -> bool {
        self.provider.is_none_or(|p| p == provider)
    }

    pub fn voice(&self, speaker: Speaker) -> VoiceIdentifier {
        match speaker {
            Speaker::A => VoiceIdentifier::new(&self.a),
            Speaker::B => VoiceIdentifier::new(&self.b),
        }
    }
}

/// Speech synthesis request for a single utterance.
#[derive(Clone, Debug)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: VoiceIdentifier,
    /// BCP-47 language hint, passed through to the backend untouched.
    pub language: Option<String>,
    pub emotion: Emotion,
}
