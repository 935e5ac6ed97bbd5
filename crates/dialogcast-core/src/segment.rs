use dialogcast_speech::{ProviderKind, ScriptLine, Speaker};
use serde::{Deserialize, Serialize};

/// Speaking rate used for duration estimates.
pub const WORDS_PER_MINUTE: f64 = 150.0;

/// Estimated spoken duration of `text` in seconds.
pub fn estimate_duration(text: &str) -> f64 {
    let words = text.split_whitespace().count() as f64;
    words / WORDS_PER_MINUTE * 60.0
}

/// Synthesized audio for exactly one script line.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub speaker: Speaker,
    pub text: String,
    pub audio: Vec<u8>,
    /// Estimated from the word count, not measured from the audio
    pub duration_seconds: f64,
    /// Backend that produced `audio`
    pub provider: ProviderKind,
}

impl AudioSegment {
    pub fn new(line: &ScriptLine, audio: Vec<u8>, provider: ProviderKind) -> Self {
        Self {
            speaker: line.speaker,
            text: line.text.clone(),
            audio,
            duration_seconds: estimate_duration(&line.text),
            provider,
        }
    }
}

/// Segment metadata reported alongside the assembled audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub index: usize,
    pub speaker: Speaker,
    pub text: String,
    pub duration_seconds: f64,
    pub provider: ProviderKind,
    pub bytes: usize,
}

impl SegmentInfo {
    pub fn from_segment(index: usize, segment: &AudioSegment) -> Self {
        Self {
            index,
            speaker: segment.speaker,
            text: segment.text.clone(),
            duration_seconds: segment.duration_seconds,
            provider: segment.provider,
            bytes: segment.audio.len(),
        }
    }
}
