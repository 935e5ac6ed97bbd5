//! Timestamped transcript derived from the ordered segments.

use crate::config::SpeakerNames;
use crate::segment::AudioSegment;
use dialogcast_speech::Speaker;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub speaker_name: String,
    pub text: String,
    /// Seconds from the start of the assembled audio
    pub start_time: f64,
    pub end_time: f64,
}

/// Lays segments end to end starting at zero.
pub fn build_transcript(segments: &[AudioSegment], names: &SpeakerNames) -> Vec<TranscriptEntry> {
    segments
        .iter()
        .scan(0.0_f64, |offset, segment| {
            let start_time = *offset;
            let end_time = start_time + segment.duration_seconds;
            *offset = end_time;
            Some(TranscriptEntry {
                speaker: segment.speaker,
                speaker_name: names.name(segment.speaker).to_string(),
                text: segment.text.clone(),
                start_time,
                end_time,
            })
        })
        .collect()
}

/// `[mm:ss] Name: text`, one line per entry.
pub fn render_text(entries: &[TranscriptEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let total = (entry.start_time.max(0.0) * 1000.0).round() as u64 / 1000;
            format!(
                "[{:02}:{:02}] {}: {}\n",
                total / 60,
                total % 60,
                entry.speaker_name,
                entry.text
            )
        })
        .collect()
}

pub fn render_srt(entries: &[TranscriptEntry]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "{}\n{} --> {}\n{}: {}\n\n",
                index + 1,
                srt_timestamp(entry.start_time),
                srt_timestamp(entry.end_time),
                entry.speaker_name,
                entry.text
            )
        })
        .collect()
}

fn srt_timestamp(seconds: f64) -> String {
    let millis = (seconds.max(0.0) * 1000.0).round() as u64;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        millis / 3_600_000,
        millis / 60_000 % 60,
        millis / 1000 % 60,
        millis % 1000
    )
}
