use crate::assembler::Transcoder;
use crate::error::AssemblyError;
use async_trait::async_trait;
use dialogcast_speech::{
    ProviderKind, Speaker, SpeechError, SpeechProvider, SpeechResult, SynthesisRequest,
    VoiceIdentifier,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const FAKE_MP3: &[u8] = &[b'I', b'D', b'3', 0x04, 0x00, 0x00, 0xFF, 0xFB];

/// Provider double with configurable failure, latency and payload.
///
/// Clones share their counters, so a test can keep one handle and hand
/// `arc()` to the cascade.
#[derive(Clone)]
pub(crate) struct MockSpeechProvider {
    kind: ProviderKind,
    configured: bool,
    should_fail: bool,
    fail_on: Option<String>,
    delay_ms: u64,
    random_delay_ms: u64,
    payload: Vec<u8>,
    call_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    last_voice: Arc<Mutex<Option<String>>>,
}

impl MockSpeechProvider {
    pub(crate) fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            configured: true,
            should_fail: false,
            fail_on: None,
            delay_ms: 0,
            random_delay_ms: 0,
            payload: FAKE_MP3.to_vec(),
            call_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            last_voice: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn failing(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Fails only for lines containing `needle`.
    pub(crate) fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub(crate) fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub(crate) fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Each call sleeps a random duration below `max_ms`.
    pub(crate) fn with_random_delay_ms(mut self, max_ms: u64) -> Self {
        self.random_delay_ms = max_ms;
        self
    }

    pub(crate) fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub(crate) fn arc(&self) -> Arc<dyn SpeechProvider> {
        Arc::new(self.clone())
    }

    pub(crate) fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn last_voice(&self) -> Option<String> {
        self.last_voice.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn voice_for(&self, speaker: Speaker) -> VoiceIdentifier {
        let suffix = match speaker {
            Speaker::A => "a",
            Speaker::B => "b",
        };
        VoiceIdentifier::new(format!("mock-{}-{suffix}", self.kind))
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> SpeechResult<Vec<u8>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_voice.lock().unwrap() = Some(request.voice.name().to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let mut delay = self.delay_ms;
        if self.random_delay_ms > 0 {
            delay += rand::random::<u64>() % self.random_delay_ms;
        }
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let matched = self
            .fail_on
            .as_deref()
            .is_some_and(|needle| request.text.contains(needle));
        if self.should_fail || matched {
            return Err(SpeechError::http_status(
                self.kind,
                503,
                "Mock provider failure",
            ));
        }
        // Tag the payload with the text so ordering is observable in the output.
        let mut audio = self.payload.clone();
        audio.extend_from_slice(request.text.as_bytes());
        Ok(audio)
    }
}

/// Transcoder double that joins the listed files behind a marker.
#[derive(Clone, Default)]
pub(crate) struct RecordingTranscoder {
    should_fail: bool,
    call_count: Arc<AtomicUsize>,
    scratch_dirs: Arc<Mutex<Vec<PathBuf>>>,
}

pub(crate) const TRANSCODED_MARKER: &[u8] = b"TRANSCODED";

impl RecordingTranscoder {
    pub(crate) fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn arc(&self) -> Arc<dyn Transcoder> {
        Arc::new(self.clone())
    }

    pub(crate) fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub(crate) fn scratch_dirs(&self) -> Vec<PathBuf> {
        self.scratch_dirs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for RecordingTranscoder {
    async fn concat(&self, list: &Path, output: &Path) -> Result<(), AssemblyError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(dir) = list.parent() {
            self.scratch_dirs.lock().unwrap().push(dir.to_path_buf());
        }
        if self.should_fail {
            return Err(AssemblyError::TranscodeSubprocessFailed {
                status: Some(1),
                reason: "mock transcoder failure".to_string(),
            });
        }

        let manifest = tokio::fs::read_to_string(list).await?;
        let mut joined = TRANSCODED_MARKER.to_vec();
        for entry in manifest.lines() {
            let path = entry
                .strip_prefix("file '")
                .and_then(|rest| rest.strip_suffix('\''))
                .unwrap_or(entry)
                .replace("'\\''", "'");
            joined.extend(tokio::fs::read(path).await?);
        }
        tokio::fs::write(output, joined).await?;
        Ok(())
    }
}
