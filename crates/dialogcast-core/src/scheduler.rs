//! Ordered, batched execution of the per-line cascade.

use crate::cascade::FallbackCascade;
use crate::config::{DEFAULT_BATCH_DELAY_MS, DEFAULT_BATCH_SIZE};
use crate::error::SynthesisError;
use crate::segment::AudioSegment;
use dialogcast_speech::{ScriptLine, SpeakerVoices};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Lines finished so far out of the whole script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Runs the cascade for every line, `batch_size` lines at a time.
///
/// Lines inside a batch run concurrently and may finish in any order; each
/// result lands at its line's index. Batches run one after another with
/// `batch_delay` between them. The first line that exhausts every provider
/// stops the run and the rest of its batch is dropped.
pub struct BatchScheduler {
    cascade: FallbackCascade,
    batch_size: usize,
    batch_delay: Duration,
}

impl BatchScheduler {
    pub fn new(cascade: FallbackCascade) -> Self {
        Self {
            cascade,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
        }
    }

    /// Values below 1 are raised to 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    pub fn cascade(&self) -> &FallbackCascade {
        &self.cascade
    }

    pub async fn run(
        &self,
        lines: &[ScriptLine],
        language: Option<&str>,
        voices: Option<&SpeakerVoices>,
        progress: Option<&ProgressCallback>,
    ) -> Result<Vec<AudioSegment>, SynthesisError> {
        let total = lines.len();
        let batch_count = total.div_ceil(self.batch_size);
        let mut slots: Vec<Option<AudioSegment>> = std::iter::repeat_with(|| None)
            .take(total)
            .collect();
        let mut completed = 0;

        for (batch_index, batch) in lines.chunks(self.batch_size).enumerate() {
            if batch_index > 0 && !self.batch_delay.is_zero() {
                debug!("Waiting {:?} before next batch", self.batch_delay);
                tokio::time::sleep(self.batch_delay).await;
            }

            let offset = batch_index * self.batch_size;
            info!(
                "Synthesizing batch {}/{} (lines {}..{})",
                batch_index + 1,
                batch_count,
                offset,
                offset + batch.len()
            );

            let mut in_flight: FuturesUnordered<_> = batch
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    let index = offset + i;
                    async move {
                        let result = self
                            .cascade
                            .synthesize_line(index, line, language, voices)
                            .await;
                        (index, result)
                    }
                })
                .collect();

            while let Some((index, result)) = in_flight.next().await {
                slots[index] = Some(result?);
                completed += 1;
                if let Some(callback) = progress {
                    callback(Progress { completed, total });
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(line, slot)| slot.ok_or(SynthesisError::MissingSegment { line }))
            .collect()
    }
}
