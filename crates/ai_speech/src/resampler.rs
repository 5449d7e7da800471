//! Linear sample-rate conversion to the engine's fixed input rate

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::debug;

use crate::error::DecodeError;
use crate::types::{DecodedWaveform, MIN_SOURCE_SAMPLE_RATE, TARGET_SAMPLE_RATE};

/// Frames fed to the resampler per call
const CHUNK_SIZE: usize = 1024;

/// Upper bound on zero-padded calls used to drain the resampler delay
const MAX_FLUSH_ROUNDS: usize = 8;

/// Resamples mono waveforms using linear interpolation
#[derive(Debug, Clone, Copy)]
pub struct LinearResampler {
    target_rate: u32,
}

impl Default for LinearResampler {
    fn default() -> Self {
        Self::new(TARGET_SAMPLE_RATE)
    }
}

impl LinearResampler {
    /// Create a resampler producing `target_rate` Hz
    #[must_use]
    pub const fn new(target_rate: u32) -> Self {
        Self { target_rate }
    }

    /// Output sample rate
    #[must_use]
    pub const fn target_rate(&self) -> u32 {
        self.target_rate
    }

    /// Convert `waveform` to the target rate
    ///
    /// Waveforms already at the target rate are returned unchanged. Source
    /// rates below [`MIN_SOURCE_SAMPLE_RATE`] are rejected.
    pub fn resample(&self, waveform: DecodedWaveform) -> Result<DecodedWaveform, DecodeError> {
        let source_rate = waveform.sample_rate();
        if source_rate == self.target_rate {
            return Ok(waveform);
        }
        if source_rate < MIN_SOURCE_SAMPLE_RATE || self.target_rate == 0 {
            return Err(DecodeError::Resample(format!(
                "invalid rates {source_rate} -> {}",
                self.target_rate
            )));
        }

        let ratio = f64::from(self.target_rate) / f64::from(source_rate);
        let samples = waveform.into_samples();

        let mut resampler =
            FastFixedIn::<f32>::new(ratio, 1.0, PolynomialDegree::Linear, CHUNK_SIZE, 1)
                .map_err(|e| DecodeError::Resample(format!("init: {e}")))?;

        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let expected = (samples.len() as f64 * ratio).round() as usize;
        let delay = resampler.output_delay();
        let mut output = Vec::with_capacity(expected + delay + CHUNK_SIZE);

        let mut chunks = samples.chunks(CHUNK_SIZE);
        let mut flush_rounds = 0;
        loop {
            let input = match chunks.next() {
                Some(chunk) => {
                    let mut padded = chunk.to_vec();
                    padded.resize(CHUNK_SIZE, 0.0);
                    padded
                },
                None if output.len() < expected + delay && flush_rounds < MAX_FLUSH_ROUNDS => {
                    flush_rounds += 1;
                    vec![0.0; CHUNK_SIZE]
                },
                None => break,
            };

            let resampled = resampler
                .process(&[input], None)
                .map_err(|e| DecodeError::Resample(format!("process: {e}")))?;

            if let Some(channel) = resampled.first() {
                output.extend_from_slice(channel);
            }
        }

        output.drain(..delay.min(output.len()));
        output.truncate(expected);

        debug!(
            from = source_rate,
            to = self.target_rate,
            samples = output.len(),
            "Resampled waveform"
        );

        Ok(DecodedWaveform::new(output, self.target_rate))
    }
}
