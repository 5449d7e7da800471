//! Audio decoding to mono floating-point samples
//!
//! Wraps symphonia's probe and codec registry. Supports WAV, MP3, FLAC,
//! OGG/Vorbis and AAC/M4A inputs.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::DecodeError;
use crate::types::{DEFAULT_MAX_AUDIO_DURATION_SECS, DecodedWaveform, MIN_SOURCE_SAMPLE_RATE};

/// Decoder from encoded audio bytes to a mono waveform at the source rate
#[derive(Debug, Clone, Copy)]
pub struct WaveformDecoder {
    max_duration_secs: u64,
}

impl Default for WaveformDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformDecoder {
    /// Create a decoder with the default duration ceiling
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_duration_secs: DEFAULT_MAX_AUDIO_DURATION_SECS,
        }
    }

    /// Reject streams longer than `secs` seconds
    #[must_use]
    pub const fn with_max_duration_secs(mut self, secs: u64) -> Self {
        self.max_duration_secs = secs;
        self
    }

    /// Longest stream accepted, in seconds
    #[must_use]
    pub const fn max_duration_secs(&self) -> u64 {
        self.max_duration_secs
    }

    /// Decode `data` into mono samples at the stream's native sample rate
    ///
    /// `extension` is used as a probe hint only; content sniffing decides.
    pub fn decode(
        &self,
        data: Vec<u8>,
        extension: Option<&str>,
    ) -> Result<DecodedWaveform, DecodeError> {
        self.decode_until_cancelled(data, extension, &CancellationToken::new())
    }

    /// Like [`decode`](Self::decode), but stops between packets once `cancel`
    /// fires
    ///
    /// # Errors
    ///
    /// - `Unreadable` if the container, codec or sample rate is unusable
    /// - `TooLong` once the stream passes the duration ceiling
    /// - `Cancelled` if `cancel` fired before decoding finished
    /// - `NoAudio` if nothing was decoded
    #[instrument(skip(self, data, cancel), fields(size = data.len(), extension = ?extension))]
    pub fn decode_until_cancelled(
        &self,
        data: Vec<u8>,
        extension: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<DecodedWaveform, DecodeError> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecodeError::Unreadable(format!("probe: {e}")))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecodeError::Unreadable("no audio track found".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();
        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| DecodeError::Unreadable("unknown sample rate".to_string()))?;
        if sample_rate < MIN_SOURCE_SAMPLE_RATE {
            return Err(DecodeError::Unreadable(format!(
                "sample rate {sample_rate} Hz is below {MIN_SOURCE_SAMPLE_RATE} Hz"
            )));
        }
        let channels = codec_params.channels.map_or(1, |c| c.count());

        let max_frames = self.max_duration_secs.saturating_mul(u64::from(sample_rate));
        if codec_params.n_frames.is_some_and(|n| n > max_frames) {
            return Err(self.too_long());
        }
        let max_samples = usize::try_from(max_frames).unwrap_or(usize::MAX);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::Unreadable(format!("codec: {e}")))?;

        let mut samples: Vec<f32> = Vec::new();

        loop {
            if cancel.is_cancelled() {
                debug!(decoded = samples.len(), "Decoding abandoned");
                return Err(DecodeError::Cancelled);
            }

            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                },
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(DecodeError::Unreadable(format!("packet: {e}"))),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!(error = %e, "Skipping corrupt audio frame");
                    continue;
                },
                Err(e) => return Err(DecodeError::Unreadable(format!("decode: {e}"))),
            };

            let spec = *decoded.spec();
            let frames = decoded.frames();
            if frames == 0 {
                continue;
            }

            let mut buffer = SampleBuffer::<f32>::new(frames as u64, spec);
            buffer.copy_interleaved_ref(decoded);
            let interleaved = buffer.samples();

            let frame_channels = spec.channels.count();
            if frame_channels > 1 {
                #[allow(clippy::cast_precision_loss)]
                let divisor = frame_channels as f32;
                samples.extend(
                    interleaved
                        .chunks(frame_channels)
                        .map(|frame| frame.iter().sum::<f32>() / divisor),
                );
            } else {
                samples.extend_from_slice(interleaved);
            }

            if samples.len() > max_samples {
                return Err(self.too_long());
            }
        }

        if samples.is_empty() {
            return Err(DecodeError::NoAudio);
        }

        debug!(
            samples = samples.len(),
            sample_rate,
            channels,
            "Audio decoded to mono"
        );

        Ok(DecodedWaveform::new(samples, sample_rate))
    }

    const fn too_long(&self) -> DecodeError {
        DecodeError::TooLong {
            max_secs: self.max_duration_secs,
        }
    }
}
