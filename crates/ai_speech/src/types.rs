//! Types for speech processing
//!
//! Contains the synthesis output formats and the decoded waveform handed to
//! inference backends.

use std::fmt;
use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Sample rate every inference backend expects
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Lowest source sample rate accepted for decoding
pub const MIN_SOURCE_SAMPLE_RATE: u32 = 4_000;

/// Default ceiling on decoded audio length, in seconds
pub const DEFAULT_MAX_AUDIO_DURATION_SECS: u64 = 1_800;

/// Audio formats the synthesis provider can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// MPEG layer 3
    Mp3,
    /// Vorbis in an OGG container
    OggVorbis,
    /// Raw signed 16-bit little-endian PCM, mono
    Pcm,
}

impl OutputFormat {
    /// All supported formats, in wire order
    pub const ALL: [Self; 3] = [Self::Mp3, Self::OggVorbis, Self::Pcm];

    /// Wire name of the format
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::OggVorbis => "ogg_vorbis",
            Self::Pcm => "pcm",
        }
    }

    /// MIME type of audio in this format
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::OggVorbis => "audio/ogg",
            Self::Pcm => "audio/pcm",
        }
    }

    /// Parse a wire name. Matching is exact and case-sensitive.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.as_str() == value)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mono floating-point samples at a known rate
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWaveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl DecodedWaveform {
    /// Create a waveform from mono samples
    #[must_use]
    pub const fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// The samples, in `[-1.0, 1.0]`
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume and return the samples
    #[must_use]
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the waveform holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in milliseconds
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.samples.len() as u64 * 1000) / u64::from(self.sample_rate)
    }

    /// Encode as a 16-bit PCM mono WAV file
    ///
    /// Backends that take a file (whisper.cpp, the Whisper HTTP API) receive
    /// this encoding.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(44 + self.samples.len() * 2));
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| DecodeError::Inference(format!("WAV header: {e}")))?;
            for sample in &self.samples {
                #[allow(clippy::cast_possible_truncation)]
                let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                writer
                    .write_sample(value)
                    .map_err(|e| DecodeError::Inference(format!("WAV sample: {e}")))?;
            }
            writer
                .finalize()
                .map_err(|e| DecodeError::Inference(format!("WAV finalize: {e}")))?;
        }

        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod output_format {
        use super::*;

        #[test]
        fn wire_names_are_correct() {
            assert_eq!(OutputFormat::Mp3.as_str(), "mp3");
            assert_eq!(OutputFormat::OggVorbis.as_str(), "ogg_vorbis");
            assert_eq!(OutputFormat::Pcm.as_str(), "pcm");
        }

        #[test]
        fn parse_accepts_exact_names() {
            assert_eq!(OutputFormat::parse("mp3"), Some(OutputFormat::Mp3));
            assert_eq!(
                OutputFormat::parse("ogg_vorbis"),
                Some(OutputFormat::OggVorbis)
            );
            assert_eq!(OutputFormat::parse("pcm"), Some(OutputFormat::Pcm));
        }

        #[test]
        fn parse_is_case_sensitive() {
            assert_eq!(OutputFormat::parse("MP3"), None);
            assert_eq!(OutputFormat::parse("Pcm"), None);
            assert_eq!(OutputFormat::parse(" mp3"), None);
        }

        #[test]
        fn parse_rejects_unknown() {
            assert_eq!(OutputFormat::parse("wavz"), None);
            assert_eq!(OutputFormat::parse("ogg"), None);
            assert_eq!(OutputFormat::parse(""), None);
        }

        #[test]
        fn serializes_snake_case() {
            let json = serde_json::to_string(&OutputFormat::OggVorbis).unwrap();
            assert_eq!(json, "\"ogg_vorbis\"");
        }

        #[test]
        fn display_matches_wire_name() {
            assert_eq!(OutputFormat::Pcm.to_string(), "pcm");
        }

        #[test]
        fn mime_types_are_correct() {
            assert_eq!(OutputFormat::Mp3.mime_type(), "audio/mpeg");
            assert_eq!(OutputFormat::OggVorbis.mime_type(), "audio/ogg");
            assert_eq!(OutputFormat::Pcm.mime_type(), "audio/pcm");
        }
    }

    mod waveform {
        use super::*;

        #[test]
        fn duration_is_derived_from_rate() {
            let waveform = DecodedWaveform::new(vec![0.0; 8000], TARGET_SAMPLE_RATE);
            assert_eq!(waveform.duration_ms(), 500);
            assert_eq!(waveform.len(), 8000);
        }

        #[test]
        fn zero_rate_has_zero_duration() {
            let waveform = DecodedWaveform::new(vec![0.0; 10], 0);
            assert_eq!(waveform.duration_ms(), 0);
        }

        #[test]
        fn wav_encoding_round_trips_through_hound() {
            let waveform = DecodedWaveform::new(vec![0.0, 0.5, -0.5, 1.0], TARGET_SAMPLE_RATE);
            let bytes = waveform.to_wav_bytes().unwrap();

            let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
            let spec = reader.spec();
            assert_eq!(spec.channels, 1);
            assert_eq!(spec.sample_rate, TARGET_SAMPLE_RATE);
            assert_eq!(spec.bits_per_sample, 16);
            assert_eq!(reader.len(), 4);
        }

        #[test]
        fn wav_encoding_clamps_out_of_range_samples() {
            let waveform = DecodedWaveform::new(vec![2.0, -2.0], TARGET_SAMPLE_RATE);
            let bytes = waveform.to_wav_bytes().unwrap();

            let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
            let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
            assert_eq!(samples, vec![i16::MAX, -i16::MAX]);
        }
    }
}
