//! Transcription service - upload admission and engine invocation
//!
//! Flow per request:
//! 1. Read the upload stream into memory, stopping early past the ceiling
//! 2. Admit the payload (emptiness, size)
//! 3. Persist it to a scoped temporary file with a random name
//! 4. Run the shared engine over the file, bounded by a timeout
//!
//! The temporary file is removed when its guard drops, on every exit path.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fmt, pin::pin};

use ai_speech::EngineHandle;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::admission::{AudioAdmissionGuard, DEFAULT_MAX_UPLOAD_BYTES};
use crate::error::{TranscriptionError, UploadError};
use crate::types::Transcript;

/// Prefix of scoped upload files
const TEMP_PREFIX: &str = "echo-upload-";

/// Longest extension kept from the client filename
const MAX_EXTENSION_LEN: usize = 8;

/// Settings for the transcription flow
#[derive(Debug, Clone)]
pub struct TranscriptionSettings {
    /// Upload ceiling in bytes
    pub max_upload_bytes: u64,
    /// Bound on a single engine call
    pub timeout: Duration,
    /// Directory for scoped upload files; system temp dir when `None`
    pub temp_dir: Option<PathBuf>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            timeout: Duration::from_secs(120),
            temp_dir: None,
        }
    }
}

/// Orchestrates admission, scoped storage and transcription
pub struct TranscriptionService {
    engine: EngineHandle,
    guard: AudioAdmissionGuard,
    settings: TranscriptionSettings,
}

impl fmt::Debug for TranscriptionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptionService")
            .field("model", &self.engine.model_name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TranscriptionService {
    /// Create a service with default settings
    pub fn new(engine: EngineHandle) -> Self {
        Self::with_settings(engine, TranscriptionSettings::default())
    }

    /// Create a service with custom settings
    pub fn with_settings(
        engine: EngineHandle,
        settings: TranscriptionSettings,
    ) -> Self {
        Self {
            engine,
            guard: AudioAdmissionGuard::new(settings.max_upload_bytes),
            settings,
        }
    }

    /// Upload ceiling in bytes
    #[must_use]
    pub const fn max_upload_bytes(&self) -> u64 {
        self.guard.max_bytes()
    }

    /// Transcribe one uploaded file
    ///
    /// `file_name` only contributes a sanitized extension hint to the
    /// temporary file; its identity is random.
    #[instrument(skip(self, stream), fields(model = %self.engine.model_name()))]
    pub async fn handle_transcription_request<S>(
        &self,
        file_name: &str,
        stream: S,
    ) -> Result<Transcript, TranscriptionError>
    where
        S: Stream<Item = Result<Bytes, UploadError>> + Send,
    {
        let payload = self.read_payload(stream).await?;

        self.guard.admit(&payload)?;

        debug!(size = payload.len(), "Upload admitted");

        let scoped = self.persist(file_name, &payload).await?;
        drop(payload);

        let outcome =
            tokio::time::timeout(self.settings.timeout, self.engine.transcribe(scoped.path()))
                .await;

        let text = match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, "Engine could not transcribe upload");
                return Err(TranscriptionError::UnreadableAudio);
            },
            Err(_) => {
                warn!(
                    timeout_ms = self.settings.timeout.as_millis(),
                    "Transcription timed out"
                );
                return Err(TranscriptionError::UnreadableAudio);
            },
        };

        info!(text_len = text.len(), "Transcription request complete");

        Ok(Transcript::new(text))
    }

    /// Read the whole stream, stopping once the ceiling is exceeded
    async fn read_payload<S>(&self, stream: S) -> Result<BytesMut, TranscriptionError>
    where
        S: Stream<Item = Result<Bytes, UploadError>> + Send,
    {
        let mut stream = pin!(stream);
        let mut payload = BytesMut::new();

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    payload.extend_from_slice(&bytes);
                    if self.guard.exceeds(payload.len() as u64) {
                        debug!(
                            read = payload.len(),
                            max = self.guard.max_bytes(),
                            "Upload exceeded ceiling, stopped reading"
                        );
                        return Err(TranscriptionError::PayloadTooLarge);
                    }
                },
                Err(UploadError::TooLarge) => return Err(TranscriptionError::PayloadTooLarge),
                Err(UploadError::Interrupted(reason)) => {
                    warn!(error = %reason, "Upload stream failed");
                    return Err(TranscriptionError::IncompleteUpload(reason));
                },
            }
        }

        Ok(payload)
    }

    /// Write `payload` to a new randomly named file
    async fn persist(
        &self,
        file_name: &str,
        payload: &[u8],
    ) -> Result<NamedTempFile, TranscriptionError> {
        let suffix = extension_suffix(file_name);
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(&suffix).rand_bytes(16);

        let scoped = match self.settings.temp_dir {
            Some(ref dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| TranscriptionError::Storage(format!("create: {e}")))?;

        tokio::fs::write(scoped.path(), payload)
            .await
            .map_err(|e| TranscriptionError::Storage(format!("write: {e}")))?;

        debug!(path = %scoped.path().display(), "Upload persisted");

        Ok(scoped)
    }
}

/// `.ext` from the client filename when it is short and alphanumeric
fn extension_suffix(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}
