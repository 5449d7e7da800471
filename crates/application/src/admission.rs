//! Admission checks for uploaded audio

use tracing::debug;

use crate::error::AdmissionError;

/// Default upload ceiling: 50 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Validates an audio payload's size before it reaches the engine
#[derive(Debug, Clone, Copy)]
pub struct AudioAdmissionGuard {
    max_bytes: u64,
}

impl Default for AudioAdmissionGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

impl AudioAdmissionGuard {
    /// Create a guard with the given ceiling in bytes
    #[must_use]
    pub const fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Configured ceiling in bytes
    #[must_use]
    pub const fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Whether `len` bytes already exceed the ceiling
    #[must_use]
    pub const fn exceeds(&self, len: u64) -> bool {
        len > self.max_bytes
    }

    /// Admit or reject `payload`
    ///
    /// The size ceiling and emptiness are checked independently; neither
    /// depends on the content.
    pub fn admit(&self, payload: &[u8]) -> Result<(), AdmissionError> {
        let size = payload.len() as u64;

        if self.exceeds(size) {
            debug!(size, max = self.max_bytes, "Rejecting oversized payload");
            return Err(AdmissionError::PayloadTooLarge {
                size,
                max: self.max_bytes,
            });
        }

        if size == 0 {
            return Err(AdmissionError::EmptyPayload);
        }

        Ok(())
    }
}
