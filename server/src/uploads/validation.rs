//! File admission policy: MIME type and size.

use thiserror::Error;

const MIB: u64 = 1024 * 1024;

/// Largest accepted upload (5 MiB).
pub const MAX_FILE_SIZE: u64 = 5 * MIB;

/// MIME types accepted by default.
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// A file the user picked, held only for one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub filename: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub bytes: Vec<u8>,
}

impl UploadCandidate {
    #[must_use]
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            byte_size: bytes.len() as u64,
            bytes,
        }
    }
}

/// Reasons a candidate is refused before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadValidationError {
    #[error("No file selected.")]
    NoFile,

    #[error("Invalid file type. Allowed formats: {allowed}")]
    InvalidType { mime_type: String, allowed: String },

    #[error("File too large ({}MB). Maximum size is {}MB.", size_mib(.size), limit_mib(.max))]
    TooLarge { size: u64, max: u64 },

    /// File content does not match the claimed type.
    #[error("Invalid file type. File content does not match {claimed}")]
    ContentMismatch { claimed: String },
}

fn size_mib(size: &u64) -> String {
    format!("{:.2}", *size as f64 / MIB as f64)
}

fn limit_mib(max: &u64) -> String {
    if max % MIB == 0 {
        (max / MIB).to_string()
    } else {
        size_mib(max)
    }
}

/// Allowed types and size limit for uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_size: u64,
    pub allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size: MAX_FILE_SIZE,
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

impl UploadPolicy {
    #[must_use]
    pub fn new(max_size: u64, allowed_types: Option<Vec<String>>) -> Self {
        Self {
            max_size,
            allowed_types: allowed_types.unwrap_or_else(|| Self::default().allowed_types),
        }
    }

    #[must_use]
    pub fn allows_type(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }

    /// Subtype names (`jpeg, png, ...`) for error messages.
    #[must_use]
    pub fn allowed_formats(&self) -> String {
        self.allowed_types
            .iter()
            .map(|t| t.split_once('/').map_or(t.as_str(), |(_, sub)| sub))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Check type, then size.
    pub fn validate(&self, candidate: &UploadCandidate) -> Result<(), UploadValidationError> {
        if candidate.byte_size == 0 {
            return Err(UploadValidationError::NoFile);
        }

        if !self.allows_type(&candidate.mime_type) {
            return Err(UploadValidationError::InvalidType {
                mime_type: candidate.mime_type.clone(),
                allowed: self.allowed_formats(),
            });
        }

        if candidate.byte_size > self.max_size {
            return Err(UploadValidationError::TooLarge {
                size: candidate.byte_size,
                max: self.max_size,
            });
        }

        Ok(())
    }
}

/// Validate against the default policy.
pub fn validate(candidate: &UploadCandidate) -> Result<(), UploadValidationError> {
    UploadPolicy::default().validate(candidate)
}

/// Verify the file's magic bytes agree with its claimed image type.
///
/// `image/jpg` is treated as `image/jpeg`.
pub fn verify_content(bytes: &[u8], claimed: &str) -> Result<(), UploadValidationError> {
    let normalized = if claimed == "image/jpg" {
        "image/jpeg"
    } else {
        claimed
    };

    match infer::get(bytes) {
        Some(kind) if kind.mime_type() == normalized => Ok(()),
        detected => {
            tracing::warn!(
                claimed_mime = %claimed,
                detected_mime = ?detected.map(|k| k.mime_type()),
                "File content type mismatch"
            );
            Err(UploadValidationError::ContentMismatch {
                claimed: claimed.to_string(),
            })
        }
    }
}
