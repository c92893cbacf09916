//! Image Uploads
//!
//! Validates candidate files, writes them to the object store without
//! overwriting, and hands the public URL to the message composer.

mod error;
mod gatekeeper;
pub mod key;
pub mod validation;

pub use error::UploadError;
pub use gatekeeper::{UploadGatekeeper, UploadPhase, CACHE_CONTROL};
pub use validation::{
    validate, verify_content, UploadCandidate, UploadPolicy, UploadValidationError,
    DEFAULT_ALLOWED_TYPES, MAX_FILE_SIZE,
};
