//! Image upload simulation
//!
//! Stands in for a real upload: a timed sequence of progress events that ends
//! in success or failure, behind a handle the caller can cancel at any time.

mod simulator;

pub use simulator::{SimulatorConfig, UploadHandle, UploadSimulator};

use crate::types::SelectedFile;
use rand::Rng;
use thiserror::Error;

/// Why an image was not accepted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The chosen file is not an image
    #[error("File must be an image (got {mime_type})")]
    InvalidFileType {
        /// MIME type of the rejected file
        mime_type: String,
    },

    /// The upload started but did not complete
    #[error("Failed to upload image at {progress}%")]
    Failed {
        /// Progress reached before the failure
        progress: u8,
    },
}

/// Event emitted by a running upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// New progress value (0-100)
    Progress(u8),
    /// Upload settled; emitted at most once per attempt
    Finished(Result<SelectedFile, UploadError>),
}

/// When the simulated upload should fail
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailurePolicy {
    /// Always succeed
    Never,
    /// Fail deterministically once this progress value is reached
    At(u8),
    /// Fail with the given probability when this progress value is reached
    Chance {
        /// Progress value at which the roll happens
        at: u8,
        /// Probability of failing, clamped to 0.0-1.0; NaN counts as 0.0
        probability: f64,
    },
}

impl FailurePolicy {
    /// Decide whether the upload fails at `progress`
    pub fn should_fail(&self, progress: u8) -> bool {
        match *self {
            Self::Never => false,
            Self::At(at) => progress == at,
            Self::Chance { at, probability } => {
                let probability = if probability.is_nan() {
                    0.0
                } else {
                    probability.clamp(0.0, 1.0)
                };
                progress == at && rand::thread_rng().gen_bool(probability)
            }
        }
    }
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::Chance {
            at: 60,
            probability: 0.2,
        }
    }
}

/// Reject files that are not images before any work starts
pub fn check_file_type(file: &SelectedFile) -> Result<(), UploadError> {
    if file.is_image() {
        Ok(())
    } else {
        Err(UploadError::InvalidFileType {
            mime_type: file.mime_type().to_string(),
        })
    }
}
