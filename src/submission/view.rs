//! What the dialog shows for the current state

use crate::submission::{Phase, SubmissionMachine};
use crate::types::RelatedPost;

/// Dialog headline
pub const HEADLINE: &str = "Upload your post";
/// Label of the submit button
pub const SUBMIT_LABEL: &str = "Confirm";
/// Success panel text
pub const SUCCESS_TEXT: &str = "Your post was successfully uploaded!";
/// Label of the success panel button
pub const DONE_LABEL: &str = "Done";
/// Loader bar text after a failed upload
pub const UPLOAD_FAILED_TEXT: &str = "Failed to upload your file";
/// Loader bar text after a successful upload
pub const UPLOAD_DONE_TEXT: &str = "Upload successful";

/// Loader bar text while an upload runs
pub fn loading_text(percent: u8) -> String {
    format!("Loading image {}%", percent.min(100))
}

/// Title input as shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleView {
    /// Current text
    pub value: String,
    /// Error under the input
    pub error: Option<String>,
    /// Whether the input accepts edits
    pub editable: bool,
}

/// Image area as shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageView {
    /// File picker, with the "image required" error if flagged
    Picker {
        /// Error under the picker
        error: Option<String>,
    },
    /// Loader bar with a cancel affordance
    Uploading {
        /// File being uploaded
        file_name: String,
        /// Progress, 0-100
        percent: u8,
    },
    /// Failure state with a retry affordance
    Failed {
        /// File that was rejected or failed
        file_name: Option<String>,
        /// Why it failed
        reason: String,
    },
    /// Accepted image with a change affordance
    Uploaded {
        /// Accepted file
        file_name: String,
        /// Error set on the image from outside, if any
        error: Option<String>,
    },
}

/// Everything the dialog renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// The form (idle, uploading, failed, uploaded or submitting)
    Form {
        /// Title input
        title: TitleView,
        /// Topic, if set
        topic: Option<String>,
        /// Image area
        image: ImageView,
        /// Whether the submit button can be pressed
        submit_enabled: bool,
        /// Whether the create-post call is in flight
        submitting: bool,
        /// Message of the last failed create-post call
        submit_error: Option<String>,
    },
    /// Success panel
    Submitted {
        /// Server confirmation message
        message: String,
        /// Created post
        post: RelatedPost,
    },
    /// Nothing shown
    Closed,
}

/// Project the machine state onto what should be shown
pub fn render(machine: &SubmissionMachine) -> View {
    let phase = machine.phase();

    if phase == Phase::Closed {
        return View::Closed;
    }
    if let (Phase::Submitted, Some(created)) = (phase, machine.created()) {
        return View::Submitted {
            message: created.message.clone(),
            post: created.post.clone(),
        };
    }

    let file_name = machine.selected_file().map(|f| f.name().to_string());
    let image = match phase {
        Phase::Uploading => ImageView::Uploading {
            file_name: file_name.unwrap_or_default(),
            percent: machine.progress(),
        },
        Phase::UploadFailed => ImageView::Failed {
            file_name,
            reason: machine
                .upload_error()
                .map_or_else(|| UPLOAD_FAILED_TEXT.to_string(), ToString::to_string),
        },
        Phase::Uploaded | Phase::Submitting | Phase::Submitted => ImageView::Uploaded {
            file_name: machine
                .uploaded_file()
                .map(|f| f.name().to_string())
                .unwrap_or_default(),
            error: machine.image_error().map(|e| e.message.clone()),
        },
        Phase::Idle | Phase::Closed => ImageView::Picker {
            error: machine.image_error().map(|e| e.message.clone()),
        },
    };

    View::Form {
        title: TitleView {
            value: machine.title().to_string(),
            error: machine.title_error().map(|e| e.message.clone()),
            editable: phase != Phase::Submitting,
        },
        topic: machine.topic().map(String::from),
        image,
        submit_enabled: !matches!(phase, Phase::UploadFailed | Phase::Submitting),
        submitting: phase == Phase::Submitting,
        submit_error: machine.submit_error().map(String::from),
    }
}
