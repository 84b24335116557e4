//! Field validation for the submission form
//!
//! The title is validated on blur by default, or on every change when the
//! policy asks for it. Errors supplied from outside (e.g. a server-side
//! validation message) win over the locally computed ones.

use crate::types::UploadStatus;

/// Message for an empty title
pub const TITLE_REQUIRED: &str = "Post title is required";

/// Message for a submit attempt without an uploaded image
pub const IMAGE_REQUIRED: &str = "Image is required";

/// Form field a validation error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Post title input
    Title,
    /// Image picker
    Image,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// Validation failure attached to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field the error belongs to
    pub field: Field,
    /// Message shown under the field
    pub message: String,
}

impl ValidationError {
    /// Create an error for `field`
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Required-field check; surrounding whitespace is ignored
pub fn validate_title(value: &str) -> Option<ValidationError> {
    value
        .trim()
        .is_empty()
        .then(|| ValidationError::new(Field::Title, TITLE_REQUIRED))
}

/// The image is valid only once its upload succeeded
pub fn validate_image(status: UploadStatus) -> Option<ValidationError> {
    (status != UploadStatus::Success).then(|| ValidationError::new(Field::Image, IMAGE_REQUIRED))
}

/// When title validation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Validate when the input loses focus
    pub on_blur: bool,
    /// Validate on every change
    pub on_change: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            on_blur: true,
            on_change: false,
        }
    }
}

/// Visible error of a field changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationChange {
    /// Field whose error changed
    pub field: Field,
    /// Error now shown, if any
    pub error: Option<ValidationError>,
}

/// Internal and external error slots of one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    internal: Option<ValidationError>,
    external: Option<ValidationError>,
}

impl FieldErrors {
    /// Error currently shown: external first
    pub const fn visible(&self) -> Option<&ValidationError> {
        match self.external {
            Some(ref e) => Some(e),
            None => self.internal.as_ref(),
        }
    }

    fn update(
        &mut self,
        field: Field,
        apply: impl FnOnce(&mut Self),
    ) -> Option<ValidationChange> {
        let before = self.visible().cloned();
        apply(self);
        let after = self.visible().cloned();
        (before != after).then_some(ValidationChange {
            field,
            error: after,
        })
    }
}

/// Title input with its validation state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleField {
    value: String,
    policy: ValidationPolicy,
    errors: FieldErrors,
}

impl TitleField {
    /// Empty field validated according to `policy`
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Current text
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Policy in use
    pub const fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Error currently shown under the input
    pub const fn error(&self) -> Option<&ValidationError> {
        self.errors.visible()
    }

    /// Text changed.
    ///
    /// Validates right away with `on_change`; otherwise a stale internal error
    /// is cleared so the user is not nagged while typing.
    pub fn change(&mut self, value: impl Into<String>) -> Option<ValidationChange> {
        self.value = value.into();
        let on_change = self.policy.on_change;
        let computed = validate_title(&self.value);
        self.errors.update(Field::Title, |errors| {
            errors.internal = if on_change { computed } else { None };
        })
    }

    /// Input lost focus
    pub fn blur(&mut self) -> Option<ValidationChange> {
        if self.policy.on_blur {
            self.validate()
        } else {
            None
        }
    }

    /// Validate regardless of policy (used on submit)
    pub fn validate(&mut self) -> Option<ValidationChange> {
        let computed = validate_title(&self.value);
        self.errors
            .update(Field::Title, |errors| errors.internal = computed)
    }

    /// Set or clear an error supplied from outside
    pub fn set_external(&mut self, message: Option<String>) -> Option<ValidationChange> {
        let external = message.map(|m| ValidationError::new(Field::Title, m));
        self.errors
            .update(Field::Title, |errors| errors.external = external)
    }

    /// Whether the current value passes validation
    pub fn is_valid(&self) -> bool {
        validate_title(&self.value).is_none() && self.errors.external.is_none()
    }
}

/// Image picker validation state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageField {
    errors: FieldErrors,
}

impl ImageField {
    /// Error currently shown under the picker
    pub const fn error(&self) -> Option<&ValidationError> {
        self.errors.visible()
    }

    /// Run the image check against the current upload status
    pub fn validate(&mut self, status: UploadStatus) -> Option<ValidationChange> {
        let computed = validate_image(status);
        self.errors
            .update(Field::Image, |errors| errors.internal = computed)
    }

    /// Drop the locally computed error
    pub fn clear(&mut self) -> Option<ValidationChange> {
        self.errors
            .update(Field::Image, |errors| errors.internal = None)
    }

    /// Set or clear an error supplied from outside
    pub fn set_external(&mut self, message: Option<String>) -> Option<ValidationChange> {
        let external = message.map(|m| ValidationError::new(Field::Image, m));
        self.errors
            .update(Field::Image, |errors| errors.external = external)
    }

    /// Whether `status` passes the image check and no external error is set
    pub fn is_valid(&self, status: UploadStatus) -> bool {
        validate_image(status).is_none() && self.errors.external.is_none()
    }
}
