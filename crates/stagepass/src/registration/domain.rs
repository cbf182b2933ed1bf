use serde::{Deserialize, Serialize};

/// Which registration form produced the record; fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationKind {
    Performer,
    Audience,
}

impl RegistrationKind {
    pub const fn label(self) -> &'static str {
        match self {
            RegistrationKind::Performer => "performer",
            RegistrationKind::Audience => "audience",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "performer" => Some(Self::Performer),
            "audience" => Some(Self::Audience),
            _ => None,
        }
    }
}

/// Lifecycle state of a registration. Always `Pending` at creation; the
/// admin review flow moves it exactly once to `Approved` or `Declined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Declined,
}

impl RegistrationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Declined => "declined",
        }
    }

    /// Decided registrations expose no further transition.
    pub const fn is_decided(self) -> bool {
        !matches!(self, RegistrationStatus::Pending)
    }
}

/// The two terminal outcomes an admin can pick for a pending registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Decline,
}

impl Decision {
    pub const fn target(self) -> RegistrationStatus {
        match self {
            Decision::Approve => RegistrationStatus::Approved,
            Decision::Decline => RegistrationStatus::Declined,
        }
    }

    pub const fn past_tense(self) -> &'static str {
        match self {
            Decision::Approve => "approved",
            Decision::Decline => "declined",
        }
    }
}

/// Contact details collected from both forms; free-form, required non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantDetails {
    pub name: String,
    pub email: String,
    pub mobile: String,
}

/// One uploaded file as received from the form, prior to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Extension carried over into the stored object name.
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext,
            _ => "bin",
        }
    }

    fn is_image(&self) -> bool {
        self.content_type
            .parse::<mime::Mime>()
            .map(|m| m.type_() == mime::IMAGE)
            .unwrap_or(false)
    }

    pub(crate) fn require_image(&self, field: &'static str) -> Result<(), ValidationError> {
        if self.bytes.is_empty() {
            return Err(ValidationError::MissingField(field));
        }
        if !self.is_image() {
            return Err(ValidationError::NotAnImage {
                field,
                content_type: self.content_type.clone(),
            });
        }
        Ok(())
    }
}

/// Everything a registration form hands to the submission flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSubmission {
    pub kind: RegistrationKind,
    pub applicant: ApplicantDetails,
    pub transaction_id: String,
    pub performance_type: Option<String>,
    pub profile_photo: ImageUpload,
    pub payment_screenshot: ImageUpload,
}

impl RegistrationSubmission {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.applicant.name)?;
        require("email", &self.applicant.email)?;
        require("mobile", &self.applicant.mobile)?;
        require("transaction_id", &self.transaction_id)?;

        if self.kind == RegistrationKind::Performer {
            match self.performance_type.as_deref() {
                Some(value) if !value.trim().is_empty() => {}
                _ => return Err(ValidationError::MissingPerformanceType),
            }
        }

        self.profile_photo.require_image("profile_photo")?;
        self.payment_screenshot.require_image("payment_screenshot")?;
        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Form-level failures caught before anything touches a store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("required field '{0}' is missing or empty")]
    MissingField(&'static str),
    #[error("performer registrations require a performance type")]
    MissingPerformanceType,
    #[error("field '{field}' must be an image upload, got '{content_type}'")]
    NotAnImage {
        field: &'static str,
        content_type: String,
    },
}

/// Shown alongside the order id exactly once, at submission time. There is
/// no recovery path for a lost order id.
pub const ORDER_ID_NOTICE: &str =
    "Please save this order id. If lost, it cannot be recovered.";
