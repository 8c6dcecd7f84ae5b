use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{FormPayload, SubmittedApplication};
use crate::catalog::CourseCatalog;
use crate::workflows::attachments::{AcceptPolicy, FileAttachmentSet};
use crate::workflows::wizard::WizardStep;

/// In-progress application for one wizard session.
#[derive(Debug, Clone)]
pub struct ApplicationDraft {
    pub applicant_name: String,
    pub email: String,
    /// Blank means "not provided".
    pub phone: String,
    /// Blank until the course step is completed.
    pub selected_course_id: String,
    pub attachments: FileAttachmentSet,
}

impl ApplicationDraft {
    pub fn new(policy: AcceptPolicy) -> Self {
        Self {
            applicant_name: String::new(),
            email: String::new(),
            phone: String::new(),
            selected_course_id: String::new(),
            attachments: FileAttachmentSet::new(policy),
        }
    }

    pub fn has_contact_details(&self) -> bool {
        !self.applicant_name.trim().is_empty() && !self.email.trim().is_empty()
    }

    pub fn has_course(&self) -> bool {
        !self.selected_course_id.trim().is_empty()
    }

    /// Builds the `POST /apply` form: `name`, `email`, `phone` when given,
    /// then one field per attached document. The course choice is validated
    /// here but is not part of the form.
    pub fn to_payload(
        &self,
        catalog: &CourseCatalog,
    ) -> Result<FormPayload, ApplicationValidationError> {
        let name = self.applicant_name.trim();
        if name.is_empty() {
            return Err(ApplicationValidationError::MissingName);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ApplicationValidationError::MissingEmail);
        }
        let course_id = self.selected_course_id.trim();
        if course_id.is_empty() {
            return Err(ApplicationValidationError::MissingCourse);
        }
        if !catalog.contains(course_id) {
            return Err(ApplicationValidationError::InvalidState(format!(
                "selected course '{course_id}' is not in the catalog"
            )));
        }

        let mut payload = FormPayload::new().text("name", name).text("email", email);
        let phone = self.phone.trim();
        if !phone.is_empty() {
            payload = payload.text("phone", phone);
        }
        for (slot, file) in self.attachments.iter() {
            payload = payload.file(slot.field_name(), file.clone());
        }
        Ok(payload)
    }
}

/// The three wizard steps and their gates.
pub fn application_steps() -> Vec<WizardStep<ApplicationDraft>> {
    vec![
        WizardStep::new(
            "Personal Info",
            "Basic details",
            ApplicationDraft::has_contact_details,
        ),
        WizardStep::new(
            "Course Selection",
            "Choose program",
            ApplicationDraft::has_course,
        ),
        WizardStep::open("Documents", "Upload files"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplicationValidationError {
    #[error("Please enter your full name")]
    MissingName,
    #[error("Please enter your email address")]
    MissingEmail,
    #[error("Please select a course")]
    MissingCourse,
    #[error("application is in an invalid state: {0}")]
    InvalidState(String),
}

/// Confirmation of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationResult {
    pub application_id: String,
    pub submitted_at: DateTime<Utc>,
}

impl ApplicationResult {
    /// Uses the backend's timestamp when it is RFC 3339, else the receipt time.
    pub fn from_response(response: SubmittedApplication, received_at: DateTime<Utc>) -> Self {
        let submitted_at = response
            .submitted_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|stamp| stamp.with_timezone(&Utc))
            .unwrap_or(received_at);
        Self {
            application_id: response.application_id,
            submitted_at,
        }
    }
}
