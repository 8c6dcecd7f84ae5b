//! Applicant-facing flow: personal details, course choice, documents, submit.

mod draft;
mod flow;

#[cfg(test)]
mod tests;

pub use draft::{application_steps, ApplicationDraft, ApplicationResult, ApplicationValidationError};
pub use flow::{ApplicationSubmissionFlow, SubmissionState};
