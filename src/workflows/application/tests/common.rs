use std::sync::Arc;

use crate::api::UploadedFile;
use crate::catalog::CourseCatalog;
use crate::config::UploadLimits;
use crate::workflows::application::ApplicationSubmissionFlow;

pub(super) fn flow() -> ApplicationSubmissionFlow {
    ApplicationSubmissionFlow::new(Arc::new(CourseCatalog::standard()), &UploadLimits::default())
}

/// Jane's details entered and the flow walked to the documents step.
pub(super) fn flow_at_documents() -> ApplicationSubmissionFlow {
    let mut flow = flow();
    flow.set_name("Jane Doe");
    flow.set_email("jane@x.com");
    assert!(flow.advance(), "personal info complete");
    flow.select_course("data-science");
    assert!(flow.advance(), "course selected");
    assert_eq!(flow.current_step(), 3);
    flow
}

pub(super) fn pdf(name: &str) -> UploadedFile {
    UploadedFile::new(name, "application/pdf", b"%PDF-1.7".to_vec())
}
