use super::common::*;
use crate::api::UploadedFile;
use crate::workflows::application::SubmissionState;
use crate::workflows::attachments::{DocumentSlot, DragEvent};

#[test]
fn cannot_leave_personal_info_without_email() {
    let mut flow = flow();
    flow.set_name("Jane Doe");
    assert!(!flow.can_advance());
    assert!(!flow.advance());
    assert_eq!(flow.current_step(), 1);
}

#[test]
fn whitespace_only_fields_do_not_satisfy_the_gate() {
    let mut flow = flow();
    flow.set_name("   ");
    flow.set_email("jane@x.com");
    assert!(!flow.advance());
}

#[test]
fn cannot_leave_course_step_without_a_course() {
    let mut flow = flow();
    flow.set_name("Jane Doe");
    flow.set_email("jane@x.com");
    assert!(flow.advance());
    assert!(!flow.advance());
    assert_eq!(flow.current_step(), 2);
}

#[test]
fn going_back_keeps_entered_values() {
    let mut flow = flow();
    flow.set_name("Jane Doe");
    flow.set_email("jane@x.com");
    flow.set_phone("+44 20 7946 0000");
    flow.advance();
    flow.select_course("cybersecurity");
    flow.advance();
    flow.attach(DocumentSlot::Cnic, pdf("cnic.pdf")).expect("pdf accepted");

    assert!(flow.retreat());
    assert!(flow.retreat());
    assert_eq!(flow.current_step(), 1);
    assert_eq!(flow.draft().applicant_name, "Jane Doe");
    assert_eq!(flow.draft().phone, "+44 20 7946 0000");

    assert!(flow.advance());
    assert_eq!(flow.draft().selected_course_id, "cybersecurity");
    assert!(flow.advance());
    assert!(flow.draft().attachments.get(DocumentSlot::Cnic).is_some());
}

#[test]
fn advance_never_passes_the_last_step() {
    let mut flow = flow_at_documents();
    assert!(!flow.can_advance());
    assert!(!flow.advance());
    assert_eq!(flow.current_step(), flow.total_steps());
}

#[test]
fn submit_before_final_step_is_a_noop() {
    let mut flow = flow();
    flow.set_name("Jane Doe");
    flow.set_email("jane@x.com");
    flow.select_course("data-science");

    assert!(!flow.can_submit());
    assert_eq!(flow.begin_submit(), Ok(None));
    assert_eq!(flow.state(), &SubmissionState::Editing);
}

#[test]
fn dropped_files_go_through_the_same_checks() {
    let mut flow = flow_at_documents();
    flow.handle_drag(DocumentSlot::Passport, DragEvent::Enter)
        .expect("enter");
    assert!(flow.draft().attachments.is_drag_active_for(DocumentSlot::Passport));

    let rejected = flow.handle_drag(
        DocumentSlot::Passport,
        DragEvent::Drop(vec![UploadedFile::new("a.txt", "text/plain", vec![1])]),
    );
    assert!(rejected.is_err());
    assert!(flow.draft().attachments.get(DocumentSlot::Passport).is_none());
    assert!(!flow.draft().attachments.is_drag_active_for(DocumentSlot::Passport));
}

#[test]
fn step_titles_match_the_site() {
    let titles: Vec<_> = flow().steps().into_iter().map(|step| step.title).collect();
    assert_eq!(titles, vec!["Personal Info", "Course Selection", "Documents"]);
}
