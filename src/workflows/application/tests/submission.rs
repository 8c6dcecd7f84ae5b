use super::common::*;
use crate::api::{ApiError, SubmittedApplication};
use crate::workflows::application::{ApplicationValidationError, SubmissionState};
use crate::workflows::attachments::DocumentSlot;
use crate::workflows::testing::{FakeBackend, RecordedCall};

#[tokio::test]
async fn minimal_application_sends_only_name_and_email() {
    let backend = FakeBackend::default();
    let mut flow = flow_at_documents();

    let state = flow.submit(&backend).await.expect("valid draft").clone();

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        RecordedCall::Apply(payload) => {
            assert_eq!(payload.field_names(), vec!["name", "email"]);
            assert_eq!(payload.text_value("name"), Some("Jane Doe"));
            assert_eq!(payload.text_value("email"), Some("jane@x.com"));
        }
        other => panic!("expected apply call, got {other:?}"),
    }
    match state {
        SubmissionState::Submitted(result) => assert_eq!(result.application_id, "APP-1"),
        other => panic!("expected submitted, got {other:?}"),
    }
}

#[tokio::test]
async fn phone_and_documents_are_appended_in_slot_order() {
    let backend = FakeBackend::default();
    let mut flow = flow_at_documents();
    flow.retreat();
    flow.retreat();
    flow.set_phone("0300 1234567");
    flow.advance();
    flow.advance();
    flow.attach(DocumentSlot::Passport, pdf("passport.pdf"))
        .expect("accepted");
    flow.attach(DocumentSlot::ResultCard1, pdf("matric.pdf"))
        .expect("accepted");

    flow.submit(&backend).await.expect("valid draft");

    match &backend.calls()[0] {
        RecordedCall::Apply(payload) => {
            assert_eq!(
                payload.field_names(),
                vec!["name", "email", "phone", "result_card_1", "passport"]
            );
            assert_eq!(
                payload
                    .file_value("passport")
                    .map(|file| file.file_name.as_str()),
                Some("passport.pdf")
            );
        }
        other => panic!("expected apply call, got {other:?}"),
    }
}

#[tokio::test]
async fn backend_timestamp_is_kept_when_parseable() {
    let backend = FakeBackend::default();
    backend.respond_to_apply(Ok(SubmittedApplication {
        application_id: "APP-7".to_string(),
        submitted_at: Some("2026-10-18T09:30:00Z".to_string()),
    }));
    let mut flow = flow_at_documents();
    flow.submit(&backend).await.expect("valid draft");

    let result = flow.result().expect("submitted");
    assert_eq!(result.submitted_at.to_rfc3339(), "2026-10-18T09:30:00+00:00");
}

#[test]
fn second_begin_while_submitting_has_no_effect() {
    let mut flow = flow_at_documents();
    let first = flow.begin_submit().expect("valid draft");
    assert!(first.is_some());
    assert_eq!(flow.state(), &SubmissionState::Submitting);
    assert!(!flow.can_submit());

    assert_eq!(flow.begin_submit(), Ok(None));
    assert!(!flow.set_name("Someone Else"), "edits locked while submitting");
    assert_eq!(flow.draft().applicant_name, "Jane Doe");
}

#[tokio::test]
async fn submitting_twice_after_success_makes_one_call() {
    let backend = FakeBackend::default();
    let mut flow = flow_at_documents();
    flow.submit(&backend).await.expect("valid draft");
    flow.submit(&backend).await.expect("ignored");
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn server_message_is_shown_and_draft_kept() {
    let backend = FakeBackend::default();
    backend.respond_to_apply(Err(ApiError::Rejected {
        status: Some(422),
        message: Some("Email already registered".to_string()),
    }));
    let mut flow = flow_at_documents();

    let state = flow.submit(&backend).await.expect("valid draft").clone();

    assert_eq!(
        state,
        SubmissionState::Failed {
            message: "Email already registered".to_string()
        }
    );
    assert_eq!(flow.draft().email, "jane@x.com");
    assert_eq!(flow.current_step(), 3);
    assert!(flow.can_submit(), "retry allowed from failed");
}

#[tokio::test]
async fn transport_failure_uses_generic_message() {
    let backend = FakeBackend::default();
    backend.respond_to_apply(Err(ApiError::Transport("connection reset".to_string())));
    let mut flow = flow_at_documents();
    let state = flow.submit(&backend).await.expect("valid draft").clone();
    assert_eq!(
        state,
        SubmissionState::Failed {
            message: "Failed to submit application".to_string()
        }
    );
}

#[tokio::test]
async fn editing_after_failure_returns_to_editing_and_retry_succeeds() {
    let backend = FakeBackend::default();
    backend.respond_to_apply(Err(ApiError::Transport("offline".to_string())));
    let mut flow = flow_at_documents();
    flow.submit(&backend).await.expect("valid draft");

    assert!(flow.set_email("jane.doe@x.com"));
    assert_eq!(flow.state(), &SubmissionState::Editing);

    backend.respond_to_apply(Ok(SubmittedApplication {
        application_id: "APP-2".to_string(),
        submitted_at: None,
    }));
    flow.submit(&backend).await.expect("valid draft");
    assert_eq!(
        flow.result().map(|result| result.application_id.as_str()),
        Some("APP-2")
    );
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn unknown_course_is_caught_before_the_network() {
    let backend = FakeBackend::default();
    let mut flow = flow_at_documents();
    flow.retreat();
    flow.select_course("underwater-basket-weaving");
    flow.advance();

    let err = flow.submit(&backend).await.expect_err("unknown course rejected");
    assert!(matches!(err, ApplicationValidationError::InvalidState(_)));
    assert_eq!(flow.inline_error(), Some(&err));
    assert_eq!(flow.state(), &SubmissionState::Editing);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn cancelled_submission_returns_to_editing() {
    let backend = FakeBackend::default();
    backend.hang();
    let mut flow = flow_at_documents();
    let abort = flow.abort_handle();

    let canceller = tokio::spawn(async move {
        tokio::task::yield_now().await;
        abort.cancel();
    });
    let state = flow.submit(&backend).await.expect("valid draft").clone();
    canceller.await.expect("canceller finishes");

    assert_eq!(state, SubmissionState::Editing);
    assert_eq!(backend.call_count(), 1);
    assert!(flow.can_submit(), "a fresh attempt is possible after cancellation");
}

#[tokio::test]
async fn teardown_then_submit_never_calls_backend() {
    let backend = FakeBackend::default();
    for _ in 0..50 {
        let mut flow = flow_at_documents();
        flow.teardown();
        let state = flow.submit(&backend).await.expect("valid draft").clone();
        assert_eq!(state, SubmissionState::Editing);
    }
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn aborted_handle_blocks_later_submissions() {
    let backend = FakeBackend::default();
    let mut flow = flow_at_documents();
    flow.abort_handle().cancel();

    for _ in 0..5 {
        flow.submit(&backend).await.expect("valid draft");
    }

    assert_eq!(backend.call_count(), 0);
    assert_eq!(flow.state(), &SubmissionState::Editing);
}

#[test]
fn teardown_during_flight_stays_torn_down() {
    let mut flow = flow_at_documents();
    assert!(flow.begin_submit().expect("valid draft").is_some());

    flow.teardown();
    flow.complete_submit(Err(ApiError::Cancelled));

    assert_eq!(flow.state(), &SubmissionState::Editing);
    assert!(flow.abort_handle().is_cancelled());
    assert_eq!(flow.begin_submit(), Ok(None));
}

#[tokio::test]
async fn start_new_resets_everything() {
    let backend = FakeBackend::default();
    let mut flow = flow_at_documents();
    flow.attach(DocumentSlot::Cnic, pdf("id.pdf")).expect("accepted");
    flow.submit(&backend).await.expect("valid draft");

    flow.start_new();
    assert_eq!(flow.state(), &SubmissionState::Editing);
    assert_eq!(flow.current_step(), 1);
    assert!(flow.draft().applicant_name.is_empty());
    assert!(flow.draft().attachments.is_empty());
}

#[test]
fn start_new_is_ignored_while_editing() {
    let mut flow = flow_at_documents();
    flow.start_new();
    assert_eq!(flow.current_step(), 3);
    assert_eq!(flow.draft().applicant_name, "Jane Doe");
}
