use std::time::Duration;

use super::common::*;
use crate::workflows::testing::FakeBackend;
use crate::workflows::token::{AdminAcceptanceFlow, TokenActionState};

#[tokio::test(start_paused = true)]
async fn redirect_does_not_fire_early() {
    let backend = FakeBackend::default();
    let (schedule, navigator) = redirect();
    let mut flow = AdminAcceptanceFlow::load(token("tok123"), schedule);

    flow.accept(&backend).await;
    tokio::time::sleep(Duration::from_millis(2_900)).await;
    assert!(navigator.visits().is_empty());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(navigator.visits(), vec!["/".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn teardown_before_delay_cancels_redirect() {
    let backend = FakeBackend::default();
    let (schedule, navigator) = redirect();
    let mut flow = AdminAcceptanceFlow::load(token("tok123"), schedule);

    flow.accept(&backend).await;
    assert!(matches!(flow.state(), TokenActionState::Success { .. }));
    tokio::time::sleep(Duration::from_secs(1)).await;
    flow.teardown();

    assert_eq!(flow.wait_for_redirect().await, Some(false));
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(navigator.visits().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_flow_cancels_redirect() {
    let backend = FakeBackend::default();
    let (schedule, navigator) = redirect();
    let mut flow = AdminAcceptanceFlow::load(token("tok123"), schedule);

    flow.accept(&backend).await;
    drop(flow);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(navigator.visits().is_empty());
}

#[test]
fn success_outside_a_runtime_skips_redirect() {
    let (schedule, navigator) = redirect();
    let mut flow = AdminAcceptanceFlow::load(token("tok123"), schedule);

    flow.begin_accept().expect("confirming");
    flow.complete_accept(Ok(crate::api::ActionAcknowledgement { message: None }));

    assert_eq!(flow.state(), &TokenActionState::Success { message: None });
    assert!(navigator.visits().is_empty());
}
