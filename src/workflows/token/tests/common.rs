use std::sync::Arc;

use crate::api::AccessToken;
use crate::config::NavigationConfig;
use crate::workflows::testing::RecordingNavigator;
use crate::workflows::token::RedirectSchedule;

pub(super) fn token(raw: &str) -> Option<AccessToken> {
    AccessToken::new(raw)
}

pub(super) fn redirect() -> (RedirectSchedule, RecordingNavigator) {
    let navigator = RecordingNavigator::default();
    let schedule = RedirectSchedule::new(Arc::new(navigator.clone()), &NavigationConfig::default());
    (schedule, navigator)
}
