use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::NavigationConfig;

/// Page navigation, supplied by the host.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, destination: &str);
}

/// Where to go after a successful token action, and after how long.
#[derive(Clone)]
pub struct RedirectSchedule {
    navigator: Arc<dyn Navigator>,
    delay: Duration,
    destination: String,
}

impl RedirectSchedule {
    pub fn new(navigator: Arc<dyn Navigator>, config: &NavigationConfig) -> Self {
        Self {
            navigator,
            delay: config.redirect_delay,
            destination: config.home_path.clone(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Spawns the single delayed navigation. Cancelling `parent` before the
    /// delay elapses means it never fires.
    pub(crate) fn schedule(&self, parent: &CancellationToken) -> Option<PendingRedirect> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("no async runtime available; skipping post-success redirect");
                return None;
            }
        };

        let cancel = parent.child_token();
        let guard = cancel.clone();
        let navigator = Arc::clone(&self.navigator);
        let destination = self.destination.clone();
        let delay = self.delay;

        let handle = runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    debug!(%destination, "redirecting after successful action");
                    navigator.navigate(&destination);
                    true
                }
                _ = guard.cancelled() => false,
            }
        });

        Some(PendingRedirect { cancel, handle })
    }
}

impl fmt::Debug for RedirectSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedirectSchedule")
            .field("delay", &self.delay)
            .field("destination", &self.destination)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub(crate) struct PendingRedirect {
    cancel: CancellationToken,
    handle: JoinHandle<bool>,
}

impl PendingRedirect {
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Resolves to whether the navigation actually happened.
    pub(crate) async fn wait(self) -> bool {
        self.handle.await.unwrap_or(false)
    }
}
