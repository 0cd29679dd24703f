use std::sync::Mutex;
use std::time::Duration;

use texify_logging::texify_trace;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::HideToken;

/// Single-slot scheduler for the warning auto-hide.
///
/// Scheduling cancels whatever hide was pending, so at most one timer is ever
/// live and an older one can never fire after a newer warning was shown.
#[derive(Default)]
pub struct HideScheduler {
    pending: Mutex<Option<CancellationToken>>,
}

impl HideScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F>(&self, runtime: &Handle, token: HideToken, delay: Duration, on_elapsed: F)
    where
        F: FnOnce(HideToken) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(cancel.clone()) {
                previous.cancel();
            }
        }

        runtime.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    texify_trace!("Hide timer {} cancelled", token);
                }
                _ = tokio::time::sleep(delay) => on_elapsed(token),
            }
        });
    }

    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.take() {
                previous.cancel();
            }
        }
    }
}
