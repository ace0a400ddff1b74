//! Torch capability probe.
//!
//! After a session starts, the camera stream needs a short warm-up before
//! its track capabilities can be queried. The probe waits for that settle
//! delay, then polls the host at a fixed interval for a bounded number of
//! attempts. Its lifetime is tied to the session through a cancellation
//! token: once the token fires the probe neither polls nor writes state.

use crate::state::StateStore;
use codescan_core::{ProbeSettings, SurfaceId};
use codescan_engine::{MediaHost, TrackStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Outcome of feeding one poll into the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStep {
    /// Media not ready yet; poll again after the interval
    Retry,
    /// Torch availability is known
    Resolved(bool),
}

/// Attempt-counting state machine behind the poll loop.
#[derive(Debug, Clone)]
pub struct CapabilityProbe {
    attempt: u32,
    max_attempts: u32,
}

impl CapabilityProbe {
    /// Create a probe allowing `max_attempts` polls.
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts,
        }
    }

    /// Record one poll result.
    ///
    /// A live track resolves immediately with its torch support. Missing
    /// media retries until the attempt ceiling, then resolves unavailable.
    pub fn observe(&mut self, status: TrackStatus) -> ProbeStep {
        self.attempt += 1;
        match status {
            TrackStatus::Ready(capabilities) => ProbeStep::Resolved(capabilities.supports_torch()),
            _ if self.attempt >= self.max_attempts => ProbeStep::Resolved(false),
            _ => ProbeStep::Retry,
        }
    }

    /// Polls observed so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempt
    }
}

/// Sleep for `duration` unless `token` fires first. Returns false on cancellation.
async fn sleep_unless_cancelled(duration: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        () = token.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}

/// Run the probe for the session rendered into `surface`.
///
/// Writes `is_torch_available` once, unless cancelled first.
pub(crate) async fn run(
    host: Arc<dyn MediaHost>,
    surface: SurfaceId,
    settings: ProbeSettings,
    token: CancellationToken,
    state: StateStore,
) {
    if !sleep_unless_cancelled(settings.settle_delay(), &token).await {
        debug!("Torch probe for {} cancelled during settle delay", surface);
        return;
    }

    let mut probe = CapabilityProbe::new(settings.max_attempts);

    loop {
        let status = tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!("Torch probe for {} cancelled", surface);
                return;
            }
            status = host.track_status(&surface) => status,
        };

        match probe.observe(status) {
            ProbeStep::Resolved(available) => {
                let committed = state.update_if(|s| {
                    // Checked under the store lock: a stop that cancelled the
                    // token has already reset torch state or is about to.
                    if token.is_cancelled() {
                        return false;
                    }
                    s.is_torch_available = available;
                    if !available {
                        s.is_torch_on = false;
                    }
                    true
                });
                if committed {
                    debug!(
                        "Torch probe for {} resolved after {} attempt(s): available={}",
                        surface,
                        probe.attempts(),
                        available
                    );
                }
                return;
            }
            ProbeStep::Retry => {
                debug!(
                    "Torch probe for {}: {:?} (attempt {}/{})",
                    surface,
                    status,
                    probe.attempts(),
                    settings.max_attempts
                );
                if !sleep_unless_cancelled(settings.interval(), &token).await {
                    debug!("Torch probe for {} cancelled", surface);
                    return;
                }
            }
        }
    }
}
