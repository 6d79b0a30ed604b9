//! Startup readiness.
//!
//! The host may still be loading when the Mini-App starts. Instead of
//! polling forever, the app asks the host a bounded number of times and
//! fails hard when the host never becomes ready.

use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::error::AppError;
use crate::host::{HostRuntime, Readiness};

/// How long to wait for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyPolicy {
    /// Maximum number of readiness checks (at least 1).
    pub attempts: u32,
    /// Delay between checks.
    pub interval: Duration,
}

impl Default for ReadyPolicy {
    fn default() -> Self {
        Self {
            attempts: 50,
            interval: Duration::from_millis(100),
        }
    }
}

/// Wait until `host` reports [`Readiness::Ready`].
///
/// # Errors
///
/// Returns [`AppError::HostNotReady`] when every attempt reported pending.
#[instrument(skip(host))]
pub async fn await_ready<H: HostRuntime>(host: &H, policy: ReadyPolicy) -> Result<(), AppError> {
    let attempts = policy.attempts.max(1);

    for attempt in 1..=attempts {
        match host.ready().await {
            Readiness::Ready => {
                info!(attempt, "Host runtime ready");
                return Ok(());
            }
            Readiness::Pending => {
                debug!(attempt, "Host runtime not ready yet");
                if attempt < attempts {
                    tokio::time::sleep(policy.interval).await;
                }
            }
        }
    }

    warn!(attempts, "Host runtime never became ready");
    Err(AppError::HostNotReady { attempts })
}
