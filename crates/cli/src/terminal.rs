//! Terminal host runtime.
//!
//! The terminal is ready as soon as the process starts. Identity comes from
//! the `--buyer` flag or `MINIAPP_BUYER_ID`, notices are printed to stdout
//! and haptics are only logged.

use std::io::Write;

use food_miniapp_client::{Haptic, HostRuntime, Notice, Page, Readiness};
use food_miniapp_core::{BuyerId, BuyerIdentity};
use tracing::{debug, warn};

/// Host runtime backed by the terminal.
#[derive(Debug)]
pub struct TerminalHost {
    buyer: Option<BuyerId>,
}

impl TerminalHost {
    #[must_use]
    pub const fn new(buyer: Option<BuyerId>) -> Self {
        Self { buyer }
    }
}

impl HostRuntime for TerminalHost {
    async fn ready(&self) -> Readiness {
        Readiness::Ready
    }

    fn identity(&self) -> Option<BuyerIdentity> {
        self.buyer.map(BuyerIdentity::anonymous)
    }

    fn notify(&self, notice: &Notice) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{notice}") {
            warn!(error = %e, "Failed to print notice");
        }
    }

    fn haptic(&self, feedback: Haptic) {
        debug!(?feedback, "Haptic feedback");
    }

    fn navigate(&self, page: Page) {
        debug!(page = page.as_str(), "Navigated");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_terminal_host_is_ready() {
        let host = TerminalHost::new(None);
        assert_eq!(host.ready().await, Readiness::Ready);
        assert!(host.identity().is_none());
    }

    #[test]
    fn test_terminal_host_identity() {
        let host = TerminalHost::new(Some(BuyerId::new(777).unwrap()));
        let identity = host.identity().unwrap();
        assert_eq!(identity.id.as_i64(), 777);
        assert!(identity.first_name.is_none());
    }
}
