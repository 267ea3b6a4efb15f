use tracing::{error, info, warn};

/// User-facing progress and alert sink for handler operations.
///
/// Every call carries the coin code so a front-end can route messages per
/// wallet.
pub trait Notifier: Send + Sync {
    fn info(&self, code: &str, message: &str);
    fn error(&self, code: &str, message: &str);
    fn success(&self, code: &str, message: &str);

    /// The chain backend for `code` could not be reached.
    fn network_unavailable(&self, code: &str);
}

/// Forwards notifications to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, code: &str, message: &str) {
        info!(coin = code, "{message}");
    }

    fn error(&self, code: &str, message: &str) {
        error!(coin = code, "{message}");
    }

    fn success(&self, code: &str, message: &str) {
        info!(coin = code, success = true, "{message}");
    }

    fn network_unavailable(&self, code: &str) {
        warn!(coin = code, "network unavailable");
    }
}
