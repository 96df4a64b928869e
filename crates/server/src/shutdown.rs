//! Graceful shutdown
//!
//! A single `CancellationToken` is cancelled on Ctrl+C or SIGTERM. The HTTP
//! server stops accepting connections and drains in-flight requests once it
//! fires.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Owns the process-wide shutdown token
#[derive(Clone)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// A controller cancelled by Ctrl+C, or SIGTERM on unix
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_signals() -> Self {
        let controller = Self::new();
        let token = controller.token.clone();

        tokio::spawn(async move {
            let signal = wait_for_signal().await;
            info!(signal, "Shutdown signal received, draining requests");
            token.cancel();
        });

        controller
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(e) => {
            warn!(error = %e, "Failed to listen for SIGTERM");
            ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = ctrl_c() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    ctrl_c().await;
    "Ctrl+C"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tokens_share_cancellation() {
        let controller = ShutdownController::new();
        let first = controller.token();
        let second = controller.token();

        first.cancel();

        assert!(second.is_cancelled());
    }

    #[tokio::test]
    async fn test_with_signals_starts_uncancelled() {
        let controller = ShutdownController::with_signals();
        assert!(!controller.token().is_cancelled());
    }
}
