//! Server lifecycle traits
//!
//! [`Server`] is the minimal interface a listener implements; [`ServerExt`]
//! adds spawning and signal-driven runs on top of it.

use async_trait::async_trait;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::shutdown::ShutdownController;

/// A long-running listener with cooperative shutdown
#[async_trait]
pub trait Server: Send + Sync + 'static {
    /// Name used in log lines
    fn name(&self) -> &str;

    /// Bound address while running, `None` otherwise
    fn address(&self) -> Option<SocketAddr>;

    fn is_running(&self) -> bool;

    /// Serve until `shutdown` is cancelled, then drain and return
    ///
    /// # Errors
    ///
    /// Fails if the listener cannot bind or the accept loop dies.
    async fn run(&self, shutdown: CancellationToken) -> Result<()>;
}

/// Convenience methods, implemented for every [`Server`]
pub trait ServerExt: Server + Sized {
    /// Run on a new task; cancel the returned token to stop it
    fn spawn(self) -> (tokio::task::JoinHandle<Result<()>>, CancellationToken) {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let handle = tokio::spawn(async move { self.run(task_token).await });
        (handle, token)
    }

    /// Run until Ctrl+C or SIGTERM
    fn run_with_signals(self) -> impl std::future::Future<Output = Result<()>> + Send {
        async move {
            let shutdown = ShutdownController::with_signals();
            self.run(shutdown.token()).await
        }
    }
}

impl<T: Server + Sized> ServerExt for T {}
