//! Server infrastructure for ProjectDesk
//!
//! Runs an Axum router behind the [`Server`] trait with graceful shutdown.
//! Shutdown is coordinated through a `CancellationToken` from `tokio_util`,
//! cancelled by Ctrl+C or SIGTERM.
//!
//! # Quick Start
//!
//! ```ignore
//! use server::{HttpServer, ServerConfig, ServerExt};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = HttpServer::new(ServerConfig::new("0.0.0.0", 5000), router);
//!     server.run_with_signals().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod shutdown;
pub mod traits;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use http::HttpServer;
pub use shutdown::ShutdownController;
pub use traits::{Server, ServerExt};
