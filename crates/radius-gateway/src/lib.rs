//! RADIUS AAA Gateway
//!
//! Three UDP listeners built on the `radius-proto` codec:
//!
//! - Access (1812): PAP authentication against a static credential set
//! - Accounting (1813): every Accounting-Request is acknowledged
//! - CoA/Disconnect (3799): CoA-Request and Disconnect-Request are acknowledged
//!
//! Every exchange is recorded as one JSON line in the audit log.
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_gateway::{AuditLogger, Config, ListenerSet};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let audit = Arc::new(AuditLogger::new(config.audit_log_path.clone())?);
//!     let credentials = Arc::new(config.credentials());
//!
//!     let listeners = ListenerSet::bind(&config, credentials, audit).await?;
//!     listeners.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod config;
pub mod credentials;
pub mod handlers;
pub mod listeners;
pub mod server;

#[cfg(test)]
mod test_support;

pub use audit::{AuditEntry, AuditLogger, HandlerKind};
pub use config::{Client, Config, ConfigError, User};
pub use credentials::{CredentialStore, StaticCredentials};
pub use handlers::{AccessHandler, AccountingHandler, AccountingStatus, CoaHandler};
pub use listeners::{Listener, ListenerSet};
pub use server::{
    ClientSecretSource, Decision, Handler, PacketServer, Request, SecretSource, ServerError,
    StaticSecretSource,
};
