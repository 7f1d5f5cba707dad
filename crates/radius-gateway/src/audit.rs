//! Audit logging for RADIUS exchanges
//!
//! Every completed exchange on any listener produces exactly one JSON line in
//! the audit log. Only extracted fields are recorded; raw packets and
//! passwords never reach the log.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::error;

/// Which handler produced an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerKind {
    #[serde(rename = "access")]
    Access,
    #[serde(rename = "accounting")]
    Accounting,
    #[serde(rename = "coa")]
    Coa,
    #[serde(rename = "coa/disconnect")]
    CoaDisconnect,
}

/// Audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// RFC 3339 timestamp taken when the entry is built
    pub timestamp: String,
    /// Client socket address
    pub remote_addr: String,
    #[serde(rename = "handler")]
    pub handler_type: HandlerKind,
    /// User-Name, empty when the request carried none
    pub username: String,
    /// Response code name, e.g. `Access-Accept`
    pub code: String,
    /// Accounting lifecycle label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_type: Option<String>,
    /// Reserved for future fields
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AuditEntry {
    pub fn new(
        remote_addr: SocketAddr,
        handler_type: HandlerKind,
        username: impl Into<String>,
        code: impl ToString,
    ) -> Self {
        AuditEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            remote_addr: remote_addr.to_string(),
            handler_type,
            username: username.into(),
            code: code.to_string(),
            status_type: None,
            extra: BTreeMap::new(),
            session_id: None,
        }
    }

    pub fn with_status_type(mut self, status_type: impl Into<String>) -> Self {
        self.status_type = Some(status_type.into());
        self
    }

    /// Set the session identifier; an empty identifier is left out of the entry
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into()).filter(|id| !id.is_empty());
        self
    }
}

type Sink = Box<dyn Write + Send>;

/// Append-only audit log.
///
/// The sink is owned by the logger for its whole lifetime and flushed when
/// the logger is dropped. Each entry is written with a single `write_all`
/// while holding the sink lock, so lines from concurrent listeners never
/// interleave.
pub struct AuditLogger {
    file_path: Option<PathBuf>,
    sink: Option<Mutex<Sink>>,
}

impl AuditLogger {
    /// Open (or create) the audit log in append mode; `None` disables auditing
    pub fn new(file_path: Option<PathBuf>) -> io::Result<Self> {
        let sink = match file_path {
            Some(ref path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Some(Mutex::new(Box::new(file) as Sink))
            }
            None => None,
        };

        Ok(AuditLogger { file_path, sink })
    }

    /// Log to an arbitrary writer instead of a file
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        AuditLogger {
            file_path: None,
            sink: Some(Mutex::new(Box::new(writer))),
        }
    }

    pub fn disabled() -> Self {
        AuditLogger {
            file_path: None,
            sink: None,
        }
    }

    /// Append one entry.
    ///
    /// Failures are reported through tracing and otherwise swallowed: the
    /// caller still owes the client a response.
    pub async fn record(&self, entry: &AuditEntry) {
        let Some(ref sink) = self.sink else {
            return;
        };

        let mut line = match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize audit entry: {}", e);
                return;
            }
        };
        line.push('\n');

        let mut sink = sink.lock().await;
        if let Err(e) = sink.write_all(line.as_bytes()) {
            error!(
                handler = ?entry.handler_type,
                remote_addr = %entry.remote_addr,
                "Failed to write audit log: {}",
                e
            );
        }
    }

    pub async fn flush(&self) {
        if let Some(ref sink) = self.sink {
            if let Err(e) = sink.lock().await.flush() {
                error!("Failed to flush audit log: {}", e);
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

impl Drop for AuditLogger {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            let _ = sink.get_mut().flush();
        }
    }
}
