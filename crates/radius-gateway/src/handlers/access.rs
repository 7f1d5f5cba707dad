use crate::audit::{AuditEntry, AuditLogger, HandlerKind};
use crate::credentials::CredentialStore;
use crate::server::{Decision, Handler, Request};
use async_trait::async_trait;
use radius_proto::Code;
use std::sync::Arc;
use tracing::{info, warn};

/// Access-Request handler: PAP check against the credential store
pub struct AccessHandler {
    credentials: Arc<dyn CredentialStore>,
    audit: Arc<AuditLogger>,
}

impl AccessHandler {
    pub fn new(credentials: Arc<dyn CredentialStore>, audit: Arc<AuditLogger>) -> Self {
        AccessHandler { credentials, audit }
    }

    /// Accept only when the user exists and the password matches exactly
    pub fn decide(&self, username: &str, password: Option<&str>) -> Code {
        match (self.credentials.lookup(username), password) {
            (Some(stored), Some(supplied)) if stored == supplied => Code::AccessAccept,
            _ => Code::AccessReject,
        }
    }
}

#[async_trait]
impl Handler for AccessHandler {
    async fn serve(&self, request: &Request) -> Decision {
        let username = request.username();
        let password = request.password();
        let code = self.decide(&username, password.as_deref());

        if code == Code::AccessAccept {
            info!(
                username = %username,
                client_addr = %request.remote_addr(),
                request_id = request.packet().identifier,
                "Authentication successful"
            );
        } else {
            warn!(
                username = %username,
                client_addr = %request.remote_addr(),
                request_id = request.packet().identifier,
                "Authentication failed"
            );
        }

        self.audit
            .record(&AuditEntry::new(
                request.remote_addr(),
                HandlerKind::Access,
                username,
                code,
            ))
            .await;

        Decision::new(code)
    }
}
