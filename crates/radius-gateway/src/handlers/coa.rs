use crate::audit::{AuditEntry, AuditLogger, HandlerKind};
use crate::server::{Decision, Handler, Request};
use async_trait::async_trait;
use radius_proto::Code;
use std::sync::Arc;
use tracing::{info, warn};

/// Dynamic Authorization (RFC 5176) handler.
///
/// CoA-Request and Disconnect-Request are acknowledged without checking the
/// requested change against any session state; no session state is kept.
pub struct CoaHandler {
    audit: Arc<AuditLogger>,
}

impl CoaHandler {
    pub fn new(audit: Arc<AuditLogger>) -> Self {
        CoaHandler { audit }
    }

    /// Response code and audit label for a request code
    pub fn classify(code: Code) -> (Code, HandlerKind) {
        match code {
            Code::DisconnectRequest => (Code::DisconnectAck, HandlerKind::CoaDisconnect),
            Code::CoaRequest => (Code::CoaAck, HandlerKind::Coa),
            _ => (Code::CoaNak, HandlerKind::Coa),
        }
    }
}

#[async_trait]
impl Handler for CoaHandler {
    async fn serve(&self, request: &Request) -> Decision {
        let (code, kind) = Self::classify(request.code());
        let username = request.username();

        if code == Code::CoaNak {
            warn!(
                packet_type = %request.code(),
                client_addr = %request.remote_addr(),
                "Unexpected request on CoA listener"
            );
        } else {
            info!(
                packet_type = %request.code(),
                username = %username,
                client_addr = %request.remote_addr(),
                "Dynamic authorization request acknowledged"
            );
        }

        self.audit
            .record(
                &AuditEntry::new(request.remote_addr(), kind, username, code)
                    .with_session_id(request.session_id()),
            )
            .await;

        Decision::new(code)
    }
}
