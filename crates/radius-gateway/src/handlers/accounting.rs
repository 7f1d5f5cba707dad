use crate::audit::{AuditEntry, AuditLogger, HandlerKind};
use crate::server::{Decision, Handler, Request};
use async_trait::async_trait;
use radius_proto::{AcctStatusType, Code};
use std::sync::Arc;
use tracing::info;

/// Accounting lifecycle event as recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountingStatus {
    Start,
    Stop,
    InterimUpdate,
    /// Absent, NAS-level (Accounting-On/Off) or out-of-range Acct-Status-Type
    Unrecognized,
}

impl AccountingStatus {
    pub fn from_attribute(value: Option<u32>) -> Self {
        match value.and_then(AcctStatusType::from_u32) {
            Some(AcctStatusType::Start) => AccountingStatus::Start,
            Some(AcctStatusType::Stop) => AccountingStatus::Stop,
            Some(AcctStatusType::InterimUpdate) => AccountingStatus::InterimUpdate,
            Some(AcctStatusType::AccountingOn | AcctStatusType::AccountingOff) | None => {
                AccountingStatus::Unrecognized
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AccountingStatus::Start => "Start",
            AccountingStatus::Stop => "Stop",
            AccountingStatus::InterimUpdate => "Interim-Update",
            AccountingStatus::Unrecognized => "Unknown",
        }
    }
}

/// Accounting-Request handler.
///
/// Accounting records are informational: every request is acknowledged with
/// Accounting-Response and nothing is stored beyond the audit entry.
pub struct AccountingHandler {
    audit: Arc<AuditLogger>,
}

impl AccountingHandler {
    pub fn new(audit: Arc<AuditLogger>) -> Self {
        AccountingHandler { audit }
    }
}

#[async_trait]
impl Handler for AccountingHandler {
    async fn serve(&self, request: &Request) -> Decision {
        let status = AccountingStatus::from_attribute(request.acct_status_type());
        let session_id = request.session_id();
        let username = request.username();

        info!(
            username = %username,
            session_id = %session_id,
            status = status.label(),
            client_addr = %request.remote_addr(),
            "Accounting request received"
        );

        let code = Code::AccountingResponse;
        self.audit
            .record(
                &AuditEntry::new(request.remote_addr(), HandlerKind::Accounting, username, code)
                    .with_status_type(status.label())
                    .with_session_id(session_id),
            )
            .await;

        Decision::new(code)
    }
}
