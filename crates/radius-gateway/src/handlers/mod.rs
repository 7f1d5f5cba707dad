//! Per-listener decision logic.
//!
//! Each handler makes its decision from the request alone, writes exactly one
//! audit entry and returns the response code. None of them fail: unknown
//! input maps to a defined fallback decision.

mod access;
mod accounting;
mod coa;

pub use access::AccessHandler;
pub use accounting::{AccountingHandler, AccountingStatus};
pub use coa::CoaHandler;
