//! RADIUS Accounting attribute values (RFC 2866)
//!
//! ```rust
//! use radius_proto::accounting::AcctStatusType;
//!
//! assert_eq!(AcctStatusType::Start.as_u32(), 1);
//! assert_eq!(AcctStatusType::from_u32(3), Some(AcctStatusType::InterimUpdate));
//! assert_eq!(AcctStatusType::from_u32(99), None);
//! ```

/// Acct-Status-Type values (RFC 2866 Section 5.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AcctStatusType {
    /// Start (1) - Session has begun
    Start = 1,
    /// Stop (2) - Session has ended
    Stop = 2,
    /// Interim-Update (3) - Periodic update during session (RFC 2869)
    InterimUpdate = 3,
    /// Accounting-On (7) - NAS is ready
    AccountingOn = 7,
    /// Accounting-Off (8) - NAS is shutting down
    AccountingOff = 8,
}

impl AcctStatusType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(AcctStatusType::Start),
            2 => Some(AcctStatusType::Stop),
            3 => Some(AcctStatusType::InterimUpdate),
            7 => Some(AcctStatusType::AccountingOn),
            8 => Some(AcctStatusType::AccountingOff),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Start, Stop and Interim-Update describe a user session; the others the NAS itself
    pub fn is_session_status(self) -> bool {
        matches!(
            self,
            AcctStatusType::Start | AcctStatusType::Stop | AcctStatusType::InterimUpdate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acct_status_type_conversion() {
        for status in [
            AcctStatusType::Start,
            AcctStatusType::Stop,
            AcctStatusType::InterimUpdate,
            AcctStatusType::AccountingOn,
            AcctStatusType::AccountingOff,
        ] {
            assert_eq!(AcctStatusType::from_u32(status.as_u32()), Some(status));
        }
        assert_eq!(AcctStatusType::from_u32(0), None);
        assert_eq!(AcctStatusType::from_u32(4), None);
    }

    #[test]
    fn test_session_status() {
        assert!(AcctStatusType::InterimUpdate.is_session_status());
        assert!(!AcctStatusType::AccountingOn.is_session_status());
    }
}
