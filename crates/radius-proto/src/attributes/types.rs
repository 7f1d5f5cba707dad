/// RADIUS attribute types understood by this codec.
///
/// Attributes outside this list still decode as raw [`Attribute`](super::Attribute)
/// values and are addressed by their numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AttributeType {
    /// User-Name (1) - RFC 2865
    UserName = 1,
    /// User-Password (2) - RFC 2865
    UserPassword = 2,
    /// NAS-IP-Address (4) - RFC 2865
    NasIpAddress = 4,
    /// NAS-Port (5) - RFC 2865
    NasPort = 5,
    /// Reply-Message (18) - RFC 2865
    ReplyMessage = 18,
    /// State (24) - RFC 2865
    State = 24,
    /// Class (25) - RFC 2865
    Class = 25,
    /// Session-Timeout (27) - RFC 2865
    SessionTimeout = 27,
    /// Calling-Station-Id (31) - RFC 2865
    CallingStationId = 31,
    /// NAS-Identifier (32) - RFC 2865
    NasIdentifier = 32,
    /// Proxy-State (33) - RFC 2865
    ProxyState = 33,
    /// Acct-Status-Type (40) - RFC 2866
    AcctStatusType = 40,
    /// Acct-Session-Id (44) - RFC 2866
    AcctSessionId = 44,
    /// Acct-Session-Time (46) - RFC 2866
    AcctSessionTime = 46,
    /// Acct-Terminate-Cause (49) - RFC 2866
    AcctTerminateCause = 49,
    /// Event-Timestamp (55) - RFC 2869
    EventTimestamp = 55,
    /// Error-Cause (101) - RFC 5176
    ErrorCause = 101,
}

impl AttributeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        use AttributeType::*;
        [
            UserName,
            UserPassword,
            NasIpAddress,
            NasPort,
            ReplyMessage,
            State,
            Class,
            SessionTimeout,
            CallingStationId,
            NasIdentifier,
            ProxyState,
            AcctStatusType,
            AcctSessionId,
            AcctSessionTime,
            AcctTerminateCause,
            EventTimestamp,
            ErrorCause,
        ]
        .into_iter()
        .find(|t| t.as_u8() == value)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}
