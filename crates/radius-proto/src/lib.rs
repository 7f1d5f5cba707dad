//! RADIUS Protocol Codec
//!
//! Packet encoding and decoding for the parts of RFC 2865 (authentication),
//! RFC 2866 (accounting) and RFC 5176 (Dynamic Authorization: CoA and
//! Disconnect) that a small AAA gateway needs.
//!
//! # Features
//!
//! - Packet and attribute encoding/decoding
//! - Request codes and their canonical names
//! - User-Password hiding (RFC 2865 Section 5.2)
//! - Request Authenticators for signed requests and Response Authenticators
//!
//! # Example
//!
//! ```rust
//! use radius_proto::{Attribute, AttributeType, Code, Packet};
//! use radius_proto::auth::{calculate_request_authenticator, verify_request_authenticator};
//!
//! let secret = b"mysharedsecret";
//! let mut packet = Packet::new(Code::CoaRequest, 1, [0u8; 16]);
//! packet.add_attribute(Attribute::string(AttributeType::UserName as u8, "alice").unwrap());
//! packet.authenticator = calculate_request_authenticator(&packet, secret).unwrap();
//!
//! let bytes = packet.encode().unwrap();
//! let decoded = Packet::decode(&bytes).unwrap();
//! assert!(verify_request_authenticator(&decoded, secret));
//! ```

pub mod accounting;
pub mod attributes;
pub mod auth;
pub mod packet;

pub use accounting::AcctStatusType;
pub use attributes::{Attribute, AttributeType};
pub use auth::{
    PasswordError, calculate_request_authenticator, calculate_response_authenticator,
    decrypt_user_password, encrypt_user_password, generate_request_authenticator,
    verify_request_authenticator, verify_response_authenticator,
};
pub use packet::{Code, Packet, PacketError};
