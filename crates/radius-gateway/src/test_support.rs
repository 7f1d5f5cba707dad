//! Fixtures shared by the unit tests

use crate::audit::AuditEntry;
use crate::server::Request;
use radius_proto::auth::{encrypt_user_password, generate_request_authenticator};
use radius_proto::{Attribute, AttributeType, Code, Packet};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub const SECRET: &[u8] = b"mysharedsecret";

pub fn client_addr() -> SocketAddr {
    "198.51.100.7:32768".parse().unwrap()
}

/// In-memory audit sink that can be inspected after the fact
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn entries(&self) -> Vec<AuditEntry> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn access_request(username: &str, password: Option<&str>) -> Request {
    let authenticator = generate_request_authenticator();
    let mut packet = Packet::new(Code::AccessRequest, 1, authenticator);
    packet.add_attribute(Attribute::string(AttributeType::UserName as u8, username).unwrap());
    if let Some(password) = password {
        let hidden = encrypt_user_password(password, SECRET, &authenticator).unwrap();
        packet.add_attribute(Attribute::new(AttributeType::UserPassword as u8, hidden).unwrap());
    }
    Request::new(packet, client_addr(), SECRET)
}

pub fn accounting_request(status: Option<u32>, session_id: Option<&str>) -> Request {
    let mut packet = Packet::new(Code::AccountingRequest, 2, [0u8; 16]);
    packet.add_attribute(Attribute::string(AttributeType::UserName as u8, "testusername").unwrap());
    if let Some(status) = status {
        packet.add_attribute(Attribute::integer(AttributeType::AcctStatusType as u8, status).unwrap());
    }
    if let Some(session_id) = session_id {
        packet.add_attribute(Attribute::string(AttributeType::AcctSessionId as u8, session_id).unwrap());
    }
    Request::new(packet, client_addr(), SECRET)
}

pub fn coa_request(code: Code) -> Request {
    let mut packet = Packet::new(code, 3, [0u8; 16]);
    packet.add_attribute(Attribute::string(AttributeType::UserName as u8, "testusername").unwrap());
    packet.add_attribute(
        Attribute::string(AttributeType::AcctSessionId as u8, "test-session-123").unwrap(),
    );
    Request::new(packet, client_addr(), SECRET)
}
