//! End-to-end tests for the RADIUS AAA gateway
//!
//! Each test binds all three listeners on loopback with OS-assigned ports,
//! sends real UDP datagrams and checks both the response and the audit log.

use radius_gateway::{AuditEntry, AuditLogger, Config, Listener, ListenerSet};
use radius_proto::auth::{
    calculate_request_authenticator, encrypt_user_password, generate_request_authenticator,
    verify_response_authenticator,
};
use radius_proto::{AcctStatusType, Attribute, AttributeType, Code, Packet};
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

const SECRET: &[u8] = b"mysharedsecret";

struct Gateway {
    addrs: HashMap<Listener, SocketAddr>,
    audit_path: PathBuf,
    _audit_file: NamedTempFile,
}

impl Gateway {
    async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    async fn start_with(customize: impl FnOnce(&mut Config)) -> Self {
        let audit_file = NamedTempFile::new().expect("Failed to create audit file");
        let audit_path = audit_file.path().to_path_buf();

        let mut config = Config {
            listen_address: "127.0.0.1".to_string(),
            access_port: 0,
            accounting_port: 0,
            coa_port: 0,
            audit_log_path: Some(audit_path.clone()),
            ..Config::default()
        };
        customize(&mut config);

        let audit = Arc::new(
            AuditLogger::new(config.audit_log_path.clone()).expect("Failed to open audit log"),
        );
        let listeners = ListenerSet::bind(&config, Arc::new(config.credentials()), audit)
            .await
            .expect("Failed to bind listeners");

        let addrs = Listener::ALL
            .iter()
            .map(|l| (*l, listeners.local_addr(*l).expect("Listener not bound")))
            .collect();

        tokio::spawn(async move {
            listeners.run().await.ok();
        });
        sleep(Duration::from_millis(100)).await;

        Gateway {
            addrs,
            audit_path,
            _audit_file: audit_file,
        }
    }

    fn addr(&self, listener: Listener) -> SocketAddr {
        self.addrs[&listener]
    }

    fn audit_entries(&self) -> Vec<AuditEntry> {
        fs::read_to_string(&self.audit_path)
            .expect("Failed to read audit log")
            .lines()
            .map(|line| serde_json::from_str(line).expect("Invalid audit line"))
            .collect()
    }
}

fn access_request(username: &str, password: &str, identifier: u8) -> Packet {
    let req_auth = generate_request_authenticator();
    let mut packet = Packet::new(Code::AccessRequest, identifier, req_auth);
    packet.add_attribute(
        Attribute::string(AttributeType::UserName as u8, username)
            .expect("Failed to create User-Name attribute"),
    );
    let hidden = encrypt_user_password(password, SECRET, &req_auth).expect("Failed to hide password");
    packet.add_attribute(
        Attribute::new(AttributeType::UserPassword as u8, hidden)
            .expect("Failed to create User-Password attribute"),
    );
    packet.add_attribute(Attribute::integer(AttributeType::NasPort as u8, 0).unwrap());
    packet
}

fn signed_request(code: Code, identifier: u8, attributes: Vec<Attribute>, secret: &[u8]) -> Packet {
    let mut packet = Packet::new(code, identifier, [0u8; 16]);
    packet.add_attribute(Attribute::string(AttributeType::UserName as u8, "testusername").unwrap());
    for attr in attributes {
        packet.add_attribute(attr);
    }
    packet.authenticator =
        calculate_request_authenticator(&packet, secret).expect("Failed to sign request");
    packet
}

fn accounting_request(status: u32, session_id: &str, identifier: u8) -> Packet {
    signed_request(
        Code::AccountingRequest,
        identifier,
        vec![
            Attribute::integer(AttributeType::AcctStatusType as u8, status).unwrap(),
            Attribute::string(AttributeType::AcctSessionId as u8, session_id).unwrap(),
        ],
        SECRET,
    )
}

fn coa_request(code: Code, identifier: u8) -> Packet {
    signed_request(
        code,
        identifier,
        vec![Attribute::string(AttributeType::AcctSessionId as u8, "test-session-123").unwrap()],
        SECRET,
    )
}

/// Send a request and wait for the response; `None` on timeout
async fn exchange(packet: &Packet, server_addr: SocketAddr) -> Option<Packet> {
    let socket = UdpSocket::bind("127.0.0.1:0").await.expect("Failed to bind client");
    let bytes = packet.encode().expect("Failed to encode request");
    socket.send_to(&bytes, server_addr).await.expect("Failed to send request");

    let mut buf = [0u8; 4096];
    let (len, _) = timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
        .await
        .ok()?
        .expect("Failed to receive response");

    let response = Packet::decode(&buf[..len]).expect("Failed to decode response");
    assert!(
        verify_response_authenticator(&response, &packet.authenticator, SECRET),
        "response authenticator does not verify"
    );
    Some(response)
}

#[tokio::test]
async fn test_access_accept() {
    let gateway = Gateway::start().await;

    let request = access_request("testusername", "testpassword", 1);
    let response = exchange(&request, gateway.addr(Listener::Access))
        .await
        .expect("No response");

    assert_eq!(response.code, Code::AccessAccept);
    assert_eq!(response.identifier, 1);

    let entries = gateway.audit_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].code, "Access-Accept");
    assert_eq!(entries[0].username, "testusername");
}

#[tokio::test]
async fn test_access_reject_wrong_password() {
    let gateway = Gateway::start().await;

    let request = access_request("testusername", "wrong", 2);
    let response = exchange(&request, gateway.addr(Listener::Access))
        .await
        .expect("No response");

    assert_eq!(response.code, Code::AccessReject);
    assert_eq!(response.identifier, 2);
    assert_eq!(gateway.audit_entries()[0].code, "Access-Reject");
}

#[tokio::test]
async fn test_access_reject_unknown_user() {
    let gateway = Gateway::start().await;

    let request = access_request("someoneelse", "testpassword", 3);
    let response = exchange(&request, gateway.addr(Listener::Access))
        .await
        .expect("No response");

    assert_eq!(response.code, Code::AccessReject);
}

#[tokio::test]
async fn test_accounting_lifecycle() {
    let gateway = Gateway::start().await;
    let addr = gateway.addr(Listener::Accounting);

    let statuses = [
        AcctStatusType::Start.as_u32(),
        AcctStatusType::InterimUpdate.as_u32(),
        AcctStatusType::Stop.as_u32(),
        250,
    ];
    for (i, status) in statuses.into_iter().enumerate() {
        let request = accounting_request(status, "s1", i as u8);
        let response = exchange(&request, addr).await.expect("No response");
        assert_eq!(response.code, Code::AccountingResponse);
        assert_eq!(response.identifier, i as u8);
    }

    let entries = gateway.audit_entries();
    assert_eq!(entries.len(), 4);
    let labels: Vec<_> = entries.iter().filter_map(|e| e.status_type.as_deref()).collect();
    assert_eq!(labels, ["Start", "Interim-Update", "Stop", "Unknown"]);
    assert!(entries.iter().all(|e| e.session_id.as_deref() == Some("s1")));
    assert!(entries.iter().all(|e| e.code == "Accounting-Response"));
}

#[tokio::test]
async fn test_coa_and_disconnect() {
    let gateway = Gateway::start().await;
    let addr = gateway.addr(Listener::Coa);

    let response = exchange(&coa_request(Code::CoaRequest, 10), addr)
        .await
        .expect("No response");
    assert_eq!(response.code, Code::CoaAck);

    let response = exchange(&coa_request(Code::DisconnectRequest, 11), addr)
        .await
        .expect("No response");
    assert_eq!(response.code, Code::DisconnectAck);

    let entries = gateway.audit_entries();
    assert_eq!(entries.len(), 2);
    let json: Vec<serde_json::Value> = fs::read_to_string(&gateway.audit_path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(json[0]["handler"], "coa");
    assert_eq!(json[0]["code"], "CoA-ACK");
    assert_eq!(json[1]["handler"], "coa/disconnect");
    assert_eq!(json[1]["code"], "Disconnect-ACK");
}

#[tokio::test]
async fn test_wrong_secret_is_dropped() {
    let gateway = Gateway::start().await;

    let request = signed_request(
        Code::AccountingRequest,
        20,
        vec![Attribute::integer(AttributeType::AcctStatusType as u8, 1).unwrap()],
        b"not-the-secret",
    );
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket
        .send_to(&request.encode().unwrap(), gateway.addr(Listener::Accounting))
        .await
        .unwrap();

    let mut buf = [0u8; 4096];
    let received = timeout(Duration::from_millis(500), socket.recv_from(&mut buf)).await;
    assert!(received.is_err(), "forged request was answered");
    assert!(gateway.audit_entries().is_empty());
}

#[tokio::test]
async fn test_per_listener_secret() {
    let gateway = Gateway::start_with(|config| {
        config.coa_secret = Some("coa-secret".to_string());
    })
    .await;

    // The shared secret no longer validates on the CoA port
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket
        .send_to(
            &coa_request(Code::CoaRequest, 30).encode().unwrap(),
            gateway.addr(Listener::Coa),
        )
        .await
        .unwrap();
    let mut buf = [0u8; 4096];
    assert!(
        timeout(Duration::from_millis(500), socket.recv_from(&mut buf))
            .await
            .is_err()
    );

    // ...but still does on the access port
    let response = exchange(
        &access_request("testusername", "testpassword", 31),
        gateway.addr(Listener::Access),
    )
    .await
    .expect("No response");
    assert_eq!(response.code, Code::AccessAccept);
}

#[tokio::test]
async fn test_concurrent_clients_one_entry_each() {
    let gateway = Arc::new(Gateway::start().await);
    const CLIENTS: usize = 40;

    let tasks: Vec<_> = (0..CLIENTS)
        .map(|i| {
            let gateway = Arc::clone(&gateway);
            tokio::spawn(async move {
                let (request, listener, expected) = match i % 3 {
                    0 => (
                        access_request("testusername", "testpassword", i as u8),
                        Listener::Access,
                        Code::AccessAccept,
                    ),
                    1 => (
                        accounting_request(1, &format!("session-{}", i), i as u8),
                        Listener::Accounting,
                        Code::AccountingResponse,
                    ),
                    _ => (
                        coa_request(Code::DisconnectRequest, i as u8),
                        Listener::Coa,
                        Code::DisconnectAck,
                    ),
                };
                let response = exchange(&request, gateway.addr(listener))
                    .await
                    .expect("No response");
                assert_eq!(response.code, expected);
            })
        })
        .collect();

    for task in tasks {
        task.await.expect("Client task panicked");
    }

    let entries = gateway.audit_entries();
    assert_eq!(entries.len(), CLIENTS);
    let accounting = entries
        .iter()
        .filter(|e| e.code == "Accounting-Response")
        .count();
    assert_eq!(accounting, (0..CLIENTS).filter(|i| i % 3 == 1).count());
}
