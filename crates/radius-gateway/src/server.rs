//! UDP packet server
//!
//! A [`PacketServer`] owns one UDP socket. For every datagram it decodes the
//! packet, resolves the shared secret for the sender, checks the request
//! authenticator, invokes its [`Handler`] and sends back the signed response.
//! Anything that fails before the handler runs is dropped without a reply, as
//! RFC 2865 requires for packets that cannot be validated.

use async_trait::async_trait;
use ipnetwork::IpNetwork;
use radius_proto::auth::{
    calculate_response_authenticator, decrypt_user_password, verify_request_authenticator,
};
use radius_proto::{AttributeType, Code, Packet, PacketError};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to bind {listener} listener on {addr}: {source}")]
    Bind {
        listener: &'static str,
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Packet error: {0}")]
    Packet(#[from] PacketError),
    #[error("Unexpected packet code: {0}")]
    UnexpectedCode(Code),
    #[error("No shared secret for client {0}")]
    UnknownClient(SocketAddr),
    #[error("Invalid request authenticator")]
    InvalidAuthenticator,
    #[error("{listener} listener stopped: {reason}")]
    ListenerStopped {
        listener: &'static str,
        reason: String,
    },
}

/// A decoded inbound request, valid for the duration of one handler call
#[derive(Debug, Clone)]
pub struct Request {
    packet: Packet,
    remote_addr: SocketAddr,
    secret: Vec<u8>,
}

impl Request {
    pub fn new(packet: Packet, remote_addr: SocketAddr, secret: impl Into<Vec<u8>>) -> Self {
        Request {
            packet,
            remote_addr,
            secret: secret.into(),
        }
    }

    pub fn code(&self) -> Code {
        self.packet.code
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// User-Name, or an empty string when absent
    pub fn username(&self) -> String {
        self.packet
            .string_attribute(AttributeType::UserName)
            .unwrap_or_default()
    }

    /// Cleartext User-Password, or `None` when absent or not recoverable
    pub fn password(&self) -> Option<String> {
        let attr = self
            .packet
            .find_attribute(AttributeType::UserPassword.as_u8())?;
        decrypt_user_password(&attr.value, &self.secret, &self.packet.authenticator).ok()
    }

    /// Acct-Session-Id, or an empty string when absent
    pub fn session_id(&self) -> String {
        self.packet
            .string_attribute(AttributeType::AcctSessionId)
            .unwrap_or_default()
    }

    /// Raw Acct-Status-Type value
    pub fn acct_status_type(&self) -> Option<u32> {
        self.packet.integer_attribute(AttributeType::AcctStatusType)
    }

    /// Build the signed wire response for a decision
    pub fn response(&self, decision: Decision) -> Result<Packet, ServerError> {
        let mut response = self.packet.reply(decision.code());
        response.authenticator = calculate_response_authenticator(
            &response,
            &self.packet.authenticator,
            &self.secret,
        )?;
        Ok(response)
    }
}

/// The outcome of a handler: which response code to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    code: Code,
}

impl Decision {
    pub fn new(code: Code) -> Self {
        Decision { code }
    }

    pub fn code(&self) -> Code {
        self.code
    }
}

/// Per-listener request handler.
///
/// Handlers are shared by every in-flight request on their listener and must
/// tolerate concurrent calls.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve(&self, request: &Request) -> Decision;
}

/// Resolves the shared secret for a client
pub trait SecretSource: Send + Sync {
    /// `None` means the client is unknown and its packets are dropped
    fn secret(&self, remote_addr: SocketAddr) -> Option<Vec<u8>>;
}

/// One secret for every client
#[derive(Debug, Clone)]
pub struct StaticSecretSource {
    secret: Vec<u8>,
}

impl StaticSecretSource {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        StaticSecretSource {
            secret: secret.into(),
        }
    }
}

impl SecretSource for StaticSecretSource {
    fn secret(&self, _remote_addr: SocketAddr) -> Option<Vec<u8>> {
        Some(self.secret.clone())
    }
}

/// Secrets keyed by client network, with an optional fallback.
///
/// The first network containing the client address wins.
#[derive(Debug, Clone, Default)]
pub struct ClientSecretSource {
    clients: Vec<(IpNetwork, Vec<u8>)>,
    fallback: Option<Vec<u8>>,
}

impl ClientSecretSource {
    pub fn new(fallback: Option<Vec<u8>>) -> Self {
        ClientSecretSource {
            clients: Vec::new(),
            fallback,
        }
    }

    pub fn add_client(&mut self, network: IpNetwork, secret: impl Into<Vec<u8>>) {
        self.clients.push((network, secret.into()));
    }
}

impl SecretSource for ClientSecretSource {
    fn secret(&self, remote_addr: SocketAddr) -> Option<Vec<u8>> {
        self.clients
            .iter()
            .find(|(network, _)| network.contains(remote_addr.ip()))
            .map(|(_, secret)| secret.clone())
            .or_else(|| self.fallback.clone())
    }
}

/// UDP server bound to one address and one handler
pub struct PacketServer {
    name: &'static str,
    socket: Arc<UdpSocket>,
    handler: Arc<dyn Handler>,
    secrets: Arc<dyn SecretSource>,
}

impl PacketServer {
    /// Bind the socket; failure here is fatal for the gateway
    pub async fn bind(
        name: &'static str,
        addr: SocketAddr,
        handler: Arc<dyn Handler>,
        secrets: Arc<dyn SecretSource>,
    ) -> Result<Self, ServerError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                listener: name,
                addr,
                source,
            })?;
        info!(listener = name, addr = %socket.local_addr()?, "RADIUS listener bound");

        Ok(PacketServer {
            name,
            socket: Arc::new(socket),
            handler,
            secrets,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Useful when bound to port 0
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.socket.local_addr().map_err(ServerError::from)
    }

    /// Receive loop; each datagram is handled in its own task
    pub async fn run(&self) -> Result<(), ServerError> {
        let mut buf = vec![0u8; Packet::MAX_PACKET_SIZE];

        loop {
            let (len, addr) = self.socket.recv_from(&mut buf).await?;
            let data = buf[..len].to_vec();

            let handler = Arc::clone(&self.handler);
            let secrets = Arc::clone(&self.secrets);
            let socket = Arc::clone(&self.socket);
            let name = self.name;

            tokio::spawn(async move {
                if let Err(e) =
                    Self::handle_datagram(&data, addr, handler.as_ref(), secrets.as_ref(), &socket)
                        .await
                {
                    debug!(listener = name, client_addr = %addr, "Dropped request: {}", e);
                }
            });
        }
    }

    async fn handle_datagram(
        data: &[u8],
        addr: SocketAddr,
        handler: &dyn Handler,
        secrets: &dyn SecretSource,
        socket: &UdpSocket,
    ) -> Result<(), ServerError> {
        let response = Self::process(data, addr, handler, secrets).await?;
        let response_data = response.encode()?;
        socket.send_to(&response_data, addr).await?;

        debug!(
            response_type = %response.code,
            client_addr = %addr,
            request_id = response.identifier,
            "Sent RADIUS response"
        );
        Ok(())
    }

    /// Turn one datagram into a signed response, without touching the socket
    pub async fn process(
        data: &[u8],
        addr: SocketAddr,
        handler: &dyn Handler,
        secrets: &dyn SecretSource,
    ) -> Result<Packet, ServerError> {
        let packet = Packet::decode(data)?;

        if !packet.code.is_request() {
            return Err(ServerError::UnexpectedCode(packet.code));
        }

        let secret = secrets
            .secret(addr)
            .ok_or(ServerError::UnknownClient(addr))?;

        if !verify_request_authenticator(&packet, &secret) {
            warn!(
                client_addr = %addr,
                request_id = packet.identifier,
                packet_type = %packet.code,
                "Rejected request with invalid authenticator"
            );
            return Err(ServerError::InvalidAuthenticator);
        }

        debug!(
            packet_type = %packet.code,
            client_addr = %addr,
            request_id = packet.identifier,
            "Received RADIUS packet"
        );

        let request = Request::new(packet, addr, secret);
        let decision = handler.serve(&request).await;
        request.response(decision)
    }
}
