//! The three UDP listeners and their supervision

use crate::audit::AuditLogger;
use crate::config::{Config, ConfigError};
use crate::credentials::CredentialStore;
use crate::handlers::{AccessHandler, AccountingHandler, CoaHandler};
use crate::server::{Handler, PacketServer, ServerError};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    Access,
    Accounting,
    Coa,
}

impl Listener {
    pub const ALL: [Listener; 3] = [Listener::Access, Listener::Accounting, Listener::Coa];

    pub fn name(self) -> &'static str {
        match self {
            Listener::Access => "access",
            Listener::Accounting => "accounting",
            Listener::Coa => "coa",
        }
    }

    /// IANA ports: RFC 2865, RFC 2866, RFC 5176
    pub fn default_port(self) -> u16 {
        match self {
            Listener::Access => 1812,
            Listener::Accounting => 1813,
            Listener::Coa => 3799,
        }
    }
}

/// All three packet servers, bound and ready to run
pub struct ListenerSet {
    servers: Vec<(Listener, PacketServer)>,
}

impl ListenerSet {
    /// Bind every listener.
    ///
    /// Either all three sockets are bound or an error is returned; there is
    /// no partially running gateway.
    pub async fn bind(
        config: &Config,
        credentials: Arc<dyn CredentialStore>,
        audit: Arc<AuditLogger>,
    ) -> Result<Self, ServerError> {
        let mut servers = Vec::with_capacity(Listener::ALL.len());

        for listener in Listener::ALL {
            let handler: Arc<dyn Handler> = match listener {
                Listener::Access => Arc::new(AccessHandler::new(
                    Arc::clone(&credentials),
                    Arc::clone(&audit),
                )),
                Listener::Accounting => Arc::new(AccountingHandler::new(Arc::clone(&audit))),
                Listener::Coa => Arc::new(CoaHandler::new(Arc::clone(&audit))),
            };

            let addr = config.socket_addr(listener).map_err(invalid_config)?;
            let secrets = config.secret_source(listener).map_err(invalid_config)?;

            let server =
                PacketServer::bind(listener.name(), addr, handler, Arc::new(secrets)).await?;
            servers.push((listener, server));
        }

        Ok(ListenerSet { servers })
    }

    pub fn local_addr(&self, listener: Listener) -> Option<SocketAddr> {
        self.servers
            .iter()
            .find(|(l, _)| *l == listener)
            .and_then(|(_, server)| server.local_addr().ok())
    }

    /// Run every listener until one of them stops.
    ///
    /// A receive loop only ends on a socket error, which is returned; the
    /// remaining listeners are aborted when the set is dropped.
    pub async fn run(self) -> Result<(), ServerError> {
        let mut tasks = JoinSet::new();

        for (listener, server) in self.servers {
            info!(
                listener = listener.name(),
                addr = %server.local_addr()?,
                "Listener running"
            );
            tasks.spawn(async move { (listener, server.run().await) });
        }

        match tasks.join_next().await {
            Some(Ok((listener, Err(e)))) => {
                error!(listener = listener.name(), "Listener failed: {}", e);
                Err(e)
            }
            Some(Ok((listener, Ok(())))) => Err(ServerError::ListenerStopped {
                listener: listener.name(),
                reason: "receive loop exited".to_string(),
            }),
            Some(Err(e)) => Err(ServerError::ListenerStopped {
                listener: "unknown",
                reason: e.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn invalid_config(e: ConfigError) -> ServerError {
    ServerError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentials;

    fn loopback_config() -> Config {
        Config {
            listen_address: "127.0.0.1".to_string(),
            access_port: 0,
            accounting_port: 0,
            coa_port: 0,
            audit_log_path: None,
            ..Config::default()
        }
    }

    #[test]
    fn test_default_ports() {
        let ports: Vec<u16> = Listener::ALL.iter().map(|l| l.default_port()).collect();
        assert_eq!(ports, [1812, 1813, 3799]);
    }

    #[tokio::test]
    async fn test_bind_assigns_distinct_ports() {
        let set = ListenerSet::bind(
            &loopback_config(),
            Arc::new(StaticCredentials::new()),
            Arc::new(AuditLogger::disabled()),
        )
        .await
        .unwrap();

        let addrs: Vec<SocketAddr> = Listener::ALL
            .iter()
            .map(|l| set.local_addr(*l).unwrap())
            .collect();
        assert_ne!(addrs[0].port(), addrs[1].port());
        assert_ne!(addrs[1].port(), addrs[2].port());
        assert_ne!(addrs[0].port(), addrs[2].port());
    }

    #[tokio::test]
    async fn test_bind_failure_is_fatal() {
        let occupied = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let mut config = loopback_config();
        config.coa_port = occupied.local_addr().unwrap().port();

        let result = ListenerSet::bind(
            &config,
            Arc::new(StaticCredentials::new()),
            Arc::new(AuditLogger::disabled()),
        )
        .await;

        match result {
            Err(ServerError::Bind { listener, .. }) => assert_eq!(listener, "coa"),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("bind on an occupied port succeeded"),
        }
    }
}
