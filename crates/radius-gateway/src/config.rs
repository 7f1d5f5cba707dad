use crate::credentials::StaticCredentials;
use crate::listeners::Listener;
use crate::server::ClientSecretSource;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Credential entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

/// RADIUS client (NAS) with its own shared secret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Client IP address or network (supports CIDR notation)
    pub address: String,
    pub secret: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Client {
    pub fn parse_network(&self) -> Result<IpNetwork, ConfigError> {
        if let Ok(network) = self.address.parse::<IpNetwork>() {
            return Ok(network);
        }

        if let Ok(ip) = self.address.parse::<IpAddr>() {
            return Ok(IpNetwork::from(ip));
        }

        Err(ConfigError::Invalid(format!(
            "Invalid client address: {}",
            self.address
        )))
    }
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address all three listeners bind to
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    #[serde(default = "default_access_port")]
    pub access_port: u16,

    #[serde(default = "default_accounting_port")]
    pub accounting_port: u16,

    #[serde(default = "default_coa_port")]
    pub coa_port: u16,

    /// Shared secret used by every listener unless overridden
    #[serde(default = "default_secret")]
    pub secret: String,

    #[serde(default)]
    pub access_secret: Option<String>,

    #[serde(default)]
    pub accounting_secret: Option<String>,

    #[serde(default)]
    pub coa_secret: Option<String>,

    /// Known clients. When non-empty, packets from any other address are dropped.
    #[serde(default)]
    pub clients: Vec<Client>,

    #[serde(default = "default_users")]
    pub users: Vec<User>,

    /// JSON Lines audit log; `null` disables auditing
    #[serde(default = "default_audit_log_path")]
    pub audit_log_path: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error" (default: "info")
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_listen_address() -> String {
    "0.0.0.0".to_string()
}

fn default_access_port() -> u16 {
    Listener::Access.default_port()
}

fn default_accounting_port() -> u16 {
    Listener::Accounting.default_port()
}

fn default_coa_port() -> u16 {
    Listener::Coa.default_port()
}

fn default_secret() -> String {
    "mysharedsecret".to_string()
}

fn default_users() -> Vec<User> {
    vec![User {
        username: "testusername".to_string(),
        password: "testpassword".to_string(),
    }]
}

fn default_audit_log_path() -> Option<PathBuf> {
    Some(PathBuf::from("radius.log.json"))
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_address: default_listen_address(),
            access_port: default_access_port(),
            accounting_port: default_accounting_port(),
            coa_port: default_coa_port(),
            secret: default_secret(),
            access_secret: None,
            accounting_secret: None,
            coa_secret: None,
            clients: vec![],
            users: default_users(),
            audit_log_path: default_audit_log_path(),
            log_level: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn port(&self, listener: Listener) -> u16 {
        match listener {
            Listener::Access => self.access_port,
            Listener::Accounting => self.accounting_port,
            Listener::Coa => self.coa_port,
        }
    }

    pub fn socket_addr(&self, listener: Listener) -> Result<SocketAddr, ConfigError> {
        let addr: IpAddr = self.listen_address.parse().map_err(|_| {
            ConfigError::Invalid(format!("Invalid IP address: {}", self.listen_address))
        })?;
        Ok(SocketAddr::new(addr, self.port(listener)))
    }

    /// Listener-specific secret, falling back to the shared one
    pub fn secret_for(&self, listener: Listener) -> &str {
        let specific = match listener {
            Listener::Access => self.access_secret.as_deref(),
            Listener::Accounting => self.accounting_secret.as_deref(),
            Listener::Coa => self.coa_secret.as_deref(),
        };
        specific.unwrap_or(&self.secret)
    }

    /// Secret source for one listener.
    ///
    /// Enabled clients match first. The listener secret only applies to
    /// unlisted addresses while no clients are configured.
    pub fn secret_source(&self, listener: Listener) -> Result<ClientSecretSource, ConfigError> {
        let fallback = self
            .clients
            .is_empty()
            .then(|| self.secret_for(listener).as_bytes().to_vec());

        let mut source = ClientSecretSource::new(fallback);
        for client in self.clients.iter().filter(|c| c.enabled) {
            source.add_client(client.parse_network()?, client.secret.as_bytes());
        }
        Ok(source)
    }

    pub fn credentials(&self) -> StaticCredentials {
        self.users
            .iter()
            .map(|u| (u.username.clone(), u.password.clone()))
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let _: IpAddr = self.listen_address.parse().map_err(|_| {
            ConfigError::Invalid(format!("Invalid listen address: {}", self.listen_address))
        })?;

        let mut ports = HashSet::new();
        for listener in Listener::ALL {
            let port = self.port(listener);
            if port != 0 && !ports.insert(port) {
                return Err(ConfigError::Invalid(format!(
                    "Port {} is used by more than one listener",
                    port
                )));
            }
            if self.secret_for(listener).is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Secret for the {} listener cannot be empty",
                    listener.name()
                )));
            }
        }

        for client in &self.clients {
            if client.secret.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Client {} has empty secret",
                    client.address
                )));
            }
            client.parse_network()?;
        }

        if self.users.iter().any(|u| u.username.is_empty()) {
            return Err(ConfigError::Invalid("User has empty username".to_string()));
        }

        Ok(())
    }

    /// Configuration written out when no config file exists yet
    pub fn example() -> Self {
        Config {
            log_level: Some("info".to_string()),
            ..Config::default()
        }
    }
}
