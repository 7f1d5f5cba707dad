use clap::Parser;
use radius_gateway::{AuditLogger, Config, ConfigError, Listener, ListenerSet};
use std::io::ErrorKind;
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// RADIUS AAA Gateway - Access, Accounting and CoA/Disconnect listeners
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "radius-gateway")]
struct Cli {
    /// Path to configuration file
    #[arg(value_name = "CONFIG", default_value = "config.json")]
    config_path: String,

    /// Validate configuration and exit (doesn't start the listeners)
    #[arg(short, long)]
    validate: bool,
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn print_summary(config: &Config) {
    println!("✓ Configuration validated successfully!");
    println!();
    println!("Configuration summary:");
    for listener in Listener::ALL {
        println!(
            "  {:<10} {}:{}",
            listener.name(),
            config.listen_address,
            config.port(listener)
        );
    }
    println!("  Clients: {}", config.clients.len());
    println!("  Users: {}", config.users.len());
    println!("  Log level: {}", config.log_level.as_deref().unwrap_or("info"));
    match config.audit_log_path {
        Some(ref path) => println!("  Audit log: {}", path.display()),
        None => println!("  Audit log: disabled"),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config_path) {
        Ok(cfg) => cfg,
        Err(ConfigError::Io(e)) if e.kind() == ErrorKind::NotFound && !cli.validate => {
            init_tracing("info");
            warn!("Could not find config file: {}", cli.config_path);
            info!("Creating example configuration at: {}", cli.config_path);

            if let Err(e) = Config::example().to_file(&cli.config_path) {
                error!("Error creating example config: {}", e);
                process::exit(1);
            }

            info!("Please edit {} and restart the gateway", cli.config_path);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("❌ Configuration error in {}: {}", cli.config_path, e);
            process::exit(1);
        }
    };

    if cli.validate {
        print_summary(&config);
        process::exit(0);
    }

    init_tracing(config.log_level.as_deref().unwrap_or("info"));

    info!("RADIUS AAA Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from: {}", cli.config_path);

    let credentials = config.credentials();
    info!(users = credentials.len(), "Credential store loaded");

    if config.clients.is_empty() {
        warn!("No clients configured: requests from any address are answered");
    }

    let audit = match AuditLogger::new(config.audit_log_path.clone()) {
        Ok(logger) => Arc::new(logger),
        Err(e) => {
            error!("Failed to open audit log: {}", e);
            process::exit(1);
        }
    };
    match audit.file_path() {
        Some(path) => info!("Audit logging enabled: {}", path.display()),
        None => warn!("Audit logging disabled"),
    }

    let listeners = match ListenerSet::bind(&config, Arc::new(credentials), Arc::clone(&audit)).await {
        Ok(set) => set,
        Err(e) => {
            error!("Failed to start listeners: {}", e);
            process::exit(1);
        }
    };

    info!("Gateway started, press Ctrl+C to stop");

    let result = tokio::select! {
        result = listeners.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    };

    audit.flush().await;

    if let Err(e) = result {
        error!("Gateway error: {}", e);
        process::exit(1);
    }
}
