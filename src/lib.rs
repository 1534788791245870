pub mod cli;
pub mod core;
pub mod hub;
pub mod providers;
pub mod server;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::rates::RatesArgs;
use crate::core::config::AppConfig;
use crate::hub::{Hub, audit::AuditLog, names::RandomNameGenerator};
use crate::providers::PrivatBankProvider;
use crate::server::ChatServer;

pub enum AppCommand {
    /// Run the chat server; `None` keeps the configured value.
    Serve {
        host: Option<String>,
        port: Option<u16>,
    },
    Rates(RatesArgs),
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = Arc::new(PrivatBankProvider::new(config.privatbank_base_url()));

    match command {
        AppCommand::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            info!("fxchat starting on {host}:{port}...");

            let hub = Arc::new(Hub::new(
                provider,
                AuditLog::new(config.audit_log_path()),
                Box::new(RandomNameGenerator),
            ));
            ChatServer::bind(&host, port, hub)
                .await?
                .run_until_ctrl_c()
                .await
        }
        AppCommand::Rates(args) => cli::rates::run(provider.as_ref(), &args).await,
    }
}
