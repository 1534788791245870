//! Connection registry and message relay for the exchange chat.

pub mod audit;
pub mod command;
pub mod names;

use anyhow::Result;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::core::rates::{ExchangeRateProvider, fetch_range};
use audit::AuditLog;
use command::{ExchangeCommand, format_rates};
use names::NameGenerator;

pub type ConnectionId = u64;

/// Outbound half of a client's socket. Drained by the connection's writer task.
pub type ConnectionSender = mpsc::UnboundedSender<String>;

/// A registered client: its transport handle paired with the display name it
/// was given at registration.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    name: String,
    remote_addr: SocketAddr,
    outbound: ConnectionSender,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }
}

pub struct Hub {
    clients: Mutex<HashMap<ConnectionId, Connection>>,
    next_id: AtomicU64,
    provider: Arc<dyn ExchangeRateProvider>,
    audit_log: AuditLog,
    names: Box<dyn NameGenerator>,
}

impl Hub {
    pub fn new(
        provider: Arc<dyn ExchangeRateProvider>,
        audit_log: AuditLog,
        names: Box<dyn NameGenerator>,
    ) -> Self {
        Hub {
            clients: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            provider,
            audit_log,
            names,
        }
    }

    pub async fn register(&self, remote_addr: SocketAddr, outbound: ConnectionSender) -> Connection {
        let connection = Connection {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name: self.names.generate(),
            remote_addr,
            outbound,
        };

        self.clients
            .lock()
            .await
            .insert(connection.id, connection.clone());
        info!(peer = %remote_addr, name = %connection.name, "client connects");

        connection
    }

    /// Removes the connection from the client set. Returns `false` if it was
    /// already gone.
    pub async fn unregister(&self, connection: &Connection) -> bool {
        let removed = self.clients.lock().await.remove(&connection.id).is_some();
        if removed {
            info!(peer = %connection.remote_addr, name = %connection.name, "client disconnects");
        } else {
            warn!(peer = %connection.remote_addr, "client was not registered");
        }
        removed
    }

    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Sends `message` to every client registered at the time of the call.
    pub async fn broadcast(&self, message: &str) {
        let clients = self.clients.lock().await;
        for client in clients.values() {
            if client.outbound.send(message.to_string()).is_err() {
                debug!(name = %client.name, "outbound channel closed, skipping");
            }
        }
    }

    /// Relays one inbound line from `sender`: either as chat or, for the
    /// exchange command, as a rates report.
    pub async fn handle_message(&self, sender: &Connection, line: &str) {
        let Some(command) = ExchangeCommand::parse(line) else {
            self.broadcast(&format!("{}: {}", sender.name, line)).await;
            return;
        };

        if let Err(e) = self.run_exchange(sender, &command, line).await {
            warn!(name = %sender.name, error = %e, "exchange command failed");
            self.broadcast(&format!("Error: {e}")).await;
        }
    }

    async fn run_exchange(
        &self,
        sender: &Connection,
        command: &ExchangeCommand,
        line: &str,
    ) -> Result<()> {
        debug!(name = %sender.name, ?command, "Running exchange command");
        let rates = fetch_range(self.provider.as_ref(), command.days, &command.currencies).await;

        self.broadcast(&format!("{}:\n{}\n", sender.name, format_rates(&rates)))
            .await;
        self.audit_log.append(&sender.name, line).await
    }
}
