//! Websocket transport in front of the [`Hub`].

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use std::{future::Future, net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::mpsc};
use tracing::{debug, info, warn};

use crate::hub::Hub;

pub struct ChatServer {
    listener: TcpListener,
    hub: Arc<Hub>,
}

impl ChatServer {
    pub async fn bind(host: &str, port: u16, hub: Arc<Hub>) -> Result<Self> {
        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind {host}:{port}"))?;
        Ok(Self::new(listener, hub))
    }

    pub fn new(listener: TcpListener, hub: Arc<Hub>) -> Self {
        Self { listener, hub }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ChatServer { listener, hub } = self;
        info!(addr = ?listener.local_addr().ok(), "chat server listening");

        let app = Router::new()
            .route("/", get(upgrade))
            .with_state(hub);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .context("Chat server failed")?;

        info!("chat server stopped");
        Ok(())
    }

    pub async fn run_until_ctrl_c(self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}

async fn upgrade(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(hub): State<Arc<Hub>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, peer, hub))
}

async fn handle_socket(socket: WebSocket, peer: SocketAddr, hub: Arc<Hub>) {
    let (mut sink, mut stream) = socket.split();
    let (outbound, mut inbox) = mpsc::unbounded_channel::<String>();

    let connection = hub.register(peer, outbound).await;

    let writer = tokio::spawn(async move {
        while let Some(text) = inbox.recv().await {
            if let Err(err) = sink.send(Message::Text(text)).await {
                debug!(peer = %peer, error = %err, "socket write failed");
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => hub.handle_message(&connection, &text).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(peer = %peer, error = %err, "socket read failed");
                break;
            }
        }
    }

    hub.unregister(&connection).await;

    // The writer ends once every sender for this connection is gone.
    drop(connection);
    if let Err(err) = writer.await {
        warn!(peer = %peer, error = %err, "writer task failed");
    }
}
