use crate::protocol::{self, ClientMessage, ServerMessage};
use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

type GameSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
  Connecting,
  /// Socket is open but `gameInit` has not arrived.
  Initializing,
  Active,
  Disconnected,
  Reconnecting,
}

impl ConnectionState {
  pub fn accepts_gameplay(self) -> bool {
    self == ConnectionState::Active
  }

  pub fn on_open(self) -> Self {
    match self {
      ConnectionState::Connecting | ConnectionState::Reconnecting => ConnectionState::Initializing,
      other => other,
    }
  }

  pub fn on_message(self, message: &ServerMessage) -> Self {
    match (self, message) {
      (ConnectionState::Initializing, ServerMessage::GameInit { .. }) => ConnectionState::Active,
      (state, _) => state,
    }
  }

  pub fn on_close(self) -> Self {
    ConnectionState::Disconnected
  }

  /// A new attempt always starts from scratch as a new player.
  pub fn on_retry(self) -> Self {
    match self {
      ConnectionState::Disconnected => ConnectionState::Reconnecting,
      other => other,
    }
  }
}

/// Appends the optional profile token and requested name to the game URL.
pub fn game_url(base: &str, token: Option<&str>, name: Option<&str>) -> anyhow::Result<String> {
  let mut url = Url::parse(base).with_context(|| format!("invalid game url {base}"))?;
  if token.is_some() || name.is_some() {
    let mut query = url.query_pairs_mut();
    if let Some(token) = token {
      query.append_pair("token", token);
    }
    if let Some(name) = name {
      query.append_pair("name", name);
    }
  }
  Ok(url.into())
}

pub struct GameConnection {
  socket: GameSocket,
  state: ConnectionState,
}

impl GameConnection {
  pub async fn open(url: &str, timeout: Duration, state: ConnectionState) -> anyhow::Result<Self> {
    let (socket, _) = tokio::time::timeout(timeout, tokio_tungstenite::connect_async(url))
      .await
      .with_context(|| format!("timed out connecting to {url}"))?
      .with_context(|| format!("failed to connect to {url}"))?;
    tracing::info!(url, "connected");
    Ok(Self {
      socket,
      state: state.on_open(),
    })
  }

  pub fn state(&self) -> ConnectionState {
    self.state
  }

  /// Fire and forget. Failures are logged and the caller keeps simulating.
  pub async fn send(&mut self, message: &ClientMessage) {
    if !self.state.accepts_gameplay() {
      tracing::debug!(event = message.event_name(), state = ?self.state, "not active, dropping event");
      return;
    }
    let Some(payload) = protocol::encode(message) else { return };
    if let Err(error) = self.socket.send(Message::Text(payload)).await {
      tracing::warn!(event = message.event_name(), %error, "send failed");
    }
  }

  /// Next decodable server event, or `None` once the socket is gone.
  pub async fn next_message(&mut self) -> Option<ServerMessage> {
    while let Some(result) = self.socket.next().await {
      let message = match result {
        Ok(message) => message,
        Err(error) => {
          tracing::warn!(%error, "socket read failed");
          break;
        }
      };
      match message {
        Message::Text(text) => {
          let Some(decoded) = protocol::decode_server_message(&text) else {
            tracing::debug!("dropping undecodable server frame");
            continue;
          };
          self.state = self.state.on_message(&decoded);
          return Some(decoded);
        }
        Message::Close(_) => break,
        _ => {}
      }
    }
    self.state = self.state.on_close();
    None
  }

  pub async fn close(mut self) {
    if let Err(error) = self.socket.close(None).await {
      tracing::debug!(%error, "close handshake failed");
    }
  }
}
