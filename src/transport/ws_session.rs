use crate::game::room::Room;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Binds one socket to one player for the lifetime of the connection.
pub async fn handle_socket(socket: WebSocket, room: Arc<Room>, display_name: String) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let session_id = room.add_session(tx, display_name).await;

    let writer_session = session_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if let Err(error) = sender.send(Message::Text(payload)).await {
                tracing::warn!(session_id = %writer_session, %error, "socket write failed");
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        let Ok(message) = result else { break };
        match message {
            Message::Text(text) => {
                room.handle_text_message(&session_id, &text).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    room.remove_session(&session_id).await;
    send_task.abort();
}
