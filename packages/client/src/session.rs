//! WebSocket client session.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use hiroba_server::domain::Message;
use hiroba_shared::time::Clock;
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as WsMessage};

use crate::{error::ClientError, formatter::MessageFormatter, ui::redisplay_prompt};

/// Build the outbound message for one line of input.
///
/// Returns `None` for blank lines.
pub fn compose_message(username: &str, line: &str, clock: &dyn Clock) -> Option<Message> {
    let text = line.trim();
    if text.is_empty() {
        return None;
    }
    Some(Message::new(username, text, clock.now()))
}

/// Run one client session until the server closes, the connection breaks,
/// or the user ends input (Ctrl+C / Ctrl+D).
pub async fn run_client_session(
    url: &str,
    username: &str,
    clock: Arc<dyn Clock>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url).await.map_err(|e| ClientError::Dial {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    tracing::info!("connected to {}", url);
    println!(
        "\nYou are '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
        username
    );

    let (mut write, mut read) = ws_stream.split();

    // Spawn a task to handle incoming messages
    let username_for_read = username.to_string();
    let mut read_task = tokio::spawn(async move {
        while let Some(frame) = read.next().await {
            match frame {
                Ok(WsMessage::Text(text)) => {
                    let formatted = match Message::from_json(text.as_str()) {
                        Ok(message) => {
                            tracing::debug!("received message: {:?}", message);
                            MessageFormatter::format_chat_message(&message, &username_for_read)
                        }
                        Err(_) => MessageFormatter::format_raw_message(text.as_str()),
                    };
                    print!("{}", formatted);
                    redisplay_prompt(&username_for_read);
                }
                Ok(WsMessage::Binary(data)) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt(&username_for_read);
                }
                Ok(WsMessage::Close(_)) => {
                    tracing::info!("server closed the stream");
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("failed to receive message: {}", e);
                    return Err(ClientError::ConnectionLost(e.to_string()));
                }
            }
        }
        Ok(())
    });

    // rustyline is synchronous, so it gets its own thread
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let prompt = format!("{}> ", username);
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str()).ok();
                    if input_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    tracing::info!("input closed");
                    break;
                }
                Err(e) => {
                    tracing::error!("readline error: {}", e);
                    break;
                }
            }
        }
    });

    // Spawn a task to send input lines to the server
    let username_for_write = username.to_string();
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let Some(message) = compose_message(&username_for_write, &line, clock.as_ref()) else {
                continue;
            };
            let json = match message.to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("failed to encode message: {}", e);
                    continue;
                }
            };
            if let Err(e) = write.send(WsMessage::text(json)).await {
                tracing::error!("failed to send message: {}", e);
                return Err(ClientError::ConnectionLost(e.to_string()));
            }
        }
        // User ended input: close the stream so the server sees end of input.
        write.close().await.ok();
        Ok(())
    });

    // If any one of the tasks completes, abort the other
    let result = tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            read_result
        }
        write_result = &mut write_task => {
            read_task.abort();
            write_result
        }
    };

    result.map_err(|e| ClientError::ConnectionLost(e.to_string()))?
}
