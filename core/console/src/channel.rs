//! The live session channel.
//!
//! Owns exactly one WebSocket connection for the current session, classifies
//! inbound frames and forwards them over an mpsc channel to the operator
//! loop. Malformed frames are logged and dropped; unrecognized initiators
//! are ignored. Closure of any kind is terminal for the session — there is
//! no reconnect.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};
use url::Url;

use jointscope_core::error::{ConsoleError, Result};
use jointscope_protocol::{parse_push, PushMessage};

#[derive(Debug)]
pub enum ChannelEvent {
    Push(PushMessage),
    Disconnected { reason: String },
}

/// Connects and pumps the channel until it closes. The caller spawns this on
/// its runtime; the final `Disconnected` event is always delivered before
/// the task ends.
pub async fn run_channel(url: Url, tx: mpsc::Sender<ChannelEvent>) -> Result<()> {
    let (mut ws, _) = match connect_async(url.as_str()).await {
        Ok(connected) => connected,
        Err(err) => {
            let reason = format!("connect failed: {}", err);
            let _ = tx
                .send(ChannelEvent::Disconnected {
                    reason: reason.clone(),
                })
                .await;
            return Err(ConsoleError::ChannelConnect(reason));
        }
    };

    let reason = loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => match parse_push(&text) {
                Ok(Some(message)) => {
                    if tx.send(ChannelEvent::Push(message)).await.is_err() {
                        // Consumer is gone; the session is being torn down.
                        break "console shut down".to_string();
                    }
                }
                Ok(None) => {
                    debug!("Ignoring push from untracked initiator");
                }
                Err(err) => {
                    warn!(code = %err.code, message = %err.message, "Dropping malformed push frame");
                }
            },
            Some(Ok(Message::Close(frame))) => {
                break match frame {
                    Some(frame) => format!("closed by server: {}", frame.reason),
                    None => "closed by server".to_string(),
                };
            }
            Some(Ok(_)) => {}
            Some(Err(err)) => break format!("channel error: {}", err),
            None => break "connection lost".to_string(),
        }
    };

    let _ = ws.close(None).await;
    let _ = tx
        .send(ChannelEvent::Disconnected {
            reason: reason.clone(),
        })
        .await;
    Err(ConsoleError::ChannelClosed(reason))
}
