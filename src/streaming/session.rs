use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket};
use futures::SinkExt;
use tracing::{debug, error, info, warn};

use crate::error::PipelineError;
use crate::frame::{admit, Admission};
use crate::labels::Label;
use crate::pipeline::InferencePipeline;

/// Why a session's receive loop stopped.
#[derive(Debug)]
enum SessionEnd {
    /// The client sent a Close frame.
    ClientClosed(Option<u16>),
    /// The stream ended without a Close frame.
    Disconnected,
    Transport(axum::Error),
}

/// Run one text frame through admission and the pipeline.
///
/// `None` means nothing goes back to the client: the frame was skipped,
/// rejected or inference failed. Failures are logged here.
pub async fn handle_text(pipeline: &InferencePipeline, text: &str) -> Option<Label> {
    let set = match admit(text) {
        Admission::Accepted(set) => set,
        Admission::Skipped { count } => {
            debug!(count, "skipping frame without a full hand");
            return None;
        }
        Admission::Rejected(e) => {
            error!("{}", e);
            return None;
        }
    };

    // Inference is CPU-bound; keep it off the reactor so other sessions keep reading.
    let worker = pipeline.clone();
    let result = tokio::task::spawn_blocking(move || worker.predict(&set))
        .await
        .unwrap_or_else(|e| Err(PipelineError::Worker(e.to_string())));

    match result {
        Ok(label) => {
            debug!(%label, "prediction");
            Some(label)
        }
        Err(e) => {
            error!("Prediction error: {}", e);
            None
        }
    }
}

async fn receive_loop(socket: &mut WebSocket, pipeline: &InferencePipeline) -> SessionEnd {
    loop {
        let msg = match socket.recv().await {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => return SessionEnd::Transport(e),
            None => return SessionEnd::Disconnected,
        };

        match msg {
            Message::Text(text) => {
                if let Some(label) = handle_text(pipeline, &text).await {
                    if let Err(e) = socket.send(Message::Text(label.to_string())).await {
                        return SessionEnd::Transport(e);
                    }
                }
            }
            Message::Binary(data) => {
                warn!(bytes = data.len(), "ignoring binary frame, landmarks must be sent as text");
            }
            // Pongs are answered by the websocket layer.
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(frame) => return SessionEnd::ClientClosed(frame.map(|f| f.code)),
        }
    }
}

/// Drive one client connection until it goes away, then close it once.
pub async fn run_session(mut socket: WebSocket, pipeline: InferencePipeline, peer: SocketAddr) {
    info!(%peer, "WebSocket connection established");

    match receive_loop(&mut socket, &pipeline).await {
        SessionEnd::ClientClosed(code) => info!(%peer, ?code, "WebSocket closed by client"),
        SessionEnd::Disconnected => info!(%peer, "WebSocket disconnected"),
        SessionEnd::Transport(e) => error!(%peer, "WebSocket disconnected: {}", e),
    }

    // Fails harmlessly when the peer already completed the close handshake.
    if let Err(e) = SinkExt::close(&mut socket).await {
        debug!(%peer, "close after disconnect: {}", e);
    }
}
