// WebSocket chat transport.
//
// Each text frame carries one `ChatRequest` JSON document; the reply frame is
// the serialized `ChatResponse`, or an `{"error": ...}` envelope when the
// request never made it to the application loop. The transport stays thin:
// everything stateful happens in the app loop.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{info, warn};

use crate::protocol::{ChatEvent, ChatRequest, ErrorResponse};

/// Run the chat server on a pre-bound listener, forwarding each request
/// through `tx` to the application loop. Accepts any number of concurrent
/// connections; the app loop serializes the actual turns.
///
/// Taking a `TcpListener` (rather than a port) lets tests bind port 0.
pub async fn run(listener: TcpListener, tx: mpsc::Sender<ChatEvent>) -> anyhow::Result<()> {
    let local_addr = listener.local_addr()?;
    info!("chat server listening on {local_addr}");

    loop {
        let (stream, addr) = listener.accept().await?;
        let addr_str = addr.to_string();
        info!("accepted TCP connection from {addr_str}");

        let ws_stream = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                warn!("WebSocket handshake failed for {addr_str}: {e}");
                continue;
            }
        };

        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(ws_stream, &tx, &addr_str).await {
                warn!("connection {addr_str} ended with error: {e}");
            }
        });
    }
}

/// Serve one WebSocket connection: read a frame, dispatch it, write the
/// reply, repeat until the client closes or errors.
///
/// Generic over the stream type so it can be driven by in-memory streams in
/// tests without opening TCP ports.
pub async fn handle_connection<S>(
    ws_stream: WebSocketStream<S>,
    tx: &mpsc::Sender<ChatEvent>,
    addr: &str,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut write, mut read) = ws_stream.split();

    while let Some(msg_result) = read.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                let response = dispatch_request(text.to_string(), tx).await;
                write.send(Message::Text(response.into())).await?;
            }
            Ok(Message::Close(_)) => {
                info!("client {addr} sent close frame");
                break;
            }
            Err(e) => {
                warn!("WebSocket error from {addr}: {e}");
                break;
            }
            _ => {
                // Ignore Binary, Ping, Pong, Frame variants.
            }
        }
    }

    Ok(())
}

/// Parse one raw request payload, hand it to the application loop, and wait
/// for the reply. Malformed payloads and a gone app loop both produce an
/// error envelope instead of tearing down the connection.
pub async fn dispatch_request(payload: String, tx: &mpsc::Sender<ChatEvent>) -> String {
    let request: ChatRequest = match serde_json::from_str(&payload) {
        Ok(request) => request,
        Err(e) => return error_response(&format!("invalid chat request: {e}")),
    };

    let (reply_tx, reply_rx) = oneshot::channel();
    let event = ChatEvent {
        request,
        reply: reply_tx,
    };

    if tx.send(event).await.is_err() {
        return error_response("service is shutting down");
    }

    match reply_rx.await {
        Ok(response) => serde_json::to_string(&response)
            .unwrap_or_else(|e| error_response(&format!("failed to encode response: {e}"))),
        Err(_) => error_response("the request was dropped before a response was ready"),
    }
}

pub fn error_response(message: &str) -> String {
    serde_json::to_string(&ErrorResponse {
        error: message.to_string(),
    })
    .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string())
}
