// Wire envelope between chat clients and the application loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::event::status::PublicationStatus;

/// One incoming chat message. `session_id` is optional: omitting it starts a
/// new session, and the response carries the id to use from then on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

/// The full reply for one chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub agent_message: String,
    pub event_preview: Value,
    pub rag_context: Vec<String>,
    pub publication_status: PublicationStatus,
}

/// Error envelope for malformed requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// One chat turn in flight between the transport task and the application
/// loop, with a oneshot channel for the reply.
#[derive(Debug)]
pub struct ChatEvent {
    pub request: ChatRequest,
    pub reply: oneshot::Sender<ChatResponse>,
}
