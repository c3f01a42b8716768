// Application state and chat turn orchestration.
//
// The central loop consumes chat events from the transport, runs one turn at
// a time (retrieval, extraction, merge/validate/ask), and sends the response
// back through the event's oneshot channel. Processing turns sequentially is
// what keeps concurrent edits to one session out of the picture.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::event::draft::EventDraft;
use crate::event::merge::merge_values;
use crate::event::preview::{render_preview, render_preview_text};
use crate::event::questions::next_missing_question;
use crate::event::status::{publication_status, PublicationStatus, StatusKind};
use crate::llm::client::LlmClient;
use crate::llm::extract;
use crate::protocol::{ChatEvent, ChatRequest, ChatResponse};
use crate::rag::Retriever;
use crate::session::SessionStore;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// LLM client for extraction calls. Wrapped in Arc so callers can share
    /// it without re-reading credentials.
    pub llm_client: Arc<LlmClient>,
    pub retriever: Retriever,
}

impl AppState {
    pub fn new(config: Config, llm_client: LlmClient, retriever: Retriever) -> Self {
        AppState {
            config,
            sessions: SessionStore::new(),
            llm_client: Arc::new(llm_client),
            retriever,
        }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the application loop until the chat channel closes.
pub async fn run(mut chat_rx: mpsc::Receiver<ChatEvent>, mut state: AppState) -> anyhow::Result<()> {
    info!("application loop started");

    while let Some(event) = chat_rx.recv().await {
        let response = handle_chat_turn(&mut state, event.request).await;
        if event.reply.send(response).is_err() {
            warn!("chat client went away before the response was ready");
        }
    }

    info!("chat channel closed; application loop exiting");
    Ok(())
}

/// Process one chat turn end to end.
pub async fn handle_chat_turn(state: &mut AppState, request: ChatRequest) -> ChatResponse {
    let session_id = state.sessions.get_or_create(request.session_id.as_deref());
    info!(session_id, "processing chat turn");

    // Retrieval context (empty on failure or when disabled).
    let rag_context = state.retriever.search(&request.message).await;

    // Structured extraction against the current draft.
    let current = state
        .sessions
        .draft(&session_id)
        .cloned()
        .unwrap_or_else(extract::empty_patch);
    let patch = extract::extract_event(
        &state.llm_client,
        state.config.llm.extraction_max_tokens,
        &request.message,
        &current,
    )
    .await;

    let outcome = apply_extraction(&current, patch, Local::now().date_naive());

    if let Some(reason) = &outcome.patch_rejected {
        warn!(session_id, reason, "extraction patch rejected");
    }

    if let Some(draft) = state.sessions.draft_mut(&session_id) {
        *draft = outcome.draft;
    }

    ChatResponse {
        session_id,
        agent_message: outcome.agent_message,
        event_preview: outcome.preview,
        rag_context,
        publication_status: outcome.status,
    }
}

// ---------------------------------------------------------------------------
// The merge/validate/ask core
// ---------------------------------------------------------------------------

/// Everything one turn decides about the draft.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The draft to commit back into the session.
    pub draft: Value,
    /// The typed view of the committed draft.
    pub event: EventDraft,
    pub preview: Value,
    pub status: PublicationStatus,
    pub agent_message: String,
    /// Set when the extraction patch produced an undecodable record and was
    /// discarded.
    pub patch_rejected: Option<String>,
}

/// Merge an extraction patch into the draft and decide the turn's outcome.
///
/// The patch is merged into a candidate copy first; the candidate is
/// committed only if it still decodes into an [`EventDraft`]. A patch that
/// would poison the draft (wrong types, non-positive ticket prices) is
/// discarded wholesale and the previous draft stands. Committed drafts
/// therefore always decode, which is what makes the fallback below safe.
///
/// The agent message is chosen deterministically from the committed draft:
/// the next missing question if any field is absent, an explanation when the
/// draft is complete but breaks a rule, and a publishable summary otherwise.
pub fn apply_extraction(current: &Value, patch: Value, today: NaiveDate) -> TurnOutcome {
    let mut candidate = current.clone();
    merge_values(&mut candidate, patch);

    let (draft, event, patch_rejected) = match EventDraft::from_value(&candidate) {
        Ok(event) => (candidate, event, None),
        Err(e) => {
            let event = EventDraft::from_value(current).unwrap_or_default();
            (current.clone(), event, Some(e.to_string()))
        }
    };

    let status = publication_status(&event, today);
    let preview = render_preview(&event);
    let agent_message = agent_message_for(&event, &status);

    TurnOutcome {
        draft,
        event,
        preview,
        status,
        agent_message,
        patch_rejected,
    }
}

fn agent_message_for(event: &EventDraft, status: &PublicationStatus) -> String {
    if let Some(question) = next_missing_question(event) {
        return question.to_string();
    }

    if status.status == StatusKind::Invalid {
        return format!(
            "The event can't be published yet: {}.",
            status.validation_errors.join("; ")
        );
    }

    format!(
        "The event is ready to publish!\n\n\
         Final summary:\n\n\
         {}\n\n\
         Would you like to publish it?",
        render_preview_text(event)
    )
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
