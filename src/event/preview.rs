// Preview rendering: a structured shape for API consumers and a readable
// text summary for the chat transcript.

use serde_json::{json, Value};

use super::draft::EventDraft;

/// Structured preview for UI / API consumers. Absent fields render as null
/// so the client always sees the same shape.
pub fn render_preview(event: &EventDraft) -> Value {
    let tickets: Vec<Value> = event
        .tickets
        .iter()
        .map(|t| {
            json!({
                "label": t.name,
                "price": format!("{:.2} {}", t.price, t.currency),
            })
        })
        .collect();

    json!({
        "title": event.name,
        "date": event.date,
        "location": {
            "address": event.venue.as_ref().and_then(|v| v.address.clone()),
            "city": event.venue.as_ref().and_then(|v| v.city.clone()),
        },
        "tickets": tickets,
    })
}

/// Multi-line text summary of the draft, omitting absent fields.
pub fn render_preview_text(event: &EventDraft) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "**{}**",
        event.name.as_deref().unwrap_or("(untitled event)")
    ));

    if event.has_date() {
        if let Some(date) = event.date.as_deref() {
            lines.push(format!("Date: {date}"));
        }
    }

    if let Some(venue) = event.venue.as_ref() {
        let parts: Vec<&str> = [venue.address.as_deref(), venue.city.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect();
        if !parts.is_empty() {
            lines.push(format!("Location: {}", parts.join(", ")));
        }
    }

    if !event.tickets.is_empty() {
        lines.push("Tickets:".to_string());
        for ticket in &event.tickets {
            lines.push(format!(
                "  - {}: {:.2} {}",
                ticket.name, ticket.price, ticket.currency
            ));
        }
    }

    lines.join("\n")
}
