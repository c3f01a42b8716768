// Typed event record. Session drafts live as raw JSON objects (the shape the
// extractor produces); this module is the bridge into the typed world where
// validation, questions, and rendering operate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft does not match the event schema: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("ticket `{name}` has non-positive price {price}")]
    TicketPrice { name: String, price: f64 },
}

/// A ticket type with its price. Currency defaults to EUR, which is the only
/// currency the extractor is instructed to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub name: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl Venue {
    pub fn has_address(&self) -> bool {
        is_present(&self.address)
    }

    pub fn has_city(&self) -> bool {
        is_present(&self.city)
    }
}

/// The event record under construction. Every field is optional; the draft
/// starts empty and fills in as the user answers questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(default)]
    pub name: Option<String>,
    /// Expected format: YYYY-MM-DD.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub venue: Option<Venue>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
}

impl EventDraft {
    /// Decode a JSON draft into the typed record.
    ///
    /// Unknown keys are ignored, so stray fields invented by the extractor
    /// don't reject an otherwise usable patch. A ticket with a non-positive
    /// price is a decode error: committed drafts must never carry one.
    pub fn from_value(value: &Value) -> Result<Self, DraftError> {
        let draft: EventDraft = serde_json::from_value(value.clone())?;
        for ticket in &draft.tickets {
            if ticket.price <= 0.0 {
                return Err(DraftError::TicketPrice {
                    name: ticket.name.clone(),
                    price: ticket.price,
                });
            }
        }
        Ok(draft)
    }

    /// A field counts as present only when it is set and non-blank.
    pub fn has_name(&self) -> bool {
        is_present(&self.name)
    }

    pub fn has_date(&self) -> bool {
        is_present(&self.date)
    }

    pub fn has_tickets(&self) -> bool {
        !self.tickets.is_empty()
    }
}

fn is_present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}
