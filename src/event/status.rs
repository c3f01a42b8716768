// Publication state: is the draft complete, broken, or ready to publish?

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::draft::EventDraft;
use super::validate::validate;

/// Publication readiness, in order of precedence: any missing field makes the
/// draft `Incomplete`; otherwise any broken rule makes it `Invalid`;
/// otherwise it is `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusKind {
    Incomplete,
    Invalid,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationStatus {
    pub status: StatusKind,
    pub missing_fields: Vec<String>,
    pub validation_errors: Vec<String>,
}

/// Compute the publication status of a draft.
///
/// Venue sub-fields are reported with dotted paths ("venue.address",
/// "venue.city"); a wholly absent venue reports just "venue".
pub fn publication_status(event: &EventDraft, today: NaiveDate) -> PublicationStatus {
    let mut missing_fields = Vec::new();

    if !event.has_name() {
        missing_fields.push("name".to_string());
    }

    if !event.has_date() {
        missing_fields.push("date".to_string());
    }

    match event.venue.as_ref() {
        None => missing_fields.push("venue".to_string()),
        Some(venue) => {
            if !venue.has_address() {
                missing_fields.push("venue.address".to_string());
            }
            if !venue.has_city() {
                missing_fields.push("venue.city".to_string());
            }
        }
    }

    if !event.has_tickets() {
        missing_fields.push("tickets".to_string());
    }

    let validation_errors = validate(event, today);

    let status = if !missing_fields.is_empty() {
        StatusKind::Incomplete
    } else if !validation_errors.is_empty() {
        StatusKind::Invalid
    } else {
        StatusKind::Ready
    };

    PublicationStatus {
        status,
        missing_fields,
        validation_errors,
    }
}
