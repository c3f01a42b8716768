// Business-rule validation for an event draft.

use chrono::NaiveDate;

use super::draft::EventDraft;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Check the draft against publication rules. Returns one message per broken
/// rule; an empty vec means the draft passes.
///
/// `today` is injected so validation stays a pure function of its inputs.
pub fn validate(event: &EventDraft, today: NaiveDate) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(date) = event.date.as_deref().filter(|d| !d.trim().is_empty()) {
        match NaiveDate::parse_from_str(date, DATE_FORMAT) {
            Ok(parsed) if parsed < today => {
                errors.push("event date is in the past".to_string());
            }
            Ok(_) => {}
            Err(_) => errors.push("invalid date format".to_string()),
        }
    }

    if event.tickets.is_empty() {
        errors.push("no ticket types defined".to_string());
    }

    errors
}
