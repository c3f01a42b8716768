// Structured extraction: the LLM used as an unreliable JSON parser.
//
// Whatever goes wrong here — disabled client, transport failure, prose
// instead of JSON, a JSON array instead of an object — the answer is the
// empty patch. A failed extraction must never fail the chat turn.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::client::LlmClient;
use super::prompt;

/// Ask the model to extract event fields from `message`, given the current
/// draft state. Returns a JSON object patch; `{}` when nothing was found or
/// anything failed.
pub async fn extract_event(
    client: &LlmClient,
    max_tokens: u32,
    message: &str,
    current_event: &Value,
) -> Value {
    let user_prompt = prompt::build_extraction_prompt(current_event, message);

    let raw = match client
        .complete(&prompt::extraction_system_prompt(), &user_prompt, max_tokens)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            warn!("extraction call failed: {e:#}");
            return empty_patch();
        }
    };

    debug!(raw, "raw extraction output");
    parse_extraction(&raw)
}

/// The do-nothing patch.
pub fn empty_patch() -> Value {
    Value::Object(Map::new())
}

/// Parse raw model output into a JSON object patch.
///
/// Models occasionally wrap output in markdown fences despite instructions,
/// so those are stripped before parsing. Anything that is not a JSON object
/// collapses to the empty patch.
pub fn parse_extraction(raw: &str) -> Value {
    let cleaned = strip_code_fences(raw);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            warn!("extraction output was not a JSON object: {other}");
            empty_patch()
        }
        Err(e) => {
            warn!("failed to parse extraction output: {e}");
            empty_patch()
        }
    }
}

fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let mut lines: Vec<&str> = trimmed.lines().collect();
    if let Some(first) = lines.first() {
        if first.trim_start().starts_with("```") {
            lines.remove(0);
        }
    }
    if let Some(last) = lines.last() {
        if last.trim_start().starts_with("```") {
            lines.pop();
        }
    }
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_object_parses() {
        let patch = parse_extraction(r#"{"name": "Jazz Night", "date": "2027-06-01"}"#);
        assert_eq!(patch, json!({ "name": "Jazz Night", "date": "2027-06-01" }));
    }

    #[test]
    fn empty_object_parses_to_empty_patch() {
        assert_eq!(parse_extraction("{}"), empty_patch());
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let patch = parse_extraction("\n  {\"name\": \"Expo\"}  \n");
        assert_eq!(patch, json!({ "name": "Expo" }));
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = "```json\n{\"name\": \"Expo\"}\n```";
        assert_eq!(parse_extraction(raw), json!({ "name": "Expo" }));
    }

    #[test]
    fn bare_fences_are_unwrapped() {
        let raw = "```\n{\"date\": \"2027-03-14\"}\n```";
        assert_eq!(parse_extraction(raw), json!({ "date": "2027-03-14" }));
    }

    #[test]
    fn prose_collapses_to_empty_patch() {
        assert_eq!(
            parse_extraction("Sure! Here is the JSON you asked for."),
            empty_patch()
        );
    }

    #[test]
    fn truncated_json_collapses_to_empty_patch() {
        assert_eq!(parse_extraction(r#"{"name": "Jazz"#), empty_patch());
    }

    #[test]
    fn top_level_array_collapses_to_empty_patch() {
        assert_eq!(parse_extraction(r#"[{"name": "Expo"}]"#), empty_patch());
    }

    #[test]
    fn top_level_scalar_collapses_to_empty_patch() {
        assert_eq!(parse_extraction("42"), empty_patch());
        assert_eq!(parse_extraction("\"just a string\""), empty_patch());
        assert_eq!(parse_extraction("null"), empty_patch());
    }

    #[tokio::test]
    async fn disabled_client_yields_empty_patch() {
        let client = LlmClient::Disabled;
        let patch = extract_event(&client, 100, "a jazz concert", &json!({})).await;
        assert_eq!(patch, empty_patch());
    }

    #[test]
    fn nested_extraction_survives_parsing() {
        let raw = r#"{
            "venue": { "address": "Via Roma 1", "city": "Torino" },
            "tickets": [{ "name": "Standard", "price": 25, "currency": "EUR" }]
        }"#;
        let patch = parse_extraction(raw);
        assert_eq!(patch["venue"]["city"], "Torino");
        assert_eq!(patch["tickets"][0]["price"], 25);
    }
}
