// Prompt templates for structured event extraction.
//
// The model is used as a parser, not a conversationalist: the prompt embeds
// the current draft state and the new user message, and demands raw JSON
// back. The reference format below is the contract the merge layer expects.

use serde_json::Value;

/// Reference shape shown to the model. Kept as a literal so the prompt reads
/// exactly like the JSON the extractor must produce.
const REFERENCE_FORMAT: &str = r#"{
  "name": "string",
  "date": "YYYY-MM-DD",
  "venue": {
    "address": "string",
    "city": "string"
  },
  "tickets": [
    {
      "name": "string",
      "price": 0,
      "currency": "EUR"
    }
  ]
}"#;

/// Static system prompt for extraction calls.
pub fn extraction_system_prompt() -> String {
    "You are an automated parser for events in a ticketing system.\n\
     \n\
     ABSOLUTE RULES:\n\
     - Respond ONLY with valid JSON\n\
     - Do NOT write any text before or after the JSON\n\
     - Do NOT use markdown\n\
     - Do NOT explain anything\n\
     - Your output is fed directly to a JSON parser"
        .to_string()
}

/// Build the extraction prompt for one user message.
///
/// Includes the current draft so the model can resolve references like
/// "make the VIP ticket 50 instead" against what is already known.
pub fn build_extraction_prompt(current_event: &Value, message: &str) -> String {
    let current = serde_json::to_string(current_event)
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        "Current event state (JSON):\n\
         {current}\n\
         \n\
         User message:\n\
         \"{message}\"\n\
         \n\
         Reference JSON format:\n\
         {REFERENCE_FORMAT}\n\
         \n\
         Instructions:\n\
         - Extract ONLY the fields present in the message\n\
         - Do not invent anything\n\
         - Prices as numbers\n\
         - Currency is always EUR\n\
         - If you find nothing useful, return {{}}\n\
         \n\
         JSON:"
    )
}
