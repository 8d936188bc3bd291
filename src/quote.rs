//! Quote entries and decoding of the provider payload.
//!
//! The upstream API sometimes emits escapes that are not valid JSON
//! (`\'` and friends), so every backslash is removed from the raw text
//! before it reaches the decoder.

use serde_json::Value;

use crate::error::FetchError;

pub const GREETING_QUOTE: &str = "Hello World";
pub const GREETING_AUTHOR: &str = "You";

pub const MISSING_TEXT_QUOTE: &str = "\"Something went wrong :/\"";
pub const DECODE_FAILURE_QUOTE: &str = "Something went wrong! Try again.";
pub const OFFLINE_QUOTE: &str = "\"It seems that you are not connected to the internet!\"";
pub const APP_AUTHOR: &str = "This App";
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A quote that made it into history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteEntry {
    pub text: String,
    pub author: String,
}

/// Fields extracted from one provider response.
///
/// `author` is `None` when the payload carried no `quoteAuthor` string;
/// the caller keeps whatever author it was already showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuote {
    pub text: String,
    pub author: Option<String>,
}

/// Line used both for the clipboard and for narration.
pub fn format_line(quote: &str, author: &str) -> String {
    format!("{quote} - {author}\n")
}

pub fn strip_backslashes(raw: &str) -> String {
    raw.replace('\\', "")
}

/// Decode a raw provider body into display-ready fields.
pub fn parse_body(body: &[u8]) -> Result<ParsedQuote, FetchError> {
    let raw = std::str::from_utf8(body).map_err(|_| FetchError::NotText)?;
    let sanitized = strip_backslashes(raw);

    let json: Value =
        serde_json::from_str(&sanitized).map_err(|e| FetchError::Decode(e.to_string()))?;

    // Only containers count as a payload; a bare scalar is a decode failure.
    if !(json.is_object() || json.is_array()) {
        return Err(FetchError::Decode(format!("unexpected top-level value: {json}")));
    }

    let text = match json.get("quoteText").and_then(Value::as_str) {
        Some(text) => format!("\"{}\"", strip_backslashes(text.trim())),
        None => MISSING_TEXT_QUOTE.to_string(),
    };

    let author = json.get("quoteAuthor").and_then(Value::as_str).map(|author| {
        let author = author.trim();
        if author.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            author.to_string()
        }
    });

    Ok(ParsedQuote { text, author })
}
