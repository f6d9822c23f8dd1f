//! Typed human responses and the lenient parser that produces them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const ACCEPT_WORDS: &[&str] = &[
    "accept", "accepted", "approve", "approved", "yes", "y", "ok", "lgtm", "publish", "schedule",
];
const IGNORE_WORDS: &[&str] = &["ignore", "no", "n", "skip", "cancel", "reject", "stop"];

/// Arguments of a `respond` response. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ResponseArgs {
    /// Requested schedule change, if any.
    pub fn schedule_change(&self) -> Option<&str> {
        non_empty(&self.schedule_date).or_else(|| non_empty(&self.date))
    }

    /// Replacement text or rewrite instructions, if any.
    pub fn content_change(&self) -> Option<&str> {
        non_empty(&self.post)
            .or_else(|| non_empty(&self.content))
            .or_else(|| non_empty(&self.text))
            .or_else(|| non_empty(&self.feedback))
    }
}

/// Reviewer decision injected into state on resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "args", rename_all = "lowercase")]
pub enum HumanResponse {
    Accept,
    Edit { feedback: String },
    Ignore,
    Respond(ResponseArgs),
    /// Nothing usable could be read from the response.
    Unclassified,
}

impl HumanResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            HumanResponse::Accept => "accept",
            HumanResponse::Edit { .. } => "edit",
            HumanResponse::Ignore => "ignore",
            HumanResponse::Respond(_) => "respond",
            HumanResponse::Unclassified => "unclassified",
        }
    }
}

/// `{type, args}` objects with one of the four known kinds.
fn parse_typed(value: &Value) -> Option<HumanResponse> {
    let obj = value.as_object()?;
    let kind = obj.get("type")?.as_str()?.trim().to_ascii_lowercase();
    let args = obj.get("args");
    match kind.as_str() {
        "accept" => Some(HumanResponse::Accept),
        "ignore" => Some(HumanResponse::Ignore),
        "edit" => {
            let feedback = match args {
                Some(Value::String(s)) => s.trim().to_string(),
                Some(Value::Object(map)) => map
                    .get("feedback")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .trim()
                    .to_string(),
                _ => String::new(),
            };
            if feedback.is_empty() {
                Some(HumanResponse::Unclassified)
            } else {
                Some(HumanResponse::Edit { feedback })
            }
        }
        "respond" => {
            let args = match args {
                Some(Value::String(s)) => ResponseArgs {
                    feedback: Some(s.clone()),
                    ..ResponseArgs::default()
                },
                Some(v @ Value::Object(_)) => serde_json::from_value(v.clone()).unwrap_or_default(),
                _ => ResponseArgs::default(),
            };
            Some(HumanResponse::Respond(args))
        }
        _ => None,
    }
}

fn parse_keyword(s: &str) -> Option<HumanResponse> {
    let word = s.trim().trim_end_matches(['.', '!']).to_ascii_lowercase();
    if ACCEPT_WORDS.contains(&word.as_str()) {
        Some(HumanResponse::Accept)
    } else if IGNORE_WORDS.contains(&word.as_str()) {
        Some(HumanResponse::Ignore)
    } else {
        None
    }
}

/// Reads a reviewer response of any shape. Never fails.
///
/// Order: a single-element array is unwrapped; then a typed object; a keyword string; a
/// string holding a typed JSON object; any other non-empty string as edit feedback; an
/// object with a `feedback`, `message` or `text` field as edit feedback; otherwise
/// [`HumanResponse::Unclassified`].
pub fn parse_response(value: &Value) -> HumanResponse {
    let value = match value {
        Value::Array(items) if items.len() == 1 => &items[0],
        other => other,
    };
    if let Some(typed) = parse_typed(value) {
        return typed;
    }
    match value {
        Value::String(s) => {
            if let Some(r) = parse_keyword(s) {
                return r;
            }
            let trimmed = s.trim();
            if trimmed.starts_with('{') {
                if let Some(typed) = serde_json::from_str::<Value>(trimmed)
                    .ok()
                    .as_ref()
                    .and_then(parse_typed)
                {
                    return typed;
                }
            }
            if trimmed.is_empty() {
                HumanResponse::Unclassified
            } else {
                HumanResponse::Edit {
                    feedback: trimmed.to_string(),
                }
            }
        }
        Value::Object(map) => ["feedback", "message", "text"]
            .iter()
            .filter_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(|s| HumanResponse::Edit {
                feedback: s.to_string(),
            })
            .unwrap_or(HumanResponse::Unclassified),
        _ => HumanResponse::Unclassified,
    }
}

/// Parses CLI or inbox text: JSON when it is JSON, otherwise a plain string.
pub fn parse_response_text(text: &str) -> HumanResponse {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => parse_response(&value),
        Err(_) => parse_response(&Value::String(text.to_string())),
    }
}
