use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the outbound question request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into() }
    }
}

/// A successful answer as handed to the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    /// Source identifiers (usually URLs or document paths), in service order.
    pub sources: Vec<String>,
}

impl Answer {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), sources: Vec::new() }
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Decode a raw response body.
    ///
    /// The service answers with `{"answer": "...", "sources": [...]}` where
    /// `sources` is optional and each entry is either a plain string or an
    /// object carrying a `source` field.  `keep_sources = false` drops the
    /// list entirely.
    pub fn from_payload(body: &[u8], keep_sources: bool) -> Result<Self, DispatchError> {
        let payload: Value = serde_json::from_slice(body)
            .map_err(|e| DispatchError::new(format!("response is not JSON: {e}")))?;

        let text = payload
            .get("answer")
            .and_then(Value::as_str)
            .ok_or_else(|| DispatchError::new("response has no string `answer` field"))?;
        if text.trim().is_empty() {
            return Err(DispatchError::new("response `answer` is empty"));
        }

        let sources = if keep_sources {
            payload
                .get("sources")
                .and_then(Value::as_array)
                .map(|list| list.iter().filter_map(source_label).collect())
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(Self { text: text.to_string(), sources })
    }
}

fn source_label(entry: &Value) -> Option<String> {
    match entry {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => match map.get("source") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => Some(entry.to_string()),
            Some(other) => Some(other.to_string()),
        },
        other => Some(other.to_string()),
    }
}

/// The single failure category of a dispatch.
///
/// `detail` is for logs only; the session never shows it to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("query dispatch failed: {detail}")]
pub struct DispatchError {
    pub detail: String,
}

impl DispatchError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(format!("transport: {e}"))
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
