/*!
Response inspection: the success marker check plus best-effort typed extraction.

A response passes when its body carries the literal `"status": "success"` or, for
compact serializers, when it parses as a JSON object whose top-level `status` is
`"success"`. Extraction helpers never turn a passing response into a failure; they
return None when the payload does not have the expected shape.
*/

use serde_json::Value;

use super::types::{Boxer, LeaderboardEntry};

pub const SUCCESS_MARKER: &str = r#""status": "success""#;

pub fn has_success_marker(body: &str) -> bool {
    if body.contains(SUCCESS_MARKER) {
        return true;
    }
    matches!(
        serde_json::from_str::<Value>(body),
        Ok(Value::Object(ref map)) if map.get("status").and_then(Value::as_str) == Some("success")
    )
}

/// Pretty-print a JSON body; non-JSON bodies are returned unchanged.
pub fn pretty_json(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| body.to_string())
}

/// Collapse a body to one short line for failure messages.
pub fn summarize_body(body: &str) -> String {
    const MAX: usize = 200;
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        return "(empty body)".to_string();
    }
    if flat.chars().count() > MAX {
        let cut: String = flat.chars().take(MAX).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

/// Raw HTTP outcome of one API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        has_success_marker(&self.body)
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    pub fn pretty(&self) -> String {
        pretty_json(&self.body)
    }

    /// Id of a newly created boxer: the first integer among `boxer_id`, `id` and `boxer.id`.
    pub fn created_id(&self) -> Option<i64> {
        let v = self.json()?;
        ["boxer_id", "id"]
            .iter()
            .find_map(|key| v.get(*key).and_then(Value::as_i64))
            .or_else(|| v.get("boxer").and_then(|b| b.get("id")).and_then(Value::as_i64))
    }

    /// Boxer payload under `boxer`.
    pub fn boxer(&self) -> Option<Boxer> {
        let v = self.json()?;
        serde_json::from_value(v.get("boxer")?.clone()).ok()
    }

    /// Ring occupants under `boxers`.
    pub fn ring(&self) -> Option<Vec<Boxer>> {
        let v = self.json()?;
        serde_json::from_value(v.get("boxers")?.clone()).ok()
    }

    /// Winner name under `winner`, either a plain string or a boxer object.
    pub fn winner(&self) -> Option<String> {
        let v = self.json()?;
        match v.get("winner")? {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }

    pub fn leaderboard(&self) -> Option<Vec<LeaderboardEntry>> {
        let v = self.json()?;
        serde_json::from_value(v.get("leaderboard")?.clone()).ok()
    }
}
