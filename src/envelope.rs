// Response model: every endpoint answers with the same JSON envelope,
// `{success, result}` on success or `{success: false, error, reason?}` on
// failure. The server is inconsistent about the shape of `error`, so
// decoding is lenient and all failure reasons go through one function.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const UNKNOWN_REASON: &str = "Unknown";
pub const TIMEOUT_REASON: &str = "Request timed out";

/// Decoded response envelope.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Envelope {
    /// Only a literal JSON `true` counts as success.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ErrorRepr>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reason: Option<String>,
}

/// The different ways the server reports an error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorRepr {
    /// Numeric code; the message lives in the envelope's `reason`.
    Code(i64),
    /// Structured error object.
    Detailed {
        #[serde(rename = "errorMessage", default, deserialize_with = "lenient_string")]
        error_message: Option<String>,
    },
    Other(Value),
}

/// A remote (or synthesized) failure with its human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub reason: String,
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

impl Envelope {
    /// Envelope reported when a request exceeds the client timeout.
    pub fn timed_out() -> Self {
        Envelope {
            success: false,
            result: None,
            error: Some(ErrorRepr::Code(1)),
            reason: Some(TIMEOUT_REASON.into()),
        }
    }

    /// Best-effort reason for a failed envelope.
    pub fn failure_reason(&self) -> String {
        match &self.error {
            Some(ErrorRepr::Code(_)) => self
                .reason
                .clone()
                .unwrap_or_else(|| UNKNOWN_REASON.into()),
            Some(ErrorRepr::Detailed {
                error_message: Some(message),
            }) => message.clone(),
            _ => UNKNOWN_REASON.into(),
        }
    }

    /// Split into the `result` payload or the failure reason.
    pub fn into_result(self) -> Result<Value, ApiFailure> {
        if self.success {
            Ok(self.result.unwrap_or(Value::Null))
        } else {
            Err(ApiFailure {
                reason: self.failure_reason(),
            })
        }
    }
}

/// `result` of a successful generate call.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedAlias {
    pub hme: String,
}

/// One alias as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasRecord {
    #[serde(default)]
    pub label: String,
    pub hme: String,
    /// Epoch milliseconds.
    pub create_timestamp: i64,
    pub is_active: bool,
}

/// `result` of a successful list call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasList {
    #[serde(default)]
    pub hme_emails: Vec<AliasRecord>,
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}
