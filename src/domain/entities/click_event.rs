//! Click event produced per successful redirect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded click, both the stream wire format and the store row.
///
/// Serialized as JSON under the stream entry's `data` field:
///
/// ```json
/// {"code":"abc12345","ts":"2025-01-01T12:34:56Z","ip_hash":"…","ua_hash":"…",
///  "referer":"…","req_id":"…"}
/// ```
///
/// IP and User-Agent are stored as truncated SHA-256 fingerprints, never raw.
/// An event may outlive its link; deleting a link does not touch past clicks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub code: String,
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    pub ip_hash: String,
    pub ua_hash: String,
    #[serde(default)]
    pub referer: String,
    #[serde(rename = "req_id", default)]
    pub request_id: String,
}
