use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::WireError;

/// Frames the client sends to the shared-state server. `Login` must be the
/// first frame on a fresh connection; record traffic is only valid once the
/// server has answered with `LoginOk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    Login {
        #[serde(default)]
        auth: Map<String, Value>,
    },
    /// Attach to a record. The server replies with one `RecordData` snapshot
    /// and pushes a `RecordPatch` for every subsequent field write.
    RecordSubscribe {
        record: String,
    },
    /// Whole-object write.
    RecordSet {
        record: String,
        data: Map<String, Value>,
    },
    /// Single-field write.
    RecordPatch {
        record: String,
        field: String,
        value: Value,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    LoginOk,
    LoginDenied {
        reason: String,
    },
    /// Initial snapshot of a subscribed record; marks the record ready.
    RecordData {
        record: String,
        data: Map<String, Value>,
    },
    RecordPatch {
        record: String,
        field: String,
        value: Value,
    },
    Error(WireError),
}
