use crate::models::ServerMessage;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

const KNOWN_TYPES: [&str; 4] = ["networkStats", "newBlock", "newTransaction", "transactionConfirmed"];

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

// Decodes a push frame. Unknown types and undecodable frames are ignored
pub fn parse_message(text: &str) -> Option<ServerMessage> {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Ignoring malformed frame: {}", e);
            return None;
        }
    };
    if !KNOWN_TYPES.contains(&envelope.kind.as_str()) {
        debug!("Ignoring frame of unknown type {}", envelope.kind);
        return None;
    }
    let kind = envelope.kind.clone();
    match serde_json::from_value(serde_json::json!({ "type": envelope.kind, "data": envelope.data })) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!("Ignoring {} frame: {}", kind, e);
            None
        }
    }
}
