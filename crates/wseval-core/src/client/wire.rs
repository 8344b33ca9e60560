//! JSON text frames exchanged with the model endpoint.

use crate::intent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct WireRequest<'a> {
    pub message: &'a str,
}

/// Unknown fields are ignored; missing ones stay `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct WireResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
}

impl WireResponse {
    /// Answer text, or the tagged intent label in intent mode (tag replaces the answer).
    pub fn into_text(self, output_intent: bool) -> String {
        if output_intent {
            intent::wrap(self.intent.as_deref().unwrap_or_default())
        } else {
            self.message.unwrap_or_default()
        }
    }
}

pub fn encode_request(prompt: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&WireRequest { message: prompt })
}

pub fn decode_response(frame: &str) -> Result<WireResponse, serde_json::Error> {
    serde_json::from_str(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_single_message_object() {
        let frame = encode_request("Quel est mon solde ?").unwrap();
        let v: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(v, serde_json::json!({"message": "Quel est mon solde ?"}));
    }

    #[test]
    fn response_tolerates_unknown_and_missing_fields() {
        let r = decode_response(r#"{"message":"hi","sources":[1,2]}"#).unwrap();
        assert_eq!(r.message.as_deref(), Some("hi"));
        assert_eq!(r.intent, None);

        let empty = decode_response("{}").unwrap();
        assert_eq!(empty.clone().into_text(false), "");
        assert_eq!(empty.into_text(true), "<intention></intention>");
    }

    #[test]
    fn intent_mode_replaces_answer() {
        let r = decode_response(r#"{"message":"x","intent":"pii"}"#).unwrap();
        assert_eq!(r.into_text(true), "<intention>pii</intention>");
    }

    #[test]
    fn non_object_frame_is_malformed() {
        assert!(decode_response("not json").is_err());
        assert!(decode_response(r#""just a string""#).is_err());
    }
}
