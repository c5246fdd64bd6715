//! JSON control-plane messages exchanged with the channel server.
//!
//! Control traffic rides the socket as text frames; voice audio is raw
//! binary and never passes through this module.

use serde::{Deserialize, Serialize};

/// One entry in the channel roster.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OnlineUser {
    pub callsign: String,
}

/// Server → client control message, tagged by `type`.
///
/// Known types: `system:talking`, `system:over`, `system:join`,
/// `system:out`, `online:list`, `ptt-denied`, `ptt-already`, `error`.
/// Unknown types are forwarded to the UI untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub callsign: Option<String>,
    pub reason: Option<String>,
    pub users: Option<Vec<OnlineUser>>,
    pub error: Option<String>,
}

/// Audio parameters declared in the hello message so the server knows what
/// the binary frames contain.
#[derive(Debug, Serialize)]
pub struct AudioParams {
    pub format: String,
    pub sample_rate: u32,
    pub channels: u8,
    pub frame_duration: u32,
}

/// Hello message sent once per connection, before any voice traffic.
#[derive(Debug, Serialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub version: u8,
    pub transport: String,
    pub callsign: String,
    pub audio_params: AudioParams,
}

impl HelloMessage {
    pub fn new(callsign: &str, sample_rate: u32, frame_duration_ms: u32) -> Self {
        Self {
            msg_type: "hello".to_string(),
            version: 1,
            transport: "websocket".to_string(),
            callsign: callsign.to_string(),
            audio_params: AudioParams {
                format: "pcm16".to_string(),
                sample_rate,
                channels: 1,
                frame_duration: frame_duration_ms,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_talking_message() {
        let msg: ServerMessage =
            serde_json::from_str(r#"{"type":"system:talking","callsign":"BRAVO-02"}"#).unwrap();
        assert_eq!(msg.msg_type, "system:talking");
        assert_eq!(msg.callsign.as_deref(), Some("BRAVO-02"));
        assert!(msg.reason.is_none());
    }

    #[test]
    fn parses_ptt_denied_with_reason() {
        let msg: ServerMessage =
            serde_json::from_str(r#"{"type":"ptt-denied","reason":"CHANNEL BUSY"}"#).unwrap();
        assert_eq!(msg.msg_type, "ptt-denied");
        assert_eq!(msg.reason.as_deref(), Some("CHANNEL BUSY"));
    }

    #[test]
    fn parses_online_list() {
        let msg: ServerMessage = serde_json::from_str(
            r#"{"type":"online:list","users":[{"callsign":"ALPHA-01"},{"callsign":"BRAVO-02"}]}"#,
        )
        .unwrap();
        let users = msg.users.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].callsign, "BRAVO-02");
    }

    #[test]
    fn hello_declares_pcm16_mono() {
        let hello = HelloMessage::new("OSCAR-01", 16000, 128);
        let json = serde_json::to_string(&hello).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "hello");
        assert_eq!(value["audio_params"]["format"], "pcm16");
        assert_eq!(value["audio_params"]["sample_rate"], 16000);
        assert_eq!(value["audio_params"]["channels"], 1);
    }
}
