use crate::bus::Message;
use crate::canvas::{Color, PaletteColor, Pixel};
use crate::economy::BudgetStatus;
use serde::{Deserialize, Serialize};

/// Client → Server message types
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    Join {
        identity: String,
    },
    Draw {
        x: i64,
        y: i64,
        color: String,
    },
    Chat {
        content: String,
        #[serde(default)]
        recipient: Option<String>,
    },
}

/// Server → Client event types
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// First event after a successful join
    Welcome(Welcome),
    CanvasSnapshot {
        width: u32,
        height: u32,
        pixels: Vec<Pixel>,
    },
    ChatHistory {
        messages: Vec<Message>,
    },
    PixelUpdate {
        x: i64,
        y: i64,
        color: Color,
    },
    ChatMessage(Message),
    #[serde(rename_all = "camelCase")]
    PresenceUpdate {
        online_users: Vec<String>,
    },
    BudgetUpdate(BudgetStatus),
    Error {
        code: String,
        message: String,
    },
}

/// Session parameters sent to a newly joined participant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    pub identity: String,
    pub width: u32,
    pub height: u32,
    pub palette: Vec<PaletteColor>,
    pub max_pixels: u32,
    pub regen_interval_ms: u64,
    pub cooldown_ms: u64,
}

impl ServerEvent {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ServerEvent::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_client_messages() {
        let join: ClientMessage =
            serde_json::from_str(r#"{"type":"join","identity":"alice"}"#).unwrap();
        assert_eq!(
            join,
            ClientMessage::Join {
                identity: "alice".to_string()
            }
        );

        let draw: ClientMessage =
            serde_json::from_str(r##"{"type":"draw","x":3,"y":-4,"color":"#fff"}"##).unwrap();
        assert_eq!(
            draw,
            ClientMessage::Draw {
                x: 3,
                y: -4,
                color: "#fff".to_string()
            }
        );

        let chat: ClientMessage =
            serde_json::from_str(r#"{"type":"chat","content":"hi"}"#).unwrap();
        assert_eq!(
            chat,
            ClientMessage::Chat {
                content: "hi".to_string(),
                recipient: None
            }
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"undo"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"draw","x":1}"#).is_err());
    }

    #[test]
    fn test_server_event_wire_format() {
        let presence = ServerEvent::PresenceUpdate {
            online_users: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&presence).unwrap(),
            json!({"type": "presence-update", "onlineUsers": ["a", "b"]})
        );

        let budget = ServerEvent::BudgetUpdate(BudgetStatus {
            remaining: 14,
            next_regen_seconds: Some(5),
        });
        assert_eq!(
            serde_json::to_value(&budget).unwrap(),
            json!({"type": "budget-update", "remaining": 14, "nextRegenSeconds": 5})
        );

        let pixel = ServerEvent::PixelUpdate {
            x: 1,
            y: 2,
            color: Color::parse("#ff0000").unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&pixel).unwrap(),
            json!({"type": "pixel-update", "x": 1, "y": 2, "color": "#FF0000"})
        );
    }

    #[test]
    fn test_chat_message_wire_format() {
        let message = Message::new("alice", "psst", Some("bob"));
        let value = serde_json::to_value(ServerEvent::ChatMessage(message.clone())).unwrap();

        assert_eq!(value["type"], "chat-message");
        assert_eq!(value["id"], message.id.to_string());
        assert_eq!(value["sender"], "alice");
        assert_eq!(value["isPrivate"], true);
        assert_eq!(value["recipient"], "bob");

        let public = serde_json::to_value(ServerEvent::ChatMessage(Message::new(
            "alice", "hello", None,
        )))
        .unwrap();
        assert_eq!(public["isPrivate"], false);
        assert!(public.get("recipient").is_none());
    }
}
