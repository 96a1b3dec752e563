//! Core data types: credentials, messages and their wire shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Symmetric key shared between a client and the gateway.
///
/// `Debug` is redacted so secrets never reach the logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw key bytes for HMAC
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(***)")
    }
}

/// Stored credential record, serialized as `{"shared_secret": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub shared_secret: SharedSecret,
}

/// Server-generated message identifier.
///
/// Uses UUID v7: random bits make reuse practically impossible for the
/// lifetime of the process, deleted ids included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse the exact string form handed out on creation.
    ///
    /// Other spellings of the same UUID (uppercase, unhyphenated, braced,
    /// `urn:uuid:`) are not ids and yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s)
            .ok()
            .map(Self)
            .filter(|id| id.to_string() == s)
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A board message. The body travels as `msg` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Any JSON value, stored as sent. Absent reads back as absent.
    #[serde(rename = "msg", default, skip_serializing_if = "Value::is_null")]
    pub body: Value,
    /// Labels in the order supplied, duplicates kept
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Message {
    pub fn new(body: impl Into<Value>, tags: Vec<String>) -> Self {
        Self {
            body: body.into(),
            tags,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// `PUT /credential` body
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterCredentialRequest {
    pub key: String,
    pub shared_secret: String,
}

/// `POST /message` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedMessage {
    #[serde(rename = "messageId")]
    pub message_id: MessageId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_debug_redacted() {
        let secret = SharedSecret::new("s3cr3t");
        assert!(!format!("{:?}", secret).contains("s3cr3t"));
        assert_eq!(secret.expose(), "s3cr3t");
    }

    #[test]
    fn test_credential_wire_shape() {
        let cred = Credential {
            shared_secret: SharedSecret::new("s3cr3t"),
        };
        let json = serde_json::to_value(&cred).unwrap();
        assert_eq!(json, serde_json::json!({ "shared_secret": "s3cr3t" }));
    }

    #[test]
    fn test_message_wire_shape() {
        let message = Message::new("hi", vec!["a".into(), "b".into()]);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json, serde_json::json!({ "msg": "hi", "tags": ["a", "b"] }));
    }

    #[test]
    fn test_message_tags_default_empty() {
        let message: Message = serde_json::from_str(r#"{"msg":"no tags"}"#).unwrap();
        assert!(message.tags.is_empty());
    }

    #[test]
    fn test_message_body_any_json() {
        let message: Message = serde_json::from_str(r#"{"msg":42,"tags":["a"]}"#).unwrap();
        assert_eq!(message.body, serde_json::json!(42));

        let message: Message = serde_json::from_str(r#"{"tags":["a"]}"#).unwrap();
        assert!(message.body.is_null());
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({ "tags": ["a"] })
        );
    }

    #[test]
    fn test_message_id_parse() {
        let id = MessageId::new();
        assert_eq!(MessageId::parse(&id.to_string()), Some(id));
        assert_eq!(MessageId::parse("not-an-id"), None);
    }

    #[test]
    fn test_message_id_other_spellings_rejected() {
        let id = MessageId::new();
        let issued = id.to_string();
        let simple = issued.replace('-', "");

        assert_eq!(MessageId::parse(&issued.to_uppercase()), None);
        assert_eq!(MessageId::parse(&simple), None);
        assert_eq!(MessageId::parse(&format!("urn:uuid:{}", issued)), None);
        assert_eq!(MessageId::parse(&format!("{{{}}}", issued)), None);
    }

    #[test]
    fn test_created_message_field_name() {
        let created = CreatedMessage {
            message_id: MessageId::new(),
        };
        let json = serde_json::to_value(created).unwrap();
        assert!(json.get("messageId").is_some());
    }
}
