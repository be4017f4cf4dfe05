use serde::{Deserialize, Serialize};

/// Trait for getting the push event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

/// A frame pushed from the server to a client channel.
///
/// Serializes as a flat JSON object tagged with `type`, e.g.
/// `{"type":"notification","message":"hello","relatedEntity":null,"relatedEntityId":null}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Envelope {
    #[serde(rename = "notification", rename_all = "camelCase")]
    Notification {
        message: String,
        related_entity: Option<String>,
        related_entity_id: Option<i64>,
    },
}

impl Envelope {
    pub fn notification(
        message: impl Into<String>,
        related_entity: Option<String>,
        related_entity_id: Option<i64>,
    ) -> Self {
        Envelope::Notification {
            message: message.into(),
            related_entity,
            related_entity_id,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl EventType for Envelope {
    fn event_type(&self) -> &'static str {
        match self {
            Envelope::Notification { .. } => "notification",
        }
    }
}
