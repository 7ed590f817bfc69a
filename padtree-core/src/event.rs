//! Live-update event types.
//!
//! Every mutation publishes one of these to the topic matching the pad
//! path. Events are immutable value objects; each carries the originating
//! actor's identifier so a client can recognize and discard its own echo.

use serde::{Deserialize, Serialize};

/// Event broadcast to topic subscribers when a pad changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PadEvent {
    /// The pad at the subscribed topic was written.
    Update {
        /// New pad content.
        content: String,
        /// Identifier of the writer.
        actor_id: String,
    },

    /// The pad at `path` (the subscribed topic or an ancestor) was deleted.
    Delete {
        /// Root of the deleted subtree.
        path: String,
        /// Identifier of the deleter.
        actor_id: String,
    },

    /// The subscribed topic's set of direct children changed.
    ChildrenChanged {
        /// Identifier of the actor whose write or delete caused the change.
        actor_id: String,
    },
}

impl PadEvent {
    /// Event type as a string for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            PadEvent::Update { .. } => "update",
            PadEvent::Delete { .. } => "delete",
            PadEvent::ChildrenChanged { .. } => "children_changed",
        }
    }

    /// Identifier of the actor that produced this event.
    pub fn actor_id(&self) -> &str {
        match self {
            PadEvent::Update { actor_id, .. }
            | PadEvent::Delete { actor_id, .. }
            | PadEvent::ChildrenChanged { actor_id } => actor_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event = PadEvent::Update {
            content: "hello".to_string(),
            actor_id: "client-1".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"update\""));
        assert!(json.contains("\"content\":\"hello\""));
        assert!(json.contains("\"actor_id\":\"client-1\""));
    }

    #[test]
    fn test_event_roundtrip() {
        let event = PadEvent::Delete {
            path: "a/b".to_string(),
            actor_id: "client-2".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: PadEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_event_type_names() {
        let event = PadEvent::ChildrenChanged {
            actor_id: String::new(),
        };
        assert_eq!(event.event_type(), "children_changed");
        assert_eq!(event.actor_id(), "");
    }
}
