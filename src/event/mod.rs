pub mod input;
pub mod socket;

pub use crate::dom::CustomEvent;

use crate::errors::{Result, ToastlineError};
use serde::{Deserialize, Serialize};

/// Longest accepted event name
const MAX_EVENT_NAME_LEN: usize = 128;

/// Characters that only appear in malformed HX-Trigger values
const RESERVED_CHARS: &[char] = &['[', ']', '{', '}', '"', ','];

/// Application events
#[derive(Debug)]
pub enum Event {
    /// Custom event to dispatch on the page body
    Page(CustomEvent),
    /// Keyboard input
    Key(crossterm::event::KeyEvent),
}

/// Event sent over the Unix socket to a running page
///
/// One JSON object per line:
/// ```json
/// {"event": "urlAdded", "detail": {"short": "aB3xY9"}, "timestamp": 1704067200}
/// ```
/// `detail` and `timestamp` are optional.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EventMessage {
    /// Event name, matched exactly against listener names
    pub event: String,
    /// Payload forwarded as the event's detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
    /// Unix timestamp in seconds since epoch (sender's clock)
    #[serde(default)]
    pub timestamp: i64,
}

impl EventMessage {
    /// Wrap `event` for the wire, stamped with the current time
    pub fn new(event: &CustomEvent) -> Self {
        Self {
            event: event.name.clone(),
            detail: event.detail.clone(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Check the event name is usable
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.event).map_err(ToastlineError::InvalidEvent)
    }

    pub fn into_custom_event(self) -> CustomEvent {
        CustomEvent {
            name: self.event,
            detail: self.detail,
        }
    }
}

fn validate_name(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() {
        return Err("event name is required");
    }
    if name.len() > MAX_EVENT_NAME_LEN {
        return Err("event name is too long");
    }
    if name.chars().any(char::is_whitespace) {
        return Err("event name must not contain whitespace");
    }
    if name.contains(RESERVED_CHARS) {
        return Err("event name must not contain JSON or list punctuation");
    }
    Ok(())
}

/// Parse an `HX-Trigger` response header into the events it names
///
/// Two forms are accepted:
/// - a comma-separated list of names: `urlAdded, listChanged`
/// - a JSON object mapping names to details: `{"urlAdded": {"short": "abc"}}`
///
/// Non-object details are wrapped as `{"value": ...}`; `null` means no
/// detail. Object keys come out in sorted order.
pub fn parse_hx_trigger(header: &str) -> Result<Vec<CustomEvent>> {
    let header = header.trim();
    if header.is_empty() {
        return Err(ToastlineError::TriggerError("header is empty".to_string()));
    }

    let events: Vec<CustomEvent> = if header.starts_with('{') {
        let value: serde_json::Value = serde_json::from_str(header)?;
        let serde_json::Value::Object(map) = value else {
            return Err(ToastlineError::TriggerError(
                "expected a JSON object".to_string(),
            ));
        };
        map.into_iter()
            .map(|(name, detail)| {
                let event = CustomEvent::new(name);
                match detail {
                    serde_json::Value::Null => event,
                    serde_json::Value::Object(_) => event.with_detail(detail),
                    other => event.with_detail(serde_json::json!({ "value": other })),
                }
            })
            .collect()
    } else {
        header
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(CustomEvent::new)
            .collect()
    };

    if events.is_empty() {
        return Err(ToastlineError::TriggerError(
            "no event names found".to_string(),
        ));
    }
    for event in &events {
        validate_name(&event.name).map_err(|reason| {
            ToastlineError::TriggerError(format!("'{}': {}", event.name, reason))
        })?;
    }
    Ok(events)
}
