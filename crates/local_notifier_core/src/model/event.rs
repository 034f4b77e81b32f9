//! Outbound notification events.

use serde_json::{json, Value};

/// Outbound method name for the `shown` milestone.
pub const METHOD_ON_SHOW: &str = "onLocalNotificationShow";
/// Outbound method name for a body click.
pub const METHOD_ON_CLICK: &str = "onLocalNotificationClick";
/// Outbound method name for an action-button click.
pub const METHOD_ON_CLICK_ACTION: &str = "onLocalNotificationClickAction";
/// Outbound method name for an explicit close.
pub const METHOD_ON_CLOSE: &str = "onLocalNotificationClose";

/// Event kinds relayed to the application framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationEventKind {
    Shown,
    Clicked,
    ActionClicked,
    Closed,
}

impl NotificationEventKind {
    /// Stable outbound channel method name.
    pub fn method_name(self) -> &'static str {
        match self {
            Self::Shown => METHOD_ON_SHOW,
            Self::Clicked => METHOD_ON_CLICK,
            Self::ActionClicked => METHOD_ON_CLICK_ACTION,
            Self::Closed => METHOD_ON_CLOSE,
        }
    }

    /// Short label used in log records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shown => "shown",
            Self::Clicked => "clicked",
            Self::ActionClicked => "action_clicked",
            Self::Closed => "closed",
        }
    }
}

/// One event emitted for a notification identifier.
///
/// Emitted and forgotten; there is no event history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub kind: NotificationEventKind,
    pub identifier: String,
}

impl NotificationEvent {
    pub fn new(kind: NotificationEventKind, identifier: impl Into<String>) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
        }
    }

    pub fn method_name(&self) -> &'static str {
        self.kind.method_name()
    }

    /// Outbound argument map: `{"notificationId": identifier}`.
    pub fn arguments(&self) -> Value {
        json!({ "notificationId": self.identifier })
    }
}

#[cfg(test)]
mod tests {
    use super::{NotificationEvent, NotificationEventKind};
    use serde_json::json;

    #[test]
    fn maps_kinds_to_channel_method_names() {
        assert_eq!(
            NotificationEventKind::Shown.method_name(),
            "onLocalNotificationShow"
        );
        assert_eq!(
            NotificationEventKind::Clicked.method_name(),
            "onLocalNotificationClick"
        );
        assert_eq!(
            NotificationEventKind::ActionClicked.method_name(),
            "onLocalNotificationClickAction"
        );
        assert_eq!(
            NotificationEventKind::Closed.method_name(),
            "onLocalNotificationClose"
        );
    }

    #[test]
    fn arguments_carry_notification_id() {
        let event = NotificationEvent::new(NotificationEventKind::Clicked, "n1");
        assert_eq!(event.arguments(), json!({"notificationId": "n1"}));
    }
}
