//! Request -> platform record translation per delivery path.

use crate::config::BridgeConfig;
use crate::model::request::NotificationRequest;
use crate::platform::{ActionCategory, PlatformNotification, CATEGORY_IDENTIFIER};

/// Content for the modern path plus the category to register, if any.
///
/// The subtitle is not carried on this path.
pub fn modern_notification(
    request: &NotificationRequest,
    config: &BridgeConfig,
) -> (PlatformNotification, Option<ActionCategory>) {
    let category = request.primary_action().map(ActionCategory::single_action);
    let notification = PlatformNotification {
        identifier: request.identifier.clone(),
        title: request.title.clone(),
        body: request.body.clone(),
        subtitle: None,
        sound_name: Some(config.sound_name.clone()),
        content_image: None,
        category_identifier: category.as_ref().map(|_| CATEGORY_IDENTIFIER.to_string()),
        action_button_title: None,
    };
    (notification, category)
}

/// User-notification object for the legacy path.
pub fn legacy_notification(
    request: &NotificationRequest,
    config: &BridgeConfig,
) -> PlatformNotification {
    PlatformNotification {
        identifier: request.identifier.clone(),
        title: request.title.clone(),
        body: request.body.clone(),
        subtitle: request.subtitle.clone(),
        sound_name: Some(config.sound_name.clone()),
        content_image: Some(config.content_image.clone()),
        category_identifier: None,
        action_button_title: request.primary_action().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::{legacy_notification, modern_notification};
    use crate::config::BridgeConfig;
    use crate::model::request::NotificationRequest;
    use crate::platform::{ACTION_IDENTIFIER, CATEGORY_IDENTIFIER};

    #[test]
    fn modern_without_action_has_no_category() {
        let request = NotificationRequest::new("n1", "T", "B").with_subtitle("S");
        let (notification, category) = modern_notification(&request, &BridgeConfig::default());

        assert!(category.is_none());
        assert_eq!(notification.category_identifier, None);
        assert_eq!(notification.subtitle, None);
        assert_eq!(notification.sound_name.as_deref(), Some("default"));
    }

    #[test]
    fn modern_with_action_registers_single_named_action() {
        let request = NotificationRequest::new("n1", "T", "B")
            .with_action("Reply")
            .with_action("Ignore");
        let (notification, category) = modern_notification(&request, &BridgeConfig::default());
        let category = category.expect("category for action");

        assert_eq!(category.identifier, CATEGORY_IDENTIFIER);
        assert_eq!(category.actions.len(), 1);
        assert_eq!(category.actions[0].identifier, ACTION_IDENTIFIER);
        assert_eq!(category.actions[0].title, "Reply");
        assert_eq!(
            notification.category_identifier.as_deref(),
            Some(CATEGORY_IDENTIFIER)
        );
    }

    #[test]
    fn legacy_carries_subtitle_image_and_button() {
        let request = NotificationRequest::new("n1", "T", "B")
            .with_subtitle("S")
            .with_action("Reply");
        let notification = legacy_notification(&request, &BridgeConfig::default());

        assert_eq!(notification.body, "B");
        assert_eq!(notification.subtitle.as_deref(), Some("S"));
        assert_eq!(notification.content_image.as_deref(), Some("AppIcon"));
        assert_eq!(notification.action_button_title.as_deref(), Some("Reply"));
        assert_eq!(notification.category_identifier, None);
    }
}
