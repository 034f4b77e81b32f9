//! Freedesktop notification backend built on `notify-rust`.
//!
//! # Responsibility
//! - Show notifications through the session notification server.
//! - Relay server action signals as `PlatformCallback`s.
//!
//! # Invariants
//! - One live server id per identifier; re-delivery replaces it in place.
//! - Each delivery owns one waiter thread. Only the waiter of the latest
//!   delivery for a server id may queue callbacks.
//! - Withdrawn, replaced and expired notifications leave no tracking state.

use crate::platform::{
    ActionCategory, ActivationKind, CompletionHandler, NativeError, NativeHandle, NativeNotifier,
    NotifierCapabilities, PlatformCallback, PlatformNotification, ACTION_IDENTIFIER,
};
use log::{debug, warn};
use notify_rust::{Hint, Notification, NotificationHandle};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

const SERVER_CAPABILITY_ACTIONS: &str = "actions";
const SERVER_CAPABILITY_BODY_IMAGES: &str = "body-images";

/// Action name the server reports for a click on the notification body.
pub const DEFAULT_ACTION: &str = "default";
/// Pseudo-action reported when the server closed the notification.
pub const CLOSED_ACTION: &str = "__closed";

#[derive(Debug)]
struct LiveNotification {
    identifier: String,
    generation: u64,
    /// The server already removed it after a user action.
    dismissed: bool,
}

#[derive(Debug, Default)]
struct DesktopState {
    categories: HashMap<String, ActionCategory>,
    live: HashMap<u32, LiveNotification>,
    server_ids: HashMap<String, u32>,
    pending: VecDeque<PlatformCallback>,
    next_generation: u64,
}

impl DesktopState {
    /// Records a delivery and returns the generation its waiter must match.
    fn track(&mut self, identifier: &str, server_id: u32) -> u64 {
        self.next_generation += 1;
        if let Some(previous) = self
            .server_ids
            .insert(identifier.to_string(), server_id)
        {
            if previous != server_id {
                self.live.remove(&previous);
            }
        }
        self.live.insert(
            server_id,
            LiveNotification {
                identifier: identifier.to_string(),
                generation: self.next_generation,
                dismissed: false,
            },
        );
        self.next_generation
    }

    fn forget(&mut self, server_id: u32) -> Option<LiveNotification> {
        let live = self.live.remove(&server_id)?;
        if self.server_ids.get(&live.identifier) == Some(&server_id) {
            self.server_ids.remove(&live.identifier);
        }
        Some(live)
    }

    fn record_action(&mut self, server_id: u32, generation: u64, action: &str, modern: bool) {
        let current = self
            .live
            .get(&server_id)
            .is_some_and(|live| live.generation == generation);
        if !current {
            debug!("event=server_action module=platform status=stale backend=desktop server_id={server_id}");
            return;
        }

        if action == CLOSED_ACTION {
            if let Some(live) = self.forget(server_id) {
                self.pending.push_back(PlatformCallback::Expired {
                    identifier: live.identifier,
                });
            }
            return;
        }

        let Some(live) = self.live.get_mut(&server_id) else {
            return;
        };
        live.dismissed = true;
        if let Some(callback) = callback_for_action(&live.identifier, action, modern) {
            self.pending.push_back(callback);
        }
    }
}

fn lock(state: &Mutex<DesktopState>) -> MutexGuard<'_, DesktopState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Maps one server action to the callback relayed for `identifier`.
///
/// Servers with action support speak the modern response model; the rest
/// report legacy activations. `CLOSED_ACTION` is handled by the caller.
fn callback_for_action(identifier: &str, action: &str, modern: bool) -> Option<PlatformCallback> {
    if modern {
        return Some(PlatformCallback::Response {
            identifier: identifier.to_string(),
            action_identifier: action.to_string(),
            completion: CompletionHandler::noop(),
        });
    }
    let activation = match action {
        DEFAULT_ACTION => ActivationKind::ContentsClicked,
        ACTION_IDENTIFIER => ActivationKind::ActionButtonClicked,
        _ => return None,
    };
    Some(PlatformCallback::Activated {
        identifier: identifier.to_string(),
        activation,
    })
}

/// Builds the server request for one translated notification.
fn build_notification(
    appname: &str,
    notification: &PlatformNotification,
    category: Option<&ActionCategory>,
    replace_id: Option<u32>,
) -> Notification {
    let mut builder = Notification::new();
    builder
        .appname(appname)
        .summary(&notification.title)
        .body(&notification.body);

    if let Some(subtitle) = notification.subtitle.as_deref() {
        builder.subtitle(subtitle);
    }
    if let Some(sound_name) = notification.sound_name.as_deref() {
        builder.sound_name(sound_name);
    }
    if let Some(image) = notification.content_image.as_deref() {
        builder.icon(image);
    }
    if let Some(category) = category {
        for action in &category.actions {
            builder.action(&action.identifier, &action.title);
        }
    }
    if let Some(title) = notification.action_button_title.as_deref() {
        builder.action(DEFAULT_ACTION, "");
        builder.action(ACTION_IDENTIFIER, title);
    }
    if let Some(id) = replace_id {
        builder.id(id);
    }
    builder
}

/// Desktop notifier speaking the freedesktop notification protocol.
pub struct DesktopNotifier {
    appname: String,
    capabilities: NotifierCapabilities,
    state: Arc<Mutex<DesktopState>>,
}

impl DesktopNotifier {
    /// Connects to the session notification server and probes what it supports.
    pub fn connect(appname: impl Into<String>) -> Self {
        let server_capabilities = notify_rust::get_capabilities().unwrap_or_else(|err| {
            warn!("event=capability_probe module=platform status=error backend=desktop error={err}");
            Vec::new()
        });
        let supports = |name: &str| server_capabilities.iter().any(|value| value == name);

        Self {
            appname: appname.into(),
            capabilities: NotifierCapabilities {
                action_categories: supports(SERVER_CAPABILITY_ACTIONS),
                subtitle: false,
                content_image: supports(SERVER_CAPABILITY_BODY_IMAGES),
                withdraw: true,
            },
            state: Arc::default(),
        }
    }

    fn spawn_waiter(&self, handle: NotificationHandle, server_id: u32, generation: u64) {
        let state = Arc::clone(&self.state);
        let modern = self.capabilities.action_categories;
        let spawned = thread::Builder::new()
            .name(format!("notify-wait-{server_id}"))
            .spawn(move || {
                handle.wait_for_action(|action| {
                    lock(&state).record_action(server_id, generation, action, modern);
                });
            });
        if let Err(err) = spawned {
            warn!("event=action_waiter module=platform status=error backend=desktop server_id={server_id} error={err}");
        }
    }
}

impl NativeNotifier for DesktopNotifier {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn capabilities(&self) -> NotifierCapabilities {
        self.capabilities
    }

    fn register_categories(&self, categories: &[ActionCategory]) -> Result<(), NativeError> {
        let mut state = lock(&self.state);
        state.categories = categories
            .iter()
            .map(|category| (category.identifier.clone(), category.clone()))
            .collect();
        Ok(())
    }

    fn deliver(&self, notification: &PlatformNotification) -> Result<NativeHandle, NativeError> {
        let (replace_id, category) = {
            let state = lock(&self.state);
            let category = notification
                .category_identifier
                .as_deref()
                .and_then(|id| state.categories.get(id).cloned());
            (state.server_ids.get(&notification.identifier).copied(), category)
        };

        let handle = build_notification(&self.appname, notification, category.as_ref(), replace_id)
            .show()
            .map_err(|err| NativeError::Delivery(err.to_string()))?;
        let server_id = handle.id();

        let generation = {
            let mut state = lock(&self.state);
            let generation = state.track(&notification.identifier, server_id);
            if !self.capabilities.action_categories {
                state.pending.push_back(PlatformCallback::Delivered {
                    identifier: notification.identifier.clone(),
                });
            }
            generation
        };
        self.spawn_waiter(handle, server_id, generation);
        Ok(NativeHandle::new(server_id.to_string()))
    }

    fn withdraw(&self, handle: &NativeHandle) -> Result<(), NativeError> {
        let server_id: u32 = handle.as_str().parse().map_err(|_| {
            NativeError::Withdraw(format!("malformed handle `{}`", handle.as_str()))
        })?;
        let live = lock(&self.state).forget(server_id).ok_or_else(|| {
            NativeError::Withdraw(format!("no live notification for `{}`", handle.as_str()))
        })?;
        if live.dismissed {
            return Ok(());
        }

        // The waiter owns the original handle; close through a replacement
        // bound to the same server id.
        let replacement = Notification::new()
            .appname(&self.appname)
            .hint(Hint::Transient(true))
            .id(server_id)
            .show()
            .map_err(|err| NativeError::Withdraw(err.to_string()))?;
        replacement.close();
        Ok(())
    }

    fn take_callbacks(&self) -> Vec<PlatformCallback> {
        lock(&self.state).pending.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        build_notification, callback_for_action, DesktopState, CLOSED_ACTION, DEFAULT_ACTION,
    };
    use crate::platform::{
        ActionCategory, ActivationKind, PlatformCallback, PlatformNotification, ACTION_IDENTIFIER,
    };
    use notify_rust::Hint;

    fn notification() -> PlatformNotification {
        PlatformNotification {
            identifier: "n1".to_string(),
            title: "Title".to_string(),
            body: "Body".to_string(),
            subtitle: None,
            sound_name: Some("default".to_string()),
            content_image: Some("AppIcon".to_string()),
            category_identifier: None,
            action_button_title: None,
        }
    }

    #[test]
    fn builder_maps_content_sound_and_icon() {
        let built = build_notification("app", &notification(), None, None);
        assert_eq!(built.appname, "app");
        assert_eq!(built.summary, "Title");
        assert_eq!(built.body, "Body");
        assert_eq!(built.icon, "AppIcon");
        assert!(built.hints.contains(&Hint::SoundName("default".to_string())));
        assert!(built.actions.is_empty());
    }

    #[test]
    fn builder_attaches_category_actions() {
        let category = ActionCategory::single_action("Reply");
        let built = build_notification("app", &notification(), Some(&category), None);
        assert_eq!(
            built.actions,
            vec![ACTION_IDENTIFIER.to_string(), "Reply".to_string()]
        );
    }

    #[test]
    fn builder_legacy_button_keeps_default_action() {
        let mut legacy = notification();
        legacy.action_button_title = Some("Open".to_string());
        let built = build_notification("app", &legacy, None, Some(7));
        assert_eq!(
            built.actions,
            vec![
                DEFAULT_ACTION.to_string(),
                String::new(),
                ACTION_IDENTIFIER.to_string(),
                "Open".to_string()
            ]
        );
    }

    #[test]
    fn modern_actions_become_responses() {
        let callback = callback_for_action("n1", ACTION_IDENTIFIER, true).expect("response");
        assert!(matches!(
            callback,
            PlatformCallback::Response { ref identifier, ref action_identifier, .. }
                if identifier == "n1" && action_identifier == ACTION_IDENTIFIER
        ));
    }

    #[test]
    fn legacy_actions_become_activations() {
        let body = callback_for_action("n1", DEFAULT_ACTION, false).expect("body click");
        assert!(matches!(
            body,
            PlatformCallback::Activated { activation: ActivationKind::ContentsClicked, .. }
        ));
        let button = callback_for_action("n1", ACTION_IDENTIFIER, false).expect("button click");
        assert!(matches!(
            button,
            PlatformCallback::Activated { activation: ActivationKind::ActionButtonClicked, .. }
        ));
        assert!(callback_for_action("n1", "other", false).is_none());
    }

    #[test]
    fn redelivery_silences_previous_waiter() {
        let mut state = DesktopState::default();
        let first = state.track("n1", 4);
        let second = state.track("n1", 4);

        state.record_action(4, first, ACTION_IDENTIFIER, true);
        assert!(state.pending.is_empty());

        state.record_action(4, second, ACTION_IDENTIFIER, true);
        assert_eq!(state.pending.len(), 1);
        assert_eq!(state.live.len(), 1);
    }

    #[test]
    fn replacement_with_new_server_id_drops_old_entry() {
        let mut state = DesktopState::default();
        state.track("n1", 4);
        state.track("n1", 9);
        assert_eq!(state.live.len(), 1);
        assert_eq!(state.server_ids.get("n1"), Some(&9));
    }

    #[test]
    fn server_close_expires_and_forgets() {
        let mut state = DesktopState::default();
        let generation = state.track("n1", 4);
        state.record_action(4, generation, CLOSED_ACTION, false);

        assert!(state.live.is_empty());
        assert!(state.server_ids.is_empty());
        let callbacks: Vec<PlatformCallback> = state.pending.drain(..).collect();
        assert!(matches!(
            callbacks.as_slice(),
            [PlatformCallback::Expired { identifier }] if identifier == "n1"
        ));
    }

    #[test]
    fn user_action_marks_notification_dismissed() {
        let mut state = DesktopState::default();
        let generation = state.track("n1", 4);
        state.record_action(4, generation, DEFAULT_ACTION, false);

        let live = state.forget(4).expect("still tracked until withdrawn");
        assert!(live.dismissed);
        assert!(state.server_ids.is_empty());
    }
}
