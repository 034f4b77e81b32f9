//! In-process notifier used by tests, the CLI and headless hosts.
//!
//! Records deliveries instead of showing them. A cloneable
//! `StubNotifierProbe` shares the same state so a host can inspect what was
//! delivered and inject platform callbacks.

use crate::platform::{
    ActionCategory, ActivationKind, CompletionHandler, NativeError, NativeHandle, NativeNotifier,
    NotifierCapabilities, PlatformCallback, PlatformNotification, ACTION_IDENTIFIER,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct StubState {
    deliveries: Vec<PlatformNotification>,
    visible: BTreeMap<String, String>,
    categories: Vec<ActionCategory>,
    withdrawn: Vec<String>,
    pending: VecDeque<PlatformCallback>,
    fail_registration: Option<String>,
    fail_delivery: Option<String>,
    next_token: u64,
}

type SharedState = Arc<Mutex<StubState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Recording notifier backend.
pub struct StubNotifier {
    capabilities: NotifierCapabilities,
    auto_confirm: bool,
    state: SharedState,
    acknowledged: Arc<AtomicUsize>,
}

impl StubNotifier {
    pub fn new(capabilities: NotifierCapabilities) -> Self {
        Self {
            capabilities,
            auto_confirm: false,
            state: SharedState::default(),
            acknowledged: Arc::default(),
        }
    }

    pub fn modern() -> Self {
        Self::new(NotifierCapabilities::modern())
    }

    pub fn legacy() -> Self {
        Self::new(NotifierCapabilities::legacy())
    }

    /// Queues a `Delivered` callback after every delivery on a notifier
    /// without action categories.
    pub fn with_auto_confirm(mut self, enabled: bool) -> Self {
        self.auto_confirm = enabled;
        self
    }

    pub fn probe(&self) -> StubNotifierProbe {
        StubNotifierProbe {
            state: Arc::clone(&self.state),
            acknowledged: Arc::clone(&self.acknowledged),
        }
    }
}

impl NativeNotifier for StubNotifier {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn capabilities(&self) -> NotifierCapabilities {
        self.capabilities
    }

    fn register_categories(&self, categories: &[ActionCategory]) -> Result<(), NativeError> {
        if !self.capabilities.action_categories {
            return Err(NativeError::Unsupported("register_categories"));
        }
        let mut state = lock(&self.state);
        if let Some(message) = state.fail_registration.take() {
            return Err(NativeError::CategoryRegistration(message));
        }
        state.categories = categories.to_vec();
        Ok(())
    }

    fn deliver(&self, notification: &PlatformNotification) -> Result<NativeHandle, NativeError> {
        let mut state = lock(&self.state);
        if let Some(message) = state.fail_delivery.take() {
            return Err(NativeError::Delivery(message));
        }

        // Same identifier replaces the visible notification.
        state
            .visible
            .retain(|_, identifier| *identifier != notification.identifier);
        state.next_token += 1;
        let token = format!("stub-{}", state.next_token);
        state
            .visible
            .insert(token.clone(), notification.identifier.clone());
        state.deliveries.push(notification.clone());

        if self.auto_confirm && !self.capabilities.action_categories {
            state.pending.push_back(PlatformCallback::Delivered {
                identifier: notification.identifier.clone(),
            });
        }
        Ok(NativeHandle::new(token))
    }

    fn withdraw(&self, handle: &NativeHandle) -> Result<(), NativeError> {
        if !self.capabilities.withdraw {
            return Err(NativeError::Unsupported("withdraw"));
        }
        let mut state = lock(&self.state);
        match state.visible.remove(handle.as_str()) {
            Some(_) => {
                state.withdrawn.push(handle.as_str().to_string());
                Ok(())
            }
            None => Err(NativeError::Withdraw(format!(
                "unknown handle `{}`",
                handle.as_str()
            ))),
        }
    }

    fn take_callbacks(&self) -> Vec<PlatformCallback> {
        lock(&self.state).pending.drain(..).collect()
    }
}

/// Shared view into a `StubNotifier`.
#[derive(Clone)]
pub struct StubNotifierProbe {
    state: SharedState,
    acknowledged: Arc<AtomicUsize>,
}

impl StubNotifierProbe {
    /// Every notification handed to `deliver`, in order.
    pub fn deliveries(&self) -> Vec<PlatformNotification> {
        lock(&self.state).deliveries.clone()
    }

    pub fn last_delivery(&self) -> Option<PlatformNotification> {
        lock(&self.state).deliveries.last().cloned()
    }

    /// Identifiers currently shown, sorted.
    pub fn visible_identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = lock(&self.state).visible.values().cloned().collect();
        identifiers.sort();
        identifiers
    }

    pub fn categories(&self) -> Vec<ActionCategory> {
        lock(&self.state).categories.clone()
    }

    pub fn withdrawn_count(&self) -> usize {
        lock(&self.state).withdrawn.len()
    }

    /// Makes the next `register_categories` call fail.
    pub fn fail_next_registration(&self, message: impl Into<String>) {
        lock(&self.state).fail_registration = Some(message.into());
    }

    /// Makes the next `deliver` call fail.
    pub fn fail_next_delivery(&self, message: impl Into<String>) {
        lock(&self.state).fail_delivery = Some(message.into());
    }

    pub fn push_callback(&self, callback: PlatformCallback) {
        lock(&self.state).pending.push_back(callback);
    }

    pub fn confirm_delivery(&self, identifier: &str) {
        self.push_callback(PlatformCallback::Delivered {
            identifier: identifier.to_string(),
        });
    }

    pub fn click(&self, identifier: &str) {
        self.push_callback(PlatformCallback::Activated {
            identifier: identifier.to_string(),
            activation: ActivationKind::ContentsClicked,
        });
    }

    pub fn click_action_button(&self, identifier: &str) {
        self.push_callback(PlatformCallback::Activated {
            identifier: identifier.to_string(),
            activation: ActivationKind::ActionButtonClicked,
        });
    }

    /// Queues a modern user response whose acknowledgment is counted.
    pub fn respond(&self, identifier: &str, action_identifier: &str) {
        let acknowledged = Arc::clone(&self.acknowledged);
        self.push_callback(PlatformCallback::Response {
            identifier: identifier.to_string(),
            action_identifier: action_identifier.to_string(),
            completion: CompletionHandler::new(move || {
                acknowledged.fetch_add(1, Ordering::SeqCst);
            }),
        });
    }

    pub fn respond_with_action(&self, identifier: &str) {
        self.respond(identifier, ACTION_IDENTIFIER);
    }

    pub fn expire(&self, identifier: &str) {
        self.push_callback(PlatformCallback::Expired {
            identifier: identifier.to_string(),
        });
    }

    /// Number of modern responses acknowledged so far.
    pub fn acknowledged_count(&self) -> usize {
        self.acknowledged.load(Ordering::SeqCst)
    }
}
