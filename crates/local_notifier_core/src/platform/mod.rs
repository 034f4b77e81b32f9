//! Native notification capability interface.
//!
//! # Responsibility
//! - Describe the platform notification service as an injected capability
//!   (`deliver`, `withdraw`, callback drain) instead of a global singleton.
//! - Carry translated notification records and platform callbacks.
//!
//! # Invariants
//! - Backends never talk to the method channel; they only report callbacks.
//! - Every `PlatformCallback::Response` completion runs exactly once.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[cfg(all(feature = "desktop", unix, not(target_os = "macos")))]
pub mod desktop;
pub mod stub;

/// Category identifier registered for the single-action surface.
pub const CATEGORY_IDENTIFIER: &str = "category_identifier";
/// Action identifier reported back when the action button is used.
pub const ACTION_IDENTIFIER: &str = "action_identifier";

/// Mutually exclusive delivery routes.
///
/// `Modern` supports structured categories/actions; `Legacy` is the older
/// single-button model with subtitle and content image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryPath {
    Modern,
    Legacy,
}

impl DeliveryPath {
    /// Picks the delivery path a notifier can serve.
    pub fn probe(capabilities: &NotifierCapabilities) -> Self {
        if capabilities.action_categories {
            Self::Modern
        } else {
            Self::Legacy
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Legacy => "legacy",
        }
    }

    /// Parses `modern|legacy` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "modern" => Some(Self::Modern),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }
}

/// Feature flags reported by a notifier backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierCapabilities {
    /// Named categories with structured actions.
    pub action_categories: bool,
    pub subtitle: bool,
    pub content_image: bool,
    /// Delivered notifications can be removed again.
    pub withdraw: bool,
}

impl NotifierCapabilities {
    pub fn modern() -> Self {
        Self {
            action_categories: true,
            subtitle: false,
            content_image: false,
            withdraw: true,
        }
    }

    pub fn legacy() -> Self {
        Self {
            action_categories: false,
            subtitle: true,
            content_image: true,
            withdraw: true,
        }
    }
}

/// Action entry inside an `ActionCategory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeAction {
    pub identifier: String,
    pub title: String,
}

/// Named group of actions attached to notifications by category id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCategory {
    pub identifier: String,
    pub actions: Vec<NativeAction>,
}

impl ActionCategory {
    /// Single-action category using the fixed category/action identifiers.
    pub fn single_action(title: impl Into<String>) -> Self {
        Self {
            identifier: CATEGORY_IDENTIFIER.to_string(),
            actions: vec![NativeAction {
                identifier: ACTION_IDENTIFIER.to_string(),
                title: title.into(),
            }],
        }
    }
}

/// Notification translated into platform terms.
///
/// Modern deliveries use `category_identifier`; legacy deliveries use
/// `subtitle`, `content_image` and `action_button_title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformNotification {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub subtitle: Option<String>,
    pub sound_name: Option<String>,
    pub content_image: Option<String>,
    pub category_identifier: Option<String>,
    pub action_button_title: Option<String>,
}

/// Opaque token for one delivered native notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeHandle(String);

impl NativeHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How the user activated a legacy notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKind {
    ContentsClicked,
    ActionButtonClicked,
}

/// Acknowledgment the platform expects after a user response is handled.
///
/// Dropping an uncompleted handler completes it.
pub struct CompletionHandler {
    callback: Option<Box<dyn FnOnce() + Send>>,
}

impl CompletionHandler {
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Handler with nothing to acknowledge.
    pub fn noop() -> Self {
        Self { callback: None }
    }

    pub fn complete(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

impl Drop for CompletionHandler {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for CompletionHandler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionHandler")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

/// Callback reported by the platform notification service.
#[derive(Debug)]
pub enum PlatformCallback {
    /// Legacy delivery confirmation.
    Delivered { identifier: String },
    /// Legacy user activation.
    Activated {
        identifier: String,
        activation: ActivationKind,
    },
    /// Modern user response; `completion` must run once handled.
    Response {
        identifier: String,
        action_identifier: String,
        completion: CompletionHandler,
    },
    /// Platform dropped the notification on its own.
    Expired { identifier: String },
}

impl PlatformCallback {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Delivered { identifier }
            | Self::Activated { identifier, .. }
            | Self::Response { identifier, .. }
            | Self::Expired { identifier } => identifier,
        }
    }
}

/// Native notification service capability.
pub trait NativeNotifier: Send {
    /// Stable backend name for logs.
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> NotifierCapabilities;

    /// Replaces the registered category set.
    fn register_categories(&self, categories: &[ActionCategory]) -> Result<(), NativeError>;

    /// Hands one notification to the platform; fire-and-forget.
    fn deliver(&self, notification: &PlatformNotification) -> Result<NativeHandle, NativeError>;

    /// Removes one delivered notification.
    fn withdraw(&self, handle: &NativeHandle) -> Result<(), NativeError>;

    /// Drains callbacks reported since the previous call.
    fn take_callbacks(&self) -> Vec<PlatformCallback> {
        Vec::new()
    }
}

/// Platform-side failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeError {
    CategoryRegistration(String),
    Delivery(String),
    Withdraw(String),
    Unsupported(&'static str),
}

impl Display for NativeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CategoryRegistration(message) => {
                write!(f, "category registration failed: {message}")
            }
            Self::Delivery(message) => write!(f, "delivery failed: {message}"),
            Self::Withdraw(message) => write!(f, "withdraw failed: {message}"),
            Self::Unsupported(operation) => write!(f, "operation unsupported: {operation}"),
        }
    }
}

impl Error for NativeError {}
