//! Native desktop notification bridge for the `local_notifier` method channel.
//! This crate owns request validation, delivery-path translation and event
//! relay; platform services are reached only through `NativeNotifier`.

pub mod bridge;
pub mod channel;
pub mod config;
pub mod logging;
pub mod model;
pub mod platform;

pub use bridge::index::{ActiveNotificationIndex, IndexEntry};
pub use bridge::{BridgeError, BridgeWarning, CloseReport, NotificationBridge, NotifyReport};
pub use channel::{
    dispatch, ChannelMessage, EventSink, MethodCall, MethodResponse, QueuedEventSink,
};
pub use config::{BridgeConfig, ConfigError, CHANNEL_NAME};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::event::{NotificationEvent, NotificationEventKind};
pub use model::request::{
    CloseRequest, NotificationAction, NotificationRequest, RequestValidationError,
};
#[cfg(all(feature = "desktop", unix, not(target_os = "macos")))]
pub use platform::desktop::DesktopNotifier;
pub use platform::stub::{StubNotifier, StubNotifierProbe};
pub use platform::{
    ActionCategory, ActivationKind, CompletionHandler, DeliveryPath, NativeError, NativeHandle,
    NativeNotifier, NotifierCapabilities, PlatformCallback, PlatformNotification,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
