//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the `local_notifier` channel operations to Dart via FRB.
//! - Own the process-wide bridge instance and its outbound event queue.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - The bridge is created once per process; later `notifier_init` calls are
//!   no-ops.
//! - Outbound events are buffered until `poll_events` drains them.

use local_notifier_core::{
    core_version as core_version_inner, dispatch, init_logging as init_logging_inner,
    ping as ping_inner, BridgeConfig, BridgeWarning, CloseRequest, MethodCall, MethodResponse,
    NativeNotifier, NotificationAction, NotificationBridge, NotificationRequest,
    QueuedEventSink,
};
use log::{info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(all(feature = "desktop", unix, not(target_os = "macos")))]
const DESKTOP_APP_NAME: &str = "local_notifier";

/// Whether this build talks to a real notification service.
const NATIVE_BACKEND: bool = cfg!(all(feature = "desktop", unix, not(target_os = "macos")));
const NO_NATIVE_BACKEND_WARNING: &str =
    "no native notification backend in this build; notification was recorded, not shown";

static RUNTIME: Mutex<Option<BridgeRuntime>> = Mutex::new(None);

struct BridgeRuntime {
    bridge: NotificationBridge,
    events: QueuedEventSink,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Creates the process-wide bridge from `LOCAL_NOTIFIER_*` settings.
///
/// # FFI contract
/// - Sync call; probes the notification backend once.
/// - Returns empty string on success (or when already initialized), error
///   message when configuration is invalid.
/// - Builds without a native backend still initialize; `notifier_status`
///   reports `native = false` and every delivered `notify` carries a warning.
#[flutter_rust_bridge::frb(sync)]
pub fn notifier_init() -> String {
    match with_runtime(|_| ()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Result envelope for `notify` / `close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierActionResponse {
    /// `false` only for malformed input or failed initialization.
    pub ok: bool,
    /// Human-readable response message for diagnostics.
    pub message: String,
    /// Degraded outcomes that did not fail the call.
    pub warnings: Vec<String>,
}

impl NotifierActionResponse {
    fn success(message: impl Into<String>, warnings: &[BridgeWarning]) -> Self {
        Self {
            ok: true,
            message: message.into(),
            warnings: warnings.iter().map(ToString::to_string).collect(),
        }
    }

    fn recorded_only(warnings: &[BridgeWarning]) -> Self {
        let mut response =
            Self::success("Notification recorded without a native backend.", warnings);
        response.warnings.push(NO_NATIVE_BACKEND_WARNING.to_string());
        response
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            warnings: Vec::new(),
        }
    }
}

/// Shows one notification.
///
/// Input semantics:
/// - `identifier`: caller-assigned, non-empty; reusing it replaces the
///   previous notification.
/// - `subtitle`: shown only on the legacy delivery path.
/// - `actions`: button labels; only the first one is surfaced.
///
/// # FFI contract
/// - Sync call; delivery is fire-and-forget.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn notify(
    identifier: String,
    title: String,
    body: String,
    subtitle: Option<String>,
    actions: Vec<String>,
) -> NotifierActionResponse {
    let request = NotificationRequest {
        identifier,
        title,
        body,
        subtitle,
        actions: actions.into_iter().map(NotificationAction::new).collect(),
    };
    match with_runtime(|runtime| runtime.bridge.notify(&request)) {
        Ok(Ok(report)) if report.delivered && !NATIVE_BACKEND => {
            NotifierActionResponse::recorded_only(&report.warnings)
        }
        Ok(Ok(report)) if report.delivered => {
            NotifierActionResponse::success("Notification delivered.", &report.warnings)
        }
        Ok(Ok(report)) => {
            NotifierActionResponse::success("Notification not delivered.", &report.warnings)
        }
        Ok(Err(err)) => NotifierActionResponse::failure(format!("notify failed: {err}")),
        Err(err) => NotifierActionResponse::failure(err),
    }
}

/// Withdraws one notification delivered by `notify`.
///
/// # FFI contract
/// - Sync call.
/// - Unknown identifiers succeed without emitting `onLocalNotificationClose`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn close(identifier: String) -> NotifierActionResponse {
    let request = CloseRequest::new(identifier);
    match with_runtime(|runtime| runtime.bridge.close(&request)) {
        Ok(Ok(report)) if report.closed => {
            NotifierActionResponse::success("Notification closed.", &report.warnings)
        }
        Ok(Ok(report)) => {
            NotifierActionResponse::success("No active notification.", &report.warnings)
        }
        Ok(Err(err)) => NotifierActionResponse::failure(format!("close failed: {err}")),
        Err(err) => NotifierActionResponse::failure(err),
    }
}

/// Raw channel reply for `handle_method_call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCallResponse {
    pub ok: bool,
    /// JSON-encoded success value.
    pub value_json: Option<String>,
    /// `invalid_argument`, `not_implemented` or `unavailable` on failure.
    pub error_code: Option<String>,
    pub message: String,
}

impl MethodCallResponse {
    fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            value_json: None,
            error_code: Some(code.to_string()),
            message: message.into(),
        }
    }
}

/// Dispatches one method-channel call forwarded verbatim from Dart.
///
/// # FFI contract
/// - Sync call.
/// - `arguments_json` must encode a JSON map; anything else is
///   `invalid_argument`.
/// - Unknown methods answer `not_implemented`.
#[flutter_rust_bridge::frb(sync)]
pub fn handle_method_call(method: String, arguments_json: String) -> MethodCallResponse {
    let arguments = match serde_json::from_str(&arguments_json) {
        Ok(value) => value,
        Err(err) => {
            return MethodCallResponse::error(
                "invalid_argument",
                format!("arguments are not valid JSON: {err}"),
            );
        }
    };
    let call = MethodCall::new(method, arguments);
    match with_runtime(|runtime| dispatch(&mut runtime.bridge, &call)) {
        Ok(MethodResponse::Success(value)) => MethodCallResponse {
            ok: true,
            value_json: Some(value.to_string()),
            error_code: None,
            message: String::new(),
        },
        Ok(MethodResponse::Error { code, message, .. }) => {
            MethodCallResponse::error(code.as_str(), message)
        }
        Ok(MethodResponse::NotImplemented) => MethodCallResponse::error(
            "not_implemented",
            format!("method `{}` is not implemented", call.method),
        ),
        Err(err) => MethodCallResponse::error("unavailable", err),
    }
}

/// Outbound event for the Dart side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEventItem {
    /// `onLocalNotification{Show,Click,ClickAction,Close}`.
    pub method: String,
    pub notification_id: String,
}

/// Relays pending platform callbacks and drains buffered events.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Events are returned oldest first and returned only once.
/// - Never panics; returns an empty list when the bridge is unavailable.
#[flutter_rust_bridge::frb(sync)]
pub fn poll_events() -> Vec<NotificationEventItem> {
    with_runtime(|runtime| {
        runtime.bridge.pump_callbacks();
        runtime
            .events
            .drain()
            .into_iter()
            .map(|message| NotificationEventItem {
                notification_id: message.notification_id().unwrap_or_default().to_string(),
                method: message.method,
            })
            .collect()
    })
    .unwrap_or_default()
}

/// Presentation policy for notifications arriving while foregrounded.
#[flutter_rust_bridge::frb(sync)]
pub fn should_present(identifier: String) -> bool {
    with_runtime(|runtime| runtime.bridge.should_present(&identifier)).unwrap_or(true)
}

/// Snapshot of the active bridge for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierStatus {
    pub backend: String,
    /// `false` when notifications are only recorded in-process.
    pub native: bool,
    /// `modern|legacy`.
    pub delivery_path: String,
    pub active_count: u32,
}

/// Returns bridge diagnostics, initializing it on first use.
#[flutter_rust_bridge::frb(sync)]
pub fn notifier_status() -> Option<NotifierStatus> {
    with_runtime(|runtime| NotifierStatus {
        backend: runtime.bridge.notifier_name().to_string(),
        native: NATIVE_BACKEND,
        delivery_path: runtime.bridge.path().as_str().to_string(),
        active_count: u32::try_from(runtime.bridge.index().len()).unwrap_or(u32::MAX),
    })
    .ok()
}

fn with_runtime<T>(f: impl FnOnce(&mut BridgeRuntime) -> T) -> Result<T, String> {
    let mut guard: MutexGuard<'_, Option<BridgeRuntime>> =
        RUNTIME.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.is_none() {
        *guard = Some(build_runtime()?);
    }
    match guard.as_mut() {
        Some(runtime) => Ok(f(runtime)),
        None => Err("notifier bridge unavailable".to_string()),
    }
}

fn build_runtime() -> Result<BridgeRuntime, String> {
    let config = BridgeConfig::from_env().map_err(|err| {
        warn!("event=notifier_init module=ffi status=error error={err}");
        format!("notifier_init failed: {err}")
    })?;
    let events = QueuedEventSink::new();
    let bridge = NotificationBridge::new(config, build_notifier(), Box::new(events.clone()));
    info!(
        "event=notifier_init module=ffi status=ok backend={} native={} path={}",
        bridge.notifier_name(),
        NATIVE_BACKEND,
        bridge.path().as_str()
    );
    if !NATIVE_BACKEND {
        warn!("event=notifier_init module=ffi status=degraded reason=no_native_backend");
    }
    Ok(BridgeRuntime { bridge, events })
}

#[cfg(all(feature = "desktop", unix, not(target_os = "macos")))]
fn build_notifier() -> Box<dyn NativeNotifier> {
    Box::new(local_notifier_core::DesktopNotifier::connect(
        DESKTOP_APP_NAME,
    ))
}

#[cfg(not(all(feature = "desktop", unix, not(target_os = "macos"))))]
fn build_notifier() -> Box<dyn NativeNotifier> {
    Box::new(local_notifier_core::StubNotifier::legacy().with_auto_confirm(true))
}
