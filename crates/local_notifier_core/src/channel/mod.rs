//! Method-channel contract.
//!
//! # Responsibility
//! - Route inbound `notify`/`close` calls to the bridge.
//! - Map bridge errors to structured channel errors instead of aborts.
//! - Define the outbound sink used for `onLocalNotification*` events.
//!
//! # Invariants
//! - Unknown methods answer `NotImplemented` without touching the bridge.
//! - Successful `notify`/`close` calls answer `true`.

use crate::bridge::{BridgeError, NotificationBridge};
use crate::model::request::{CloseRequest, NotificationRequest, RequestValidationError};
use log::debug;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const METHOD_NOTIFY: &str = "notify";
pub const METHOD_CLOSE: &str = "close";

/// Error code returned for malformed call arguments.
pub const ERROR_INVALID_ARGUMENT: &str = "invalid_argument";

/// Inbound call from the application framework.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// Reply to one `MethodCall`.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    fn invalid_argument(err: &RequestValidationError) -> Self {
        Self::Error {
            code: ERROR_INVALID_ARGUMENT.to_string(),
            message: err.to_string(),
            details: None,
        }
    }
}

impl From<BridgeError> for MethodResponse {
    fn from(value: BridgeError) -> Self {
        match value {
            BridgeError::InvalidArgument(err) => Self::invalid_argument(&err),
        }
    }
}

/// Routes one inbound call.
pub fn dispatch(bridge: &mut NotificationBridge, call: &MethodCall) -> MethodResponse {
    match call.method.as_str() {
        METHOD_NOTIFY => {
            let request = match NotificationRequest::from_arguments(&call.arguments) {
                Ok(request) => request,
                Err(err) => return MethodResponse::invalid_argument(&err),
            };
            match bridge.notify(&request) {
                Ok(_) => MethodResponse::Success(Value::Bool(true)),
                Err(err) => err.into(),
            }
        }
        METHOD_CLOSE => {
            let request = match CloseRequest::from_arguments(&call.arguments) {
                Ok(request) => request,
                Err(err) => return MethodResponse::invalid_argument(&err),
            };
            match bridge.close(&request) {
                Ok(_) => MethodResponse::Success(Value::Bool(true)),
                Err(err) => err.into(),
            }
        }
        other => {
            debug!("event=dispatch module=channel status=not_implemented method={other}");
            MethodResponse::NotImplemented
        }
    }
}

/// Outbound half of the channel.
pub trait EventSink: Send {
    fn invoke_method(&self, method: &str, arguments: Value);
}

/// One buffered outbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessage {
    pub method: String,
    pub arguments: Value,
}

impl ChannelMessage {
    /// `notificationId` argument, when present.
    pub fn notification_id(&self) -> Option<&str> {
        self.arguments.get("notificationId").and_then(Value::as_str)
    }
}

/// Sink buffering outbound calls for hosts that poll.
///
/// Clones share one queue.
#[derive(Debug, Clone, Default)]
pub struct QueuedEventSink {
    queue: Arc<Mutex<VecDeque<ChannelMessage>>>,
}

impl QueuedEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns buffered messages, oldest first.
    pub fn drain(&self) -> Vec<ChannelMessage> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ChannelMessage>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for QueuedEventSink {
    fn invoke_method(&self, method: &str, arguments: Value) {
        self.lock().push_back(ChannelMessage {
            method: method.to_string(),
            arguments,
        });
    }
}
