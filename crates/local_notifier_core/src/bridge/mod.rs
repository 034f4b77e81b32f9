//! Notification bridge between the method channel and the native notifier.
//!
//! # Responsibility
//! - Validate inbound requests and translate them for the probed delivery path.
//! - Track delivered notifications so both paths can withdraw them.
//! - Relay platform callbacks as outbound channel events.
//!
//! # Invariants
//! - The delivery path is chosen once at construction and never changes.
//! - Platform failures degrade to warnings; only malformed input fails a call.
//! - `closed` is emitted exactly once per tracked notification, on explicit close.
//! - `shown` is a legacy-path milestone; modern delivery confirmations are dropped.
//! - A notification leaving the index is withdrawn from the platform as well.
//! - Every modern user response is acknowledged, whichever branch handles it.

use crate::channel::EventSink;
use crate::config::BridgeConfig;
use crate::model::event::{NotificationEvent, NotificationEventKind};
use crate::model::request::{CloseRequest, NotificationRequest, RequestValidationError};
use crate::platform::{
    ActivationKind, DeliveryPath, NativeError, NativeNotifier, PlatformCallback,
    ACTION_IDENTIFIER,
};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod index;
pub mod translate;

use index::{ActiveNotificationIndex, IndexEntry};

/// Caller-facing failures of a bridge call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    InvalidArgument(RequestValidationError),
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(err) => write!(f, "invalid argument: {err}"),
        }
    }
}

impl Error for BridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
        }
    }
}

impl From<RequestValidationError> for BridgeError {
    fn from(value: RequestValidationError) -> Self {
        Self::InvalidArgument(value)
    }
}

/// Degraded outcomes that do not fail the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeWarning {
    CategoryRegistrationFailed(NativeError),
    DeliveryFailed(NativeError),
    WithdrawFailed(NativeError),
    /// Actions beyond the first were not surfaced.
    DroppedActions { count: usize },
    /// Oldest tracked notification withdrawn and forgotten to stay within
    /// capacity.
    Evicted { identifier: String },
}

impl Display for BridgeWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CategoryRegistrationFailed(err)
            | Self::DeliveryFailed(err)
            | Self::WithdrawFailed(err) => write!(f, "{err}"),
            Self::DroppedActions { count } => {
                write!(f, "only the first action is shown; dropped {count}")
            }
            Self::Evicted { identifier } => {
                write!(f, "withdrew `{identifier}` to stay within index capacity")
            }
        }
    }
}

/// Outcome of one `notify` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyReport {
    pub identifier: String,
    pub path: DeliveryPath,
    /// Whether the platform accepted the delivery call.
    pub delivered: bool,
    pub warnings: Vec<BridgeWarning>,
}

/// Outcome of one `close` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReport {
    pub identifier: String,
    /// `false` when the identifier was not tracked.
    pub closed: bool,
    pub warnings: Vec<BridgeWarning>,
}

/// Bridge instance bound to one notifier and one outbound sink.
pub struct NotificationBridge {
    config: BridgeConfig,
    path: DeliveryPath,
    notifier: Box<dyn NativeNotifier>,
    sink: Box<dyn EventSink>,
    index: ActiveNotificationIndex,
}

impl NotificationBridge {
    /// Creates a bridge and selects the delivery path.
    ///
    /// `config.forced_path` wins over the notifier capability probe.
    pub fn new(
        config: BridgeConfig,
        notifier: Box<dyn NativeNotifier>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        let path = config
            .forced_path
            .unwrap_or_else(|| DeliveryPath::probe(&notifier.capabilities()));
        let index = ActiveNotificationIndex::with_capacity(config.index_capacity);
        info!(
            "event=bridge_init module=bridge status=ok channel={} backend={} path={} index_capacity={}",
            config.channel_name,
            notifier.name(),
            path.as_str(),
            index.capacity()
        );
        Self {
            config,
            path,
            notifier,
            sink,
            index,
        }
    }

    pub fn path(&self) -> DeliveryPath {
        self.path
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn notifier_name(&self) -> &'static str {
        self.notifier.name()
    }

    pub fn index(&self) -> &ActiveNotificationIndex {
        &self.index
    }

    /// Shows one notification.
    ///
    /// # Errors
    /// - `InvalidArgument` when the request fails validation; nothing is
    ///   delivered or tracked in that case.
    pub fn notify(&mut self, request: &NotificationRequest) -> Result<NotifyReport, BridgeError> {
        request.validate()?;
        let identifier = request.identifier.as_str();
        let mut warnings = Vec::new();

        let dropped = request.dropped_action_count();
        if dropped > 0 {
            warn!(
                "event=notify module=bridge status=degraded reason=dropped_actions id={} count={}",
                identifier, dropped
            );
            warnings.push(BridgeWarning::DroppedActions { count: dropped });
        }

        let notification = match self.path {
            DeliveryPath::Modern => {
                let (notification, category) =
                    translate::modern_notification(request, &self.config);
                if let Some(category) = category {
                    if let Err(err) = self
                        .notifier
                        .register_categories(std::slice::from_ref(&category))
                    {
                        warn!(
                            "event=register_category module=bridge status=error id={} error={}",
                            identifier, err
                        );
                        warnings.push(BridgeWarning::CategoryRegistrationFailed(err));
                    }
                }
                notification
            }
            DeliveryPath::Legacy => translate::legacy_notification(request, &self.config),
        };

        let delivered = match self.notifier.deliver(&notification) {
            Ok(handle) => {
                let outcome = self.index.insert(
                    identifier,
                    IndexEntry {
                        handle,
                        has_action: request.primary_action().is_some(),
                    },
                );
                if outcome.replaced.is_some() {
                    debug!(
                        "event=notify module=bridge status=replaced id={}",
                        identifier
                    );
                }
                if let Some((evicted, entry)) = outcome.evicted {
                    warn!(
                        "event=index_evict module=bridge status=degraded id={} capacity={}",
                        evicted,
                        self.index.capacity()
                    );
                    let withdraw_result = self.notifier.withdraw(&entry.handle);
                    warnings.push(BridgeWarning::Evicted {
                        identifier: evicted,
                    });
                    if let Err(err) = withdraw_result {
                        warn!(
                            "event=withdraw module=bridge status=error reason=evicted error={}",
                            err
                        );
                        warnings.push(BridgeWarning::WithdrawFailed(err));
                    }
                }
                true
            }
            Err(err) => {
                warn!(
                    "event=deliver module=bridge status=error id={} error={}",
                    identifier, err
                );
                warnings.push(BridgeWarning::DeliveryFailed(err));
                false
            }
        };

        info!(
            "event=notify module=bridge status=ok id={} path={} has_action={} delivered={}",
            identifier,
            self.path.as_str(),
            request.primary_action().is_some(),
            delivered
        );
        Ok(NotifyReport {
            identifier: identifier.to_string(),
            path: self.path,
            delivered,
            warnings,
        })
    }

    /// Withdraws one tracked notification and emits `closed`.
    ///
    /// Untracked identifiers are a no-op.
    ///
    /// # Errors
    /// - `InvalidArgument` when the identifier is blank.
    pub fn close(&mut self, request: &CloseRequest) -> Result<CloseReport, BridgeError> {
        request.validate()?;
        let identifier = request.identifier.as_str();

        let Some(entry) = self.index.remove(identifier) else {
            debug!("event=close module=bridge status=miss id={}", identifier);
            return Ok(CloseReport {
                identifier: identifier.to_string(),
                closed: false,
                warnings: Vec::new(),
            });
        };

        let mut warnings = Vec::new();
        if let Err(err) = self.notifier.withdraw(&entry.handle) {
            warn!(
                "event=withdraw module=bridge status=error id={} error={}",
                identifier, err
            );
            warnings.push(BridgeWarning::WithdrawFailed(err));
        }
        self.emit(NotificationEvent::new(
            NotificationEventKind::Closed,
            identifier,
        ));

        info!("event=close module=bridge status=ok id={}", identifier);
        Ok(CloseReport {
            identifier: identifier.to_string(),
            closed: true,
            warnings,
        })
    }

    /// Relays one platform callback; returns the emitted event, if any.
    pub fn handle_callback(&mut self, callback: PlatformCallback) -> Option<NotificationEvent> {
        match callback {
            PlatformCallback::Delivered { identifier } => match self.path {
                DeliveryPath::Legacy => Some(self.emit(NotificationEvent::new(
                    NotificationEventKind::Shown,
                    identifier,
                ))),
                DeliveryPath::Modern => {
                    debug!(
                        "event=delivered module=bridge status=ignored path=modern id={}",
                        identifier
                    );
                    None
                }
            },
            PlatformCallback::Activated {
                identifier,
                activation,
            } => {
                let kind = match activation {
                    ActivationKind::ActionButtonClicked if self.may_have_action(&identifier) => {
                        NotificationEventKind::ActionClicked
                    }
                    _ => NotificationEventKind::Clicked,
                };
                Some(self.emit(NotificationEvent::new(kind, identifier)))
            }
            PlatformCallback::Response {
                identifier,
                action_identifier,
                completion,
            } => {
                let event = if action_identifier == ACTION_IDENTIFIER
                    && self.may_have_action(&identifier)
                {
                    Some(self.emit(NotificationEvent::new(
                        NotificationEventKind::ActionClicked,
                        identifier,
                    )))
                } else {
                    debug!(
                        "event=response module=bridge status=ignored id={} action={}",
                        identifier, action_identifier
                    );
                    None
                };
                completion.complete();
                event
            }
            PlatformCallback::Expired { identifier } => {
                if self.index.remove(&identifier).is_some() {
                    debug!("event=expire module=bridge status=ok id={}", identifier);
                }
                None
            }
        }
    }

    /// Drains pending notifier callbacks and relays them in order.
    pub fn pump_callbacks(&mut self) -> Vec<NotificationEvent> {
        let callbacks = self.notifier.take_callbacks();
        callbacks
            .into_iter()
            .filter_map(|callback| self.handle_callback(callback))
            .collect()
    }

    /// Presentation policy for notifications arriving while foregrounded.
    pub fn should_present(&self, identifier: &str) -> bool {
        debug!(
            "event=should_present module=bridge id={} present={}",
            identifier, self.config.present_in_foreground
        );
        self.config.present_in_foreground
    }

    // Untracked identifiers keep whatever the platform reports.
    fn may_have_action(&self, identifier: &str) -> bool {
        self.index
            .get(identifier)
            .map_or(true, |entry| entry.has_action)
    }

    fn emit(&self, event: NotificationEvent) -> NotificationEvent {
        self.sink
            .invoke_method(event.method_name(), event.arguments());
        info!(
            "event=relay module=bridge status=ok kind={} id={}",
            event.kind.as_str(),
            event.identifier
        );
        event
    }
}
