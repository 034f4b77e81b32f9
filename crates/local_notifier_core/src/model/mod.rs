//! Request and event records crossing the method channel.
//!
//! # Responsibility
//! - Define typed shapes for inbound calls and outbound events.
//! - Keep wire naming (`notificationId`, `onLocalNotification*`) in one place.
//!
//! # Invariants
//! - Records are request-scoped; nothing here outlives one call or callback.

pub mod event;
pub mod request;
