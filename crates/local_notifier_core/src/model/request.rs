//! Inbound request records for `notify` and `close`.
//!
//! # Responsibility
//! - Decode channel argument maps into typed, request-scoped records.
//! - Reject malformed input with a typed error instead of aborting.
//!
//! # Invariants
//! - `identifier` is non-empty after trimming for every accepted request.
//! - Only the first action is honored; extra actions are reported, not kept
//!   silently.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One user-facing action button requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub text: String,
}

impl NotificationAction {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Request to show one notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    /// Caller-assigned correlation key, unique per active notification.
    pub identifier: String,
    pub title: String,
    pub body: String,
    /// Rendered only where the delivery path supports it.
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Ordered actions; only `actions[0]` becomes a button.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub actions: Vec<NotificationAction>,
}

impl NotificationRequest {
    /// Creates a request without subtitle or actions.
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            body: body.into(),
            subtitle: None,
            actions: Vec::new(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_action(mut self, text: impl Into<String>) -> Self {
        self.actions.push(NotificationAction::new(text));
        self
    }

    /// Decodes and validates a channel argument map.
    pub fn from_arguments(arguments: &Value) -> Result<Self, RequestValidationError> {
        let request: Self = decode_arguments(arguments)?;
        request.validate()?;
        Ok(request)
    }

    /// Checks request invariants.
    ///
    /// # Errors
    /// - `EmptyIdentifier` when `identifier` is blank.
    /// - `EmptyActionText` when any action carries blank text.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        validate_identifier(&self.identifier)?;
        for (index, action) in self.actions.iter().enumerate() {
            if action.text.trim().is_empty() {
                return Err(RequestValidationError::EmptyActionText { index });
            }
        }
        Ok(())
    }

    /// Label of the single action button, if any.
    pub fn primary_action(&self) -> Option<&str> {
        self.actions.first().map(|action| action.text.as_str())
    }

    /// Number of supplied actions beyond the first one.
    pub fn dropped_action_count(&self) -> usize {
        self.actions.len().saturating_sub(1)
    }
}

/// Request to withdraw one previously delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseRequest {
    pub identifier: String,
}

impl CloseRequest {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// Decodes and validates a channel argument map.
    pub fn from_arguments(arguments: &Value) -> Result<Self, RequestValidationError> {
        let request: Self = decode_arguments(arguments)?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), RequestValidationError> {
        validate_identifier(&self.identifier)
    }
}

/// Input-shape errors for inbound requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    /// Arguments were not a map.
    NotAMap,
    /// Field missing or carrying the wrong type.
    Malformed(String),
    EmptyIdentifier,
    EmptyActionText { index: usize },
}

impl Display for RequestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAMap => write!(f, "arguments must be a map"),
            Self::Malformed(details) => write!(f, "malformed arguments: {details}"),
            Self::EmptyIdentifier => write!(f, "identifier must not be empty"),
            Self::EmptyActionText { index } => {
                write!(f, "actions[{index}].text must not be empty")
            }
        }
    }
}

impl Error for RequestValidationError {}

fn validate_identifier(identifier: &str) -> Result<(), RequestValidationError> {
    if identifier.trim().is_empty() {
        return Err(RequestValidationError::EmptyIdentifier);
    }
    Ok(())
}

fn decode_arguments<T: for<'de> Deserialize<'de>>(
    arguments: &Value,
) -> Result<T, RequestValidationError> {
    if !arguments.is_object() {
        return Err(RequestValidationError::NotAMap);
    }
    T::deserialize(arguments).map_err(|err| RequestValidationError::Malformed(err.to_string()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<NotificationAction>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<NotificationAction>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::{CloseRequest, NotificationRequest, RequestValidationError};
    use serde_json::json;

    #[test]
    fn decodes_full_argument_map() {
        let request = NotificationRequest::from_arguments(&json!({
            "identifier": "n1",
            "title": "T",
            "body": "B",
            "subtitle": "S",
            "actions": [{"text": "Reply"}, {"text": "Later"}],
        }))
        .expect("valid request");

        assert_eq!(request.identifier, "n1");
        assert_eq!(request.subtitle.as_deref(), Some("S"));
        assert_eq!(request.primary_action(), Some("Reply"));
        assert_eq!(request.dropped_action_count(), 1);
    }

    #[test]
    fn null_actions_decode_as_empty() {
        let request = NotificationRequest::from_arguments(&json!({
            "identifier": "n1",
            "title": "T",
            "body": "B",
            "actions": null,
        }))
        .expect("null actions accepted");
        assert!(request.actions.is_empty());
        assert_eq!(request.primary_action(), None);
        assert_eq!(request.dropped_action_count(), 0);
    }

    #[test]
    fn missing_title_is_malformed() {
        let err = NotificationRequest::from_arguments(&json!({
            "identifier": "n1",
            "body": "B",
        }))
        .expect_err("missing title must fail");
        assert!(matches!(err, RequestValidationError::Malformed(_)));
    }

    #[test]
    fn mistyped_identifier_is_malformed() {
        let err = NotificationRequest::from_arguments(&json!({
            "identifier": 42,
            "title": "T",
            "body": "B",
        }))
        .expect_err("numeric identifier must fail");
        assert!(matches!(err, RequestValidationError::Malformed(_)));
    }

    #[test]
    fn blank_identifier_is_rejected() {
        let err = NotificationRequest::new("  ", "T", "B")
            .validate()
            .expect_err("blank identifier must fail");
        assert_eq!(err, RequestValidationError::EmptyIdentifier);
    }

    #[test]
    fn blank_action_text_is_rejected() {
        let err = NotificationRequest::new("n1", "T", "B")
            .with_action(" ")
            .validate()
            .expect_err("blank action must fail");
        assert_eq!(err, RequestValidationError::EmptyActionText { index: 0 });
    }

    #[test]
    fn non_map_arguments_are_rejected() {
        let err = CloseRequest::from_arguments(&json!(["n1"])).expect_err("list must fail");
        assert_eq!(err, RequestValidationError::NotAMap);
    }

    #[test]
    fn close_request_requires_identifier() {
        let err = CloseRequest::from_arguments(&json!({})).expect_err("missing id must fail");
        assert!(matches!(err, RequestValidationError::Malformed(_)));

        let err = CloseRequest::from_arguments(&json!({"identifier": ""}))
            .expect_err("empty id must fail");
        assert_eq!(err, RequestValidationError::EmptyIdentifier);
    }
}
