//! Core feedback types.
//!
//! This module defines the stored [`Feedback`] record, the permissive
//! [`FeedbackInput`] shape accepted from clients, the validated
//! [`NewFeedback`] handed to storage, and the serialized
//! [`FeedbackRepresentation`] returned over the API.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Format a timestamp the way it is persisted and serialized.
///
/// RFC 3339 with fixed microsecond precision and a `Z` suffix, so that
/// lexical order in `SQLite` matches chronological order.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A stored feedback submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Identifier assigned by storage.
    pub id: i64,
    /// Submitter name, never blank.
    pub name: String,
    /// Optional contact address; `None` rather than an empty string.
    pub email: Option<String>,
    /// Feedback body, never blank.
    pub message: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    /// Convert this record to its plain key-value form for JSON output.
    #[must_use]
    pub fn to_representation(&self) -> FeedbackRepresentation {
        FeedbackRepresentation {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            message: self.message.clone(),
            created_at: format_timestamp(&self.created_at),
        }
    }
}

/// Serialized form of a [`Feedback`] record.
///
/// `email` is always present in the output, as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRepresentation {
    /// Record identifier.
    pub id: i64,
    /// Submitter name.
    pub name: String,
    /// Contact address or `null`.
    pub email: Option<String>,
    /// Feedback body.
    pub message: String,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

impl From<&Feedback> for FeedbackRepresentation {
    fn from(feedback: &Feedback) -> Self {
        feedback.to_representation()
    }
}

/// Raw create request as submitted by a client.
///
/// Every field is optional; `null` and missing are treated the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedbackInput {
    /// Submitted name.
    pub name: Option<String>,
    /// Submitted email.
    pub email: Option<String>,
    /// Submitted message.
    pub message: Option<String>,
}

impl FeedbackInput {
    /// Parse a request body.
    ///
    /// Never fails: a body that is not a JSON object with string fields
    /// yields an empty input, which then fails validation like any other
    /// request missing its required fields.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Trim all fields and check that `name` and `message` are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `name` or `message` is empty after trimming.
    pub fn validate(&self) -> Result<NewFeedback> {
        let name = trimmed(self.name.as_deref());
        let message = trimmed(self.message.as_deref());
        if name.is_empty() || message.is_empty() {
            return Err(Error::Validation);
        }

        let email = trimmed(self.email.as_deref());
        Ok(NewFeedback {
            name: name.to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
            message: message.to_string(),
        })
    }
}

fn trimmed(value: Option<&str>) -> &str {
    value.map_or("", str::trim)
}

/// A validated feedback submission, ready to be stored.
///
/// Only obtainable through [`FeedbackInput::validate`], so storage never
/// sees a blank name or message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    name: String,
    email: Option<String>,
    message: String,
}

impl NewFeedback {
    /// Trimmed, non-empty name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed email, if one was given.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Trimmed, non-empty message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
