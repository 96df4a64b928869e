//! ProjectDesk domain types
//!
//! Orders and contact messages are free-text records. Incoming payloads
//! tolerate any missing field; only the required fields are checked, and
//! persisted records are never modified afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DeskError, Result};
use crate::text;

/// Fields of a project order as submitted by a student
///
/// All fields are optional free text at the type level. `studentName`,
/// `mobile` and `projectTitle` are required at creation, see
/// [`OrderDetails::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub institute_name: Option<String>,
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub project_serial: Option<String>,
    /// "yes" / "no" in practice, kept as free text
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub ordered_from_idea: Option<String>,
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub project_domain: Option<String>,
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub project_concept: Option<String>,
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "text::optional", skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
}

impl OrderDetails {
    pub const REQUIRED_MESSAGE: &'static str = "studentName, mobile and projectTitle are required";

    /// Check the required fields, returning the details unchanged when present
    pub fn validate(self) -> Result<Self> {
        let missing = [&self.student_name, &self.mobile, &self.project_title]
            .iter()
            .any(|field| field.as_deref().map_or(true, |v| v.trim().is_empty()));

        if missing {
            return Err(DeskError::Validation(Self::REQUIRED_MESSAGE.to_string()));
        }
        Ok(self)
    }
}

/// A persisted project order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Server-assigned identifier
    pub id: Uuid,
    #[serde(flatten)]
    pub details: OrderDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a record from validated details
    pub fn new(id: Uuid, details: OrderDetails, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            details,
            created_at,
            updated_at: created_at,
        }
    }

    /// Recipient for the confirmation mail, if the student left one
    pub fn email(&self) -> Option<&str> {
        self.details
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

/// Contact form payload as submitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    #[serde(default, deserialize_with = "text::optional")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text::optional")]
    pub mobile: Option<String>,
    #[serde(default, deserialize_with = "text::optional")]
    pub message: Option<String>,
}

impl ContactSubmission {
    pub const REQUIRED_MESSAGE: &'static str = "name, mobile and message are required";

    /// Check that every field is present and non-blank
    pub fn validate(self) -> Result<NewContactMessage> {
        let required = |v: Option<String>| v.as_deref().and_then(text::normalize);

        match (
            required(self.name),
            required(self.mobile),
            required(self.message),
        ) {
            (Some(name), Some(mobile), Some(message)) => Ok(NewContactMessage {
                name,
                mobile,
                message,
            }),
            _ => Err(DeskError::Validation(Self::REQUIRED_MESSAGE.to_string())),
        }
    }
}

/// A validated contact message ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub mobile: String,
    pub message: String,
}

/// A persisted contact message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactMessage {
    pub fn new(id: Uuid, message: NewContactMessage, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: message.name,
            mobile: message.mobile,
            message: message.message,
            created_at,
            updated_at: created_at,
        }
    }
}
