//! Domain types shared across the client core.
//!
//! Records pushed by the store are decoded into the [`Record`] tagged union
//! at the subscription boundary rather than passed around as raw JSON, so a
//! malformed document becomes a reportable error instead of a downstream
//! panic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

// ============================================================================
// Principal / Role
// ============================================================================

/// Dashboard role attached to an authenticated identity.
///
/// This layer only transports the role; role gating lives in the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

/// The authenticated identity associated with a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
}

// ============================================================================
// Record union
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub name: String,
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub student_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub name: String,
    #[serde(default)]
    pub class_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub title: String,
    pub subject_id: String,
    pub teacher_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEventRecord {
    pub title: String,
    pub class_id: String,
    /// ISO-8601 start/end, passed through untouched.
    pub starts_at: String,
    pub ends_at: String,
}

/// Tagged union over the entity kinds this application stores.
///
/// The `kind` tag is part of every stored document; decoding rejects unknown
/// kinds and malformed bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Record {
    User(UserRecord),
    Class(ClassRecord),
    Subject(SubjectRecord),
    Course(CourseRecord),
    ScheduleEvent(ScheduleEventRecord),
}

impl Record {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Class(_) => "class",
            Self::Subject(_) => "subject",
            Self::Course(_) => "course",
            Self::ScheduleEvent(_) => "scheduleEvent",
        }
    }
}

// ============================================================================
// Document
// ============================================================================

/// One stored record tagged with its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(flatten)]
    pub record: Record,
}

impl Document {
    /// Decode a raw snapshot value at the subscription boundary.
    ///
    /// `path` is used only for the error message.
    pub fn decode(path: &str, id: impl Into<String>, value: Value) -> Result<Self, ClientError> {
        let record: Record =
            serde_json::from_value(value).map_err(|e| ClientError::InvalidData {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            id: id.into(),
            record,
        })
    }
}
