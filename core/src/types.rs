//! Domain types decoded from backend responses.
//!
//! Field names follow the backend's lowerCamelCase JSON. Unknown
//! fields are ignored so the client keeps working as the backend
//! grows its payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::response::Response;

/// An authentication session.
///
/// Only the bearer token and its expiry are retained; everything else
/// in the session payload is irrelevant to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token used to authorize subsequent requests.
    pub token: String,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

/// A site user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user id.
    pub id: i64,
    /// Display name.
    pub display_name: String,
    /// Email address, which doubles as the login.
    pub email: String,
    /// Verbs the user may perform (extended metadata only).
    #[serde(default)]
    pub verbs: Option<Vec<String>>,
}

/// An assignable role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Unique role id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// System name, for example `manager` or `viewer`.
    #[serde(default)]
    pub system: Option<String>,
    /// Verbs the role grants.
    pub verbs: Vec<String>,
}

/// A project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Whether the project is archived.
    #[serde(default)]
    pub archived: Option<bool>,
    /// Managed-encryption key id, if encryption is enabled.
    #[serde(default)]
    pub key_id: Option<i64>,
    /// Number of forms (extended metadata only).
    #[serde(default)]
    pub forms: Option<i64>,
    /// Number of app users (extended metadata only).
    #[serde(default)]
    pub app_users: Option<i64>,
    /// Timestamp of the latest submission (extended metadata only).
    #[serde(default)]
    pub last_submission: Option<DateTime<Utc>>,
    /// When the project was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A form within a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    /// Id of the project the form belongs to.
    pub project_id: i64,
    /// The form's `xmlFormId`, unique within the project.
    pub xml_form_id: String,
    /// Display name, if the form defines one.
    #[serde(default)]
    pub name: Option<String>,
    /// Form version string.
    #[serde(default)]
    pub version: Option<String>,
    /// Lifecycle state, for example `open` or `closed`.
    #[serde(default)]
    pub state: Option<String>,
    /// Number of submissions (extended metadata only).
    #[serde(default)]
    pub submissions: Option<i64>,
    /// Timestamp of the latest submission (extended metadata only).
    #[serde(default)]
    pub last_submission: Option<DateTime<Utc>>,
    /// When the form was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A form attachment (media file or data file referenced by a form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormAttachment {
    /// Attachment type, for example `image` or `video`.
    #[serde(rename = "type")]
    pub kind: String,
    /// File name the form expects.
    pub name: String,
    /// Whether the file has been uploaded.
    pub exists: bool,
    /// When the attachment was last updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An app user (field key) of a project.
///
/// The backend response does not include the project id, so it is
/// parsed from the request URL during decoding and injected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldKey {
    /// Id of the project the app user belongs to. Not part of the
    /// response body; filled in from the request URL.
    #[serde(default)]
    pub project_id: i64,
    /// Unique actor id.
    pub id: i64,
    /// Display name.
    pub display_name: String,
    /// Access token, absent once revoked.
    #[serde(default)]
    pub token: Option<String>,
    /// When the app user was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the app user last connected.
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
}

/// The backups configuration.
///
/// The backend answers the config endpoint with a `404.1` Problem when
/// backups have never been set up, so decoding is driven by the
/// response status rather than the body shape alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupsConfig {
    /// Backups have not been configured.
    NotConfigured,
    /// Backups are configured.
    Configured {
        /// When the configuration was set.
        set_at: DateTime<Utc>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupsConfigBody {
    set_at: DateTime<Utc>,
}

impl BackupsConfig {
    /// Decode a backups-config response. A non-2xx response means
    /// backups are not configured.
    ///
    /// # Errors
    ///
    /// Returns the underlying deserialization error if a successful
    /// response body does not carry a `setAt` timestamp.
    pub fn from_response(response: &Response) -> Result<BackupsConfig, serde_json::Error> {
        if !response.is_success() {
            return Ok(BackupsConfig::NotConfigured);
        }
        let body: BackupsConfigBody = serde_json::from_value(response.body.clone())?;
        Ok(BackupsConfig::Configured { set_at: body.set_at })
    }

    /// Whether backups are configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        matches!(self, BackupsConfig::Configured { .. })
    }
}

/// A server audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    /// The action that was logged, for example `user.create`.
    pub action: String,
    /// Id of the actor who performed the action.
    #[serde(default)]
    pub actor_id: Option<i64>,
    /// Id of the actee the action was performed on.
    #[serde(default)]
    pub actee_id: Option<String>,
    /// Action-specific details.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    /// When the action was logged.
    pub logged_at: DateTime<Utc>,
}
