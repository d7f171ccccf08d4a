//! Cached values and the per-key decode table.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::key::Key;
use crate::response::Response;
use crate::types::{
    Audit, BackupsConfig, FieldKey, Form, FormAttachment, Project, Role, Session, User,
};

/// A failure to decode a response body into a domain value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body did not match the expected shape for the key.
    #[error("unexpected response body for {key}")]
    Json {
        /// The key being decoded.
        key: Key,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The project id could not be parsed from the request URL.
    #[error("could not determine the project id from request URL {url}")]
    ProjectIdFromUrl {
        /// The offending URL.
        url: String,
    },
}

/// The decoded payload stored in one cache slot.
///
/// One typed variant per domain with a dedicated decoder; domains the
/// client consumes as-is (and fulfilled-Problem responses, which skip
/// decoding entirely) are stored under [`CachedValue::Raw`]. Decoding
/// is an exhaustive match over [`Key`], so adding a key without
/// deciding how to decode it is a compile error.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// The current session.
    Session(Session),
    /// The current user.
    CurrentUser(User),
    /// All site users.
    Users(Vec<User>),
    /// A single user.
    User(User),
    /// All assignable roles.
    Roles(Vec<Role>),
    /// All projects.
    Projects(Vec<Project>),
    /// A single project.
    Project(Project),
    /// Forms of a project.
    Forms(Vec<Form>),
    /// A single form.
    Form(Form),
    /// Attachments of a form.
    Attachments(Vec<FormAttachment>),
    /// App users of a project.
    FieldKeys(Vec<FieldKey>),
    /// The backups configuration.
    BackupsConfig(BackupsConfig),
    /// The server audit log.
    Audits(Vec<Audit>),
    /// An undecoded JSON body.
    Raw(Value),
}

fn typed<T: DeserializeOwned>(key: Key, response: &Response) -> Result<T, DecodeError> {
    serde_json::from_value(response.body.clone())
        .map_err(|source| DecodeError::Json { key, source })
}

/// Parse the project id out of a request path such as
/// `/v1/projects/7/app-users` (segment 3, as with an absolute URL the
/// host is stripped first).
fn project_id_from_url(url: &str) -> Result<i64, DecodeError> {
    let path = match url.find("://") {
        Some(scheme_end) => {
            let after_scheme = &url[scheme_end + 3..];
            after_scheme
                .find('/')
                .map_or("", |slash| &after_scheme[slash..])
        },
        None => url,
    };
    path.split('/')
        .nth(3)
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| DecodeError::ProjectIdFromUrl { url: url.to_string() })
}

impl CachedValue {
    /// Decode a successful response into the value cached for `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the body does not match the key's
    /// expected shape, or if required request metadata (the project id
    /// in the URL, for app users) cannot be recovered.
    pub fn decode(key: Key, response: &Response) -> Result<CachedValue, DecodeError> {
        match key {
            Key::Session => Ok(CachedValue::Session(typed(key, response)?)),
            Key::CurrentUser => Ok(CachedValue::CurrentUser(typed(key, response)?)),
            Key::Users => Ok(CachedValue::Users(typed(key, response)?)),
            Key::User => Ok(CachedValue::User(typed(key, response)?)),
            Key::Roles => Ok(CachedValue::Roles(typed(key, response)?)),
            Key::Projects => Ok(CachedValue::Projects(typed(key, response)?)),
            Key::Project => Ok(CachedValue::Project(typed(key, response)?)),
            Key::Forms => Ok(CachedValue::Forms(typed(key, response)?)),
            Key::Form => Ok(CachedValue::Form(typed(key, response)?)),
            Key::Attachments => Ok(CachedValue::Attachments(typed(key, response)?)),
            Key::FieldKeys => {
                let mut field_keys: Vec<FieldKey> = typed(key, response)?;
                // The URL is consulted only when there is something to
                // annotate, matching how the endpoint is used.
                if !field_keys.is_empty() {
                    let project_id = project_id_from_url(&response.url)?;
                    for field_key in &mut field_keys {
                        field_key.project_id = project_id;
                    }
                }
                Ok(CachedValue::FieldKeys(field_keys))
            },
            Key::BackupsConfig => {
                let config = BackupsConfig::from_response(response)
                    .map_err(|source| DecodeError::Json { key, source })?;
                Ok(CachedValue::BackupsConfig(config))
            },
            Key::Audits => Ok(CachedValue::Audits(typed(key, response)?)),
            // Domains the client consumes without decoding.
            Key::AssignmentActors
            | Key::ProjectAssignments
            | Key::Schema
            | Key::FormAssignments
            | Key::FormKeys
            | Key::SubmissionsChunk => Ok(CachedValue::Raw(response.body.clone())),
        }
    }

    /// The session, if this value is one.
    #[must_use]
    pub const fn as_session(&self) -> Option<&Session> {
        match self {
            CachedValue::Session(session) => Some(session),
            _ => None,
        }
    }

    /// The roles list, if this value is one.
    #[must_use]
    pub const fn as_roles(&self) -> Option<&Vec<Role>> {
        match self {
            CachedValue::Roles(roles) => Some(roles),
            _ => None,
        }
    }

    /// The app-user list, if this value is one.
    #[must_use]
    pub const fn as_field_keys(&self) -> Option<&Vec<FieldKey>> {
        match self {
            CachedValue::FieldKeys(field_keys) => Some(field_keys),
            _ => None,
        }
    }

    /// The undecoded body, if this value is one.
    #[must_use]
    pub const fn as_raw(&self) -> Option<&Value> {
        match self {
            CachedValue::Raw(body) => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_a_session() {
        let response = Response::ok(
            "/v1/sessions",
            json!({
                "token": "abc123",
                "expiresAt": "2026-09-01T00:00:00.000Z",
                "createdAt": "2026-08-01T00:00:00.000Z"
            }),
        );
        let value = CachedValue::decode(Key::Session, &response).unwrap();
        let session = value.as_session().unwrap();
        assert_eq!(session.token, "abc123");
    }

    #[test]
    fn decodes_every_key_without_panicking() {
        // Bodies that satisfy each key's decoder; list-shaped domains
        // decode from empty arrays.
        for key in Key::ALL {
            let body = match key {
                Key::Session => json!({
                    "token": "t",
                    "expiresAt": "2026-09-01T00:00:00.000Z"
                }),
                Key::CurrentUser | Key::User => json!({
                    "id": 1, "displayName": "Ada", "email": "ada@example.com"
                }),
                Key::Project => json!({ "id": 1, "name": "Crops" }),
                Key::Form => json!({ "projectId": 1, "xmlFormId": "f" }),
                Key::BackupsConfig => json!({ "setAt": "2026-02-01T12:00:00.000Z" }),
                Key::Schema => json!([{ "path": ["name"], "type": "string" }]),
                _ => json!([]),
            };
            let response = Response::ok("/v1/whatever", body);
            CachedValue::decode(key, &response).unwrap();
        }
    }

    #[test]
    fn field_keys_take_their_project_id_from_the_url() {
        let response = Response::ok(
            "/v1/projects/7/app-users",
            json!([{ "id": 41, "displayName": "Collector", "token": "xyz" }]),
        );
        let value = CachedValue::decode(Key::FieldKeys, &response).unwrap();
        let field_keys = value.as_field_keys().unwrap();
        assert_eq!(field_keys[0].project_id, 7);
    }

    #[test]
    fn field_keys_handle_absolute_urls() {
        let response = Response::ok(
            "https://central.example.com/v1/projects/12/app-users",
            json!([{ "id": 1, "displayName": "Collector" }]),
        );
        let value = CachedValue::decode(Key::FieldKeys, &response).unwrap();
        assert_eq!(value.as_field_keys().unwrap()[0].project_id, 12);
    }

    #[test]
    fn empty_field_keys_do_not_consult_the_url() {
        let response = Response::ok("not a url", json!([]));
        let value = CachedValue::decode(Key::FieldKeys, &response).unwrap();
        assert_eq!(value.as_field_keys().unwrap().len(), 0);
    }

    #[test]
    fn undecoded_domains_store_the_body_as_is() {
        let body = json!({ "value": [], "@odata.count": 0 });
        let response = Response::ok("/v1/odata", body.clone());
        let value = CachedValue::decode(Key::SubmissionsChunk, &response).unwrap();
        assert_eq!(value.as_raw(), Some(&body));
    }

    #[test]
    fn shape_mismatch_is_an_error_not_a_panic() {
        let response = Response::ok("/v1/users", json!({ "not": "a list" }));
        let result = CachedValue::decode(Key::Users, &response);
        assert!(matches!(result, Err(DecodeError::Json { key: Key::Users, .. })));
    }
}
