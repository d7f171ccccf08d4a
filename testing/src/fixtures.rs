//! JSON fixtures for common backend payloads.

use serde_json::{Value, json};

/// A structured error body with the given code and message.
#[must_use]
pub fn problem_body(code: f64, message: &str) -> Value {
    json!({ "code": code, "message": message })
}

/// A session payload with the given token and a far-future expiry.
#[must_use]
pub fn session_body(token: &str) -> Value {
    json!({
        "token": token,
        "expiresAt": "2030-01-01T00:00:00.000Z",
        "createdAt": "2026-01-01T00:00:00.000Z"
    })
}

/// A user payload.
#[must_use]
pub fn user_body(id: i64, display_name: &str) -> Value {
    json!({
        "id": id,
        "displayName": display_name,
        "email": format!("user{id}@example.com")
    })
}

/// A project payload.
#[must_use]
pub fn project_body(id: i64, name: &str) -> Value {
    json!({ "id": id, "name": name, "archived": false })
}

/// A form payload.
#[must_use]
pub fn form_body(project_id: i64, xml_form_id: &str) -> Value {
    json!({
        "projectId": project_id,
        "xmlFormId": xml_form_id,
        "state": "open"
    })
}
