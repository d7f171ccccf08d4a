//! Keys identifying the data domains managed by the request-state store.

use serde::{Deserialize, Serialize};

/// A data domain managed by the request-state store.
///
/// Each key corresponds to one backend resource (or one view of a
/// resource) and owns exactly one cache slot and one request record.
/// Keys are a closed set: they are created when the store is
/// initialized and are never minted at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    /// The current authentication session.
    Session,
    /// The currently authenticated user.
    CurrentUser,

    /// All site users.
    Users,
    /// A single user.
    User,

    /// All assignable roles.
    Roles,
    /// Actors assigned to a resource.
    AssignmentActors,

    /// All projects.
    Projects,
    /// A single project.
    Project,
    /// Assignments on a project.
    ProjectAssignments,
    /// Forms within a project.
    Forms,
    /// A single form.
    Form,
    /// A form's schema.
    Schema,
    /// Assignments on a form.
    FormAssignments,
    /// A form's managed encryption keys.
    FormKeys,
    /// A form's attachments.
    Attachments,
    /// A single chunk of submissions OData.
    SubmissionsChunk,
    /// App users (field keys) of a project.
    FieldKeys,

    /// The backups configuration.
    BackupsConfig,
    /// The server audit log.
    Audits,
}

impl Key {
    /// Every key, in declaration order.
    pub const ALL: [Key; 19] = [
        Key::Session,
        Key::CurrentUser,
        Key::Users,
        Key::User,
        Key::Roles,
        Key::AssignmentActors,
        Key::Projects,
        Key::Project,
        Key::ProjectAssignments,
        Key::Forms,
        Key::Form,
        Key::Schema,
        Key::FormAssignments,
        Key::FormKeys,
        Key::Attachments,
        Key::SubmissionsChunk,
        Key::FieldKeys,
        Key::BackupsConfig,
        Key::Audits,
    ];

    /// Stable lowerCamelCase name, used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Key::Session => "session",
            Key::CurrentUser => "currentUser",
            Key::Users => "users",
            Key::User => "user",
            Key::Roles => "roles",
            Key::AssignmentActors => "assignmentActors",
            Key::Projects => "projects",
            Key::Project => "project",
            Key::ProjectAssignments => "projectAssignments",
            Key::Forms => "forms",
            Key::Form => "form",
            Key::Schema => "schema",
            Key::FormAssignments => "formAssignments",
            Key::FormKeys => "formKeys",
            Key::Attachments => "attachments",
            Key::SubmissionsChunk => "submissionsChunk",
            Key::FieldKeys => "fieldKeys",
            Key::BackupsConfig => "backupsConfig",
            Key::Audits => "audits",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_keys_are_distinct() {
        let set: HashSet<Key> = Key::ALL.into_iter().collect();
        assert_eq!(set.len(), Key::ALL.len());
    }

    #[test]
    fn display_matches_name() {
        for key in Key::ALL {
            assert_eq!(key.to_string(), key.name());
        }
    }
}
