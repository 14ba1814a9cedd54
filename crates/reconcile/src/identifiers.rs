//! Newtype domain identifiers.
//!
//! Every tracker or catalog concept that has an identity is represented as a
//! distinct newtype wrapping a primitive. This prevents accidentally
//! interchanging, for example, a [`ProjectIdentifier`] with a [`UserLogin`]
//! even though both are strings derived the same way.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (tracker-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// Lowercases `display_name` and replaces every space with an underscore.
///
/// This is the only normalisation the tracker identifiers receive; other
/// punctuation is kept as-is (`"Formazione - Mario"` becomes
/// `"formazione_-_mario"`).
pub fn slugify(display_name: &str) -> String {
    display_name.to_lowercase().replace(' ', "_")
}

// ---------------------------------------------------------------------------
// Identifiers: tracker-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// Identifies an issue in the tracker. Assigned by the tracker on creation.
    IssueId
}

u64_id! {
    /// Identifies a tracker role granted through a project membership.
    RoleId
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single provisioning + reconciliation run.
///
/// Generated fresh for every CLI invocation; recorded on the `run` span so all
/// activity from a single run can be correlated in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// The tracker's URL-safe project identifier, derived from the project
    /// display name with [`slugify`].
    ProjectIdentifier
}

impl ProjectIdentifier {
    /// Derives the identifier for a project display name.
    ///
    /// An empty display name yields an empty identifier, which the tracker
    /// rejects when the project is created.
    pub fn from_display_name(project_name: &str) -> Self {
        Self(slugify(project_name))
    }
}

string_id! {
    /// Login of the limited-permission user backing a training workspace.
    UserLogin
}

impl UserLogin {
    /// Derives the login for a student display name.
    ///
    /// Like [`ProjectIdentifier::from_display_name`], an empty name is passed
    /// through for the tracker to reject.
    pub fn from_display_name(student_name: &str) -> Self {
        Self(slugify(student_name))
    }
}

string_id! {
    /// A folder of the job catalog. Also the name of the artifact subtree that
    /// holds the folder's build outputs and a segment of every pipeline URL.
    FolderName
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_lowercases_and_replaces_spaces_only() {
        assert_eq!(slugify("Formazione - Student1"), "formazione_-_student1");
        assert_eq!(slugify("Mario  Rossi"), "mario__rossi");
        assert_eq!(slugify("already_ok"), "already_ok");
    }

    #[test]
    fn test_project_identifier_from_display_name() {
        assert_eq!(
            ProjectIdentifier::from_display_name("My Course").to_string(),
            "my_course"
        );
        assert_eq!(ProjectIdentifier::from_display_name("").as_str(), "");
    }

    #[test]
    fn test_user_login_matches_project_slug_rules() {
        let login = UserLogin::from_display_name("Student One");
        assert_eq!(login.as_str(), "student_one");
    }

    #[test]
    fn test_issue_id_serialises_as_bare_integer() {
        let json = serde_json::to_string(&IssueId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
