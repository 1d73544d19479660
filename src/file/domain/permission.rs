//! Ordered access permissions.

use super::ParsePermissionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission a user holds on a file.
///
/// Permissions are ordered: an owner may do everything an editor may do, and
/// an editor everything a viewer may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read-only access.
    Viewer,
    /// Read and modify access.
    Editor,
    /// Full control, including destructive operations.
    Owner,
}

impl Permission {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Owner => "owner",
        }
    }

    /// Returns whether this permission satisfies `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Permission {
    type Error = ParsePermissionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "editor" => Ok(Self::Editor),
            "owner" => Ok(Self::Owner),
            _ => Err(ParsePermissionError(value.to_owned())),
        }
    }
}
