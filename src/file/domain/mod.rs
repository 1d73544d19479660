//! Domain model for files and access permissions.

mod error;
mod file;
mod ids;
mod permission;

pub use error::{FileDomainError, ParsePermissionError};
pub use file::{File, FileKind};
pub use ids::{FileId, UserId};
pub use permission::Permission;
