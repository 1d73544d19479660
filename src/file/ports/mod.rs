//! Port contracts for file lookup and access control.

pub mod guard;
pub mod repository;

pub use guard::{FileGuard, GuardError, GuardResult};
pub use repository::{FileRepository, FileRepositoryError, FileRepositoryResult};
