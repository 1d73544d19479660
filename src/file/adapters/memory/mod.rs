//! In-memory adapters for file lookup and access control.

mod file;
mod guard;

pub use file::InMemoryFileRepository;
pub use guard::InMemoryFileGuard;
