//! File records and access control for Strata.
//!
//! Files are the user-facing resources that own snapshots. The insights core
//! only reads them: it needs the file kind, display name and current snapshot
//! pointer, and it asks the access guard whether a user holds a required
//! permission on the file.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
