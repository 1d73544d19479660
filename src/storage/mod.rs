//! Object storage access for snapshot artifacts.
//!
//! Snapshots point at artifacts by bucket and key. This module defines that
//! pointer, the port used to read and remove objects, and the media-type
//! rules that decide which rendition of a document the pipeline consumes.

pub mod adapters;
pub mod domain;
pub mod ports;
