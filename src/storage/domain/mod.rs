//! Domain types for object storage.

mod location;
mod media;

pub use location::ObjectLocation;
pub use media::MediaIdentifier;
