//! Domain model for snapshot insights.
//!
//! Insights are the artifacts derived from a snapshot by the insights
//! pipeline: extracted text, a searchable OCR document and a list of named
//! entities with their frequencies. Entities are read whole from object
//! storage and filtered, sorted and paginated in memory.

mod entity;
mod info;
mod language;
mod listing;
mod rendition;

pub use entity::InsightsEntity;
pub use info::{InsightsInfo, SnapshotSummary};
pub use language::{InsightsLanguage, LANGUAGES, find_language};
pub use listing::{
    EntityList, EntityListOptions, EntityListQuery, EntityTotals, EntitySortBy, ListingError,
    SortOrder,
};
pub use rendition::pipeline_input;
