//! Named entities extracted from snapshot text.

use serde::{Deserialize, Serialize};

/// A named entity and how often it occurs in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightsEntity {
    /// Entity text as it appears in the document.
    pub text: String,
    /// Entity category, such as `PERSON` or `ORG`.
    #[serde(default)]
    pub label: String,
    /// Number of occurrences.
    pub frequency: u64,
}
