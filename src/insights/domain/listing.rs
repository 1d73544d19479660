//! Filtering, sorting and pagination of entity lists.

use super::InsightsEntity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field entities are sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitySortBy {
    /// Lexicographic, case-sensitive order of the entity text.
    #[default]
    Name,
    /// Occurrence count, always highest first.
    Frequency,
}

impl EntitySortBy {
    /// Returns the query-string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Frequency => "frequency",
        }
    }
}

impl TryFrom<&str> for EntitySortBy {
    type Error = ListingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "" | "name" => Ok(Self::Name),
            "frequency" => Ok(Self::Frequency),
            _ => Err(ListingError::InvalidSortBy(value.to_owned())),
        }
    }
}

/// Direction of a name sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Returns the query-string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl TryFrom<&str> for SortOrder {
    type Error = ListingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "" | "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ListingError::InvalidSortOrder(value.to_owned())),
        }
    }
}

/// Errors returned while validating list options.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListingError {
    /// Unknown sort field.
    #[error("invalid sort field '{0}', expected name or frequency")]
    InvalidSortBy(String),

    /// Unknown sort direction.
    #[error("invalid sort order '{0}', expected asc or desc")]
    InvalidSortOrder(String),

    /// Pages are numbered from one.
    #[error("page must be at least 1")]
    InvalidPage,

    /// Pages hold at least one entity.
    #[error("page size must be at least 1")]
    InvalidSize,
}

/// Raw list parameters as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityListQuery {
    /// Case-insensitive substring filter on entity text.
    pub query: String,
    /// One-based page index.
    pub page: u64,
    /// Page size.
    pub size: u64,
    /// `""`, `name` or `frequency`.
    pub sort_by: String,
    /// `""`, `asc` or `desc`.
    pub sort_order: String,
}

impl EntityListQuery {
    /// Validates the raw parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError`] for unknown sort values or a zero page or
    /// size.
    pub fn validate(&self) -> Result<EntityListOptions, ListingError> {
        let sort_by = EntitySortBy::try_from(self.sort_by.as_str())?;
        let sort_order = SortOrder::try_from(self.sort_order.as_str())?;
        Ok(EntityListOptions::new(self.page, self.size)?
            .with_query(self.query.clone())
            .with_sort(sort_by, sort_order))
    }
}

/// Validated list parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityListOptions {
    query: String,
    page: u64,
    size: u64,
    sort_by: EntitySortBy,
    sort_order: SortOrder,
}

impl EntityListOptions {
    /// Creates options for `page` of `size` entities, unfiltered and sorted
    /// by name ascending.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::InvalidPage`] or [`ListingError::InvalidSize`]
    /// for zero values.
    pub const fn new(page: u64, size: u64) -> Result<Self, ListingError> {
        if page == 0 {
            return Err(ListingError::InvalidPage);
        }
        if size == 0 {
            return Err(ListingError::InvalidSize);
        }
        Ok(Self {
            query: String::new(),
            page,
            size,
            sort_by: EntitySortBy::Name,
            sort_order: SortOrder::Asc,
        })
    }

    /// Sets the text filter.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Sets the sort field and direction.
    #[must_use]
    pub fn with_sort(mut self, sort_by: EntitySortBy, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    /// Returns the text filter.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the one-based page index.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the sort field.
    #[must_use]
    pub const fn sort_by(&self) -> EntitySortBy {
        self.sort_by
    }

    /// Returns the sort direction.
    #[must_use]
    pub const fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Keeps the entities whose text contains the query, ignoring case.
    #[must_use]
    pub fn filter(&self, entities: Vec<InsightsEntity>) -> Vec<InsightsEntity> {
        if self.query.is_empty() {
            return entities;
        }
        let needle = self.query.to_lowercase();
        entities
            .into_iter()
            .filter(|entity| entity.text.to_lowercase().contains(&needle))
            .collect()
    }

    /// Sorts entities in place. Equal keys keep their original order.
    pub fn sort(&self, entities: &mut [InsightsEntity]) {
        match (self.sort_by, self.sort_order) {
            (EntitySortBy::Name, SortOrder::Asc) => {
                entities.sort_by(|left, right| left.text.cmp(&right.text));
            }
            (EntitySortBy::Name, SortOrder::Desc) => {
                entities.sort_by(|left, right| right.text.cmp(&left.text));
            }
            (EntitySortBy::Frequency, _) => {
                entities.sort_by(|left, right| right.frequency.cmp(&left.frequency));
            }
        }
    }

    /// Filters, sorts and returns the requested page.
    #[must_use]
    pub fn apply(&self, entities: Vec<InsightsEntity>) -> EntityList {
        let mut matching = self.filter(entities);
        self.sort(&mut matching);

        let total_elements = matching.len() as u64;
        let total_pages = total_elements.div_ceil(self.size);
        let data: Vec<InsightsEntity> = if self.page > total_pages {
            Vec::new()
        } else {
            let start = usize::try_from((self.page - 1).saturating_mul(self.size))
                .unwrap_or(usize::MAX);
            let size = usize::try_from(self.size).unwrap_or(usize::MAX);
            matching.into_iter().skip(start).take(size).collect()
        };

        EntityList {
            size: data.len() as u64,
            data,
            total_pages,
            total_elements,
            page: self.page,
        }
    }

    /// Filters and returns only the totals.
    #[must_use]
    pub fn totals(&self, entities: Vec<InsightsEntity>) -> EntityTotals {
        let total_elements = self.filter(entities).len() as u64;
        EntityTotals {
            total_pages: total_elements.div_ceil(self.size),
            total_elements,
        }
    }
}

/// One page of entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityList {
    /// Entities on this page.
    pub data: Vec<InsightsEntity>,
    /// Number of pages at the requested size.
    pub total_pages: u64,
    /// Number of entities matching the filter.
    pub total_elements: u64,
    /// Requested page.
    pub page: u64,
    /// Number of entities on this page.
    pub size: u64,
}

/// Totals of a filtered entity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTotals {
    /// Number of pages at the requested size.
    pub total_pages: u64,
    /// Number of entities matching the filter.
    pub total_elements: u64,
}
