//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task name.
    pub name: String,
    /// Owning user identifier.
    pub user_id: uuid::Uuid,
    /// Lifecycle status.
    pub status: String,
    /// Indeterminate progress flag.
    pub is_indeterminate: bool,
    /// Last reported progress.
    pub percentage: Option<i16>,
    /// Failure message.
    pub error: Option<String>,
    /// Payload JSON object.
    pub payload: Value,
    /// Creation timestamp.
    pub create_time: DateTime<Utc>,
    /// Last update timestamp.
    pub update_time: Option<DateTime<Utc>>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task name.
    pub name: String,
    /// Owning user identifier.
    pub user_id: uuid::Uuid,
    /// Lifecycle status.
    pub status: String,
    /// Indeterminate progress flag.
    pub is_indeterminate: bool,
    /// Last reported progress.
    pub percentage: Option<i16>,
    /// Failure message.
    pub error: Option<String>,
    /// Payload JSON object.
    pub payload: Value,
    /// Creation timestamp.
    pub create_time: DateTime<Utc>,
    /// Last update timestamp.
    pub update_time: Option<DateTime<Utc>>,
}

/// Mutable task columns written on update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Task name.
    pub name: String,
    /// Lifecycle status.
    pub status: String,
    /// Indeterminate progress flag.
    pub is_indeterminate: bool,
    /// Last reported progress.
    pub percentage: Option<i16>,
    /// Failure message.
    pub error: Option<String>,
    /// Payload JSON object.
    pub payload: Value,
    /// Last update timestamp.
    pub update_time: Option<DateTime<Utc>>,
}
