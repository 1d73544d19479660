//! Diesel schema for task persistence.

diesel::table! {
    /// Background task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Human-readable task name.
        #[max_length = 255]
        name -> Varchar,
        /// Owning user identifier.
        user_id -> Uuid,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Whether progress is indeterminate.
        is_indeterminate -> Bool,
        /// Last reported progress.
        percentage -> Nullable<Int2>,
        /// Failure message.
        error -> Nullable<Text>,
        /// String payload object.
        payload -> Jsonb,
        /// Creation timestamp.
        create_time -> Timestamptz,
        /// Last update timestamp.
        update_time -> Nullable<Timestamptz>,
    }
}
