//! Diesel schema for snapshot persistence.

diesel::table! {
    /// Snapshot records, one per file version.
    snapshots (id) {
        /// Snapshot identifier.
        id -> Uuid,
        /// Owning file identifier.
        file_id -> Uuid,
        /// Version number, unique per file.
        version -> Int8,
        /// Original upload location.
        original -> Nullable<Jsonb>,
        /// Preview rendition location.
        preview -> Nullable<Jsonb>,
        /// Extracted text location.
        text -> Nullable<Jsonb>,
        /// OCR document location.
        ocr -> Nullable<Jsonb>,
        /// Entities JSON location.
        entities -> Nullable<Jsonb>,
        /// Processing status.
        #[max_length = 50]
        status -> Varchar,
        /// Requested language id.
        #[max_length = 50]
        language -> Nullable<Varchar>,
        /// Task currently working on the snapshot.
        task_id -> Nullable<Uuid>,
        /// Creation timestamp.
        create_time -> Timestamptz,
        /// Last update timestamp.
        update_time -> Nullable<Timestamptz>,
    }
}
