//! Strata: insights and conversion pipeline orchestration for a file
//! storage platform.
//!
//! This crate tracks the snapshots of stored files, submits insights
//! pipeline runs for them and records the background tasks that report
//! their progress to users.
//!
//! # Architecture
//!
//! Strata follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, HTTP, cache)
//!
//! # Modules
//!
//! - [`insights`]: Insights creation, deletion, listing and downloads
//! - [`snapshot`]: File versions and their processing status
//! - [`task`]: User-visible background task tracking
//! - [`pipeline`]: Submission of conversion pipeline runs
//! - [`cache`]: Read-through entity caching
//! - [`search`]: Search index mirroring
//! - [`storage`]: Object storage access
//! - [`file`]: Files and their access permissions

pub mod cache;
pub mod config;
pub mod file;
pub mod insights;
pub mod pipeline;
pub mod search;
pub mod snapshot;
pub mod storage;
pub mod task;
pub mod telemetry;
