//! # nutty-engine
//!
//! Finds the windows of time in which a whole group of people is free.
//!
//! Each user declares availability as per-date windows (`2025-05-01`,
//! `09:00`-`12:00`). Given a group, the engine fetches everyone's windows
//! through an injected [`AvailabilitySource`], then sweeps each date's
//! boundaries to emit the maximal intervals where every member is free.
//!
//! ## Modules
//!
//! - [`clock`] — `HH:MM` parsing into minutes since midnight
//! - [`record`] — Availability records and common time slots
//! - [`sweep`] — Pure per-date sweep-line intersection
//! - [`source`] — The availability port and an in-memory implementation
//! - [`engine`] — Concurrent fetch + intersection for a group
//! - [`authoring`] — Expanding a date range into per-date records
//! - [`display`] — Grouping and 12-hour formatting for output
//! - [`error`] — Error types

pub mod authoring;
pub mod clock;
pub mod display;
pub mod engine;
pub mod error;
pub mod record;
pub mod source;
pub mod sweep;

pub use authoring::expand_date_range;
pub use clock::ClockTime;
pub use engine::{compute_common_free_time, CommonTimeFinder, EngineConfig};
pub use error::{FetchError, NuttyError};
pub use record::{parse_records_json, AvailabilityRecord, CommonTimeSlot, UserId};
pub use source::{AvailabilitySource, InMemorySource};
pub use sweep::intersect_records;
