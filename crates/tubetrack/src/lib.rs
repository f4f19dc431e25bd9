//! tubetrack: typed columnar storage for YouTube archive statistics.
//!
//! tubetrack classifies loosely-typed tabular data into a closed set of
//! semantic types, converts between them without ever losing information
//! silently, and keeps per-video view/rating observations in a
//! schema-constrained store.
//!
//! # Core Principles
//!
//! - **Narrowest type wins**: whole-valued floats and complexes classify as
//!   integers; classification is deterministic and total
//! - **Lossless or rejected**: a coercion that cannot preserve every value
//!   exactly fails the whole column, never a single cell
//! - **No partial states**: store construction and appends either fully
//!   succeed or leave nothing behind
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use tubetrack::StatsStore;
//!
//! let mut store = StatsStore::new();
//! store
//!     .append(
//!         "dQw4w9WgXcQ",
//!         Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
//!         1_000,
//!         None,
//!         Some(34),
//!         Some(6),
//!     )
//!     .unwrap();
//!
//! let recent = store.most_recent();
//! assert_eq!(recent["dQw4w9WgXcQ"].rating, Some(4.25));
//! ```

pub mod dtype;
pub mod error;
pub mod frame;
pub mod record;
pub mod stats;
pub mod validate;

pub use dtype::{SemanticType, TextParser, TextParserConfig, TypeEngine};
pub use error::{Result, TubeTrackError};
pub use frame::{Cell, CellKind, Column, Storage, Table};
pub use record::{ChannelRecord, HtmlArchive, VideoRecord};
pub use stats::{StatsRow, StatsStore};
