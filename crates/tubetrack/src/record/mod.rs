//! Validated archive records and their JSON persistence.
//!
//! One canonical construction path per entity: constructors run the field
//! validators in declaration order and fail on the first violation, and
//! `load` re-runs the same validators so a hand-edited file cannot smuggle
//! malformed values into the archive.

mod channel;
mod video;

pub use channel::{ChannelRecord, HtmlArchive};
pub use video::VideoRecord;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, TubeTrackError};

/// Version stamp written into every record file.
pub(crate) const FORMAT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Save a record to a JSON file, creating parent directories as needed.
pub(crate) fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                TubeTrackError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(path).map_err(|e| {
        TubeTrackError::Persistence(format!("Failed to create file '{}': {}", path.display(), e))
    })?;

    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value).map_err(|e| {
        TubeTrackError::Persistence(format!("Failed to serialize record: {}", e))
    })?;

    Ok(())
}

/// Load a record from a JSON file.
pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| {
        TubeTrackError::Persistence(format!("Failed to open file '{}': {}", path.display(), e))
    })?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| {
        TubeTrackError::Persistence(format!(
            "Failed to parse record '{}': {}",
            path.display(),
            e
        ))
    })
}
