//! Scalar field validators shared by archive records and the stats store.
//!
//! One canonical validation path per field: every constructor and append
//! boundary goes through these, so error messages stay consistent.

use chrono::{DateTime, Duration as TimeDelta, TimeZone, Utc};

use crate::error::{Result, TubeTrackError};

/// Length of a YouTube video id.
pub const VIDEO_ID_LEN: usize = 11;

/// Length of a YouTube channel id (`UC` prefix included).
pub const CHANNEL_ID_LEN: usize = 24;

/// Returns true for a well-formed video id.
pub fn is_video_id(id: &str) -> bool {
    id.len() == VIDEO_ID_LEN
}

/// Returns true for a well-formed channel id.
pub fn is_channel_id(id: &str) -> bool {
    id.len() == CHANNEL_ID_LEN && id.starts_with("UC")
}

/// Canonical watch URL for a video id.
pub fn video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Canonical channel URL for a channel id.
pub fn channel_url(channel_id: &str) -> String {
    format!("https://www.youtube.com/channel/{channel_id}")
}

/// Validate a video id.
pub fn video_id(value: &str) -> Result<()> {
    if is_video_id(value) {
        Ok(())
    } else {
        Err(range_violation(
            "video_id",
            "an 11-character video id string",
            format!("'{value}'"),
        ))
    }
}

/// Validate a channel id.
pub fn channel_id(value: &str) -> Result<()> {
    if is_channel_id(value) {
        Ok(())
    } else {
        Err(range_violation(
            "channel_id",
            "a 24-character channel id string starting with 'UC'",
            format!("'{value}'"),
        ))
    }
}

/// Validate that a string field is non-empty.
pub fn non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(range_violation(field, "a non-empty string", format!("'{value}'")))
    } else {
        Ok(())
    }
}

/// Validate that a timestamp does not lie in the future.
pub fn not_future<Tz: TimeZone>(field: &str, value: &DateTime<Tz>) -> Result<()> {
    let current = Utc::now();
    let value = value.with_timezone(&Utc);
    if value > current {
        Err(range_violation(
            field,
            "a timestamp not in the future",
            format!("{} > {}", value.to_rfc3339(), current.to_rfc3339()),
        ))
    } else {
        Ok(())
    }
}

/// Validate a non-negative count field.
pub fn non_negative_count(field: &str, value: i64) -> Result<()> {
    if value < 0 {
        Err(range_violation(field, "an integer >= 0", value.to_string()))
    } else {
        Ok(())
    }
}

/// Validate a rating value.
pub fn rating_in_range(value: f64) -> Result<()> {
    if (0.0..=5.0).contains(&value) {
        Ok(())
    } else {
        Err(range_violation(
            "rating",
            "a number between 0 and 5",
            value.to_string(),
        ))
    }
}

/// Validate a non-negative time interval.
pub fn non_negative_duration(field: &str, value: &TimeDelta) -> Result<()> {
    if *value < TimeDelta::zero() {
        Err(range_violation(
            field,
            "a non-negative duration",
            crate::frame::format_duration(*value),
        ))
    } else {
        Ok(())
    }
}

fn range_violation(field: &str, constraint: &str, value: String) -> TubeTrackError {
    TubeTrackError::RangeViolation {
        field: field.to_string(),
        constraint: constraint.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_shapes() {
        assert!(is_video_id("dQw4w9WgXcQ"));
        assert!(!is_video_id("short"));
        assert!(is_channel_id("UCuAXFkgsw1L7xaCfnd5JJOw"));
        assert!(!is_channel_id("XXuAXFkgsw1L7xaCfnd5JJOw"));

        assert!(video_id("dQw4w9WgXcQ").is_ok());
        let err = video_id("nope").unwrap_err();
        assert!(err.to_string().contains("11-character"));
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            video_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert!(channel_url("UCuAXFkgsw1L7xaCfnd5JJOw").ends_with("UCuAXFkgsw1L7xaCfnd5JJOw"));
    }

    #[test]
    fn test_not_future() {
        let past = Utc::now() - TimeDelta::hours(1);
        assert!(not_future("timestamp", &past).is_ok());

        let future = Utc::now() + TimeDelta::hours(1);
        let err = not_future("timestamp", &future).unwrap_err();
        assert!(err.to_string().contains("not in the future"));
    }

    #[test]
    fn test_counts_and_rating() {
        assert!(non_negative_count("views", 0).is_ok());
        assert!(non_negative_count("likes", -1).is_err());
        assert!(rating_in_range(5.0).is_ok());
        assert!(rating_in_range(5.1).is_err());
        assert!(rating_in_range(-0.1).is_err());
    }

    #[test]
    fn test_duration_sign() {
        assert!(non_negative_duration("duration", &TimeDelta::seconds(0)).is_ok());
        assert!(non_negative_duration("duration", &TimeDelta::seconds(-1)).is_err());
    }
}
