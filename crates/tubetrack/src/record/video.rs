//! Archived video metadata.

use std::path::Path;

use chrono::{DateTime, Duration as TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TubeTrackError};
use crate::stats::StatsStore;
use crate::validate;

use super::{load_json, save_json, FORMAT_VERSION};

/// A validated snapshot of one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Version of tubetrack that wrote the record.
    pub format_version: String,
    /// 11-character video id.
    pub video_id: String,
    /// Video title.
    pub title: String,
    /// When the video was published.
    pub publish_date: DateTime<Utc>,
    /// Last time this video's metadata was checked for updates.
    pub last_updated: DateTime<Utc>,
    /// Video length, serialized as total seconds.
    #[serde(with = "duration_secs")]
    pub duration: TimeDelta,
    /// View count at `last_updated`.
    pub views: i64,
    /// Five-star rating, when the backend still exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dislikes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl VideoRecord {
    /// Construct a validated record from the required fields. Field
    /// validators run in declaration order; the first violation fails the
    /// whole construction.
    pub fn new(
        video_id: impl Into<String>,
        title: impl Into<String>,
        publish_date: DateTime<Utc>,
        last_updated: DateTime<Utc>,
        duration: TimeDelta,
        views: i64,
    ) -> Result<Self> {
        let record = Self {
            format_version: FORMAT_VERSION.to_string(),
            video_id: video_id.into(),
            title: title.into(),
            publish_date,
            last_updated,
            duration,
            views,
            rating: None,
            likes: None,
            dislikes: None,
            description: None,
            keywords: Vec::new(),
            thumbnail_url: None,
        };
        record.validate()?;
        Ok(record)
    }

    /// Attach rating/vote statistics, validating each value.
    pub fn with_stats(
        mut self,
        rating: Option<f64>,
        likes: Option<i64>,
        dislikes: Option<i64>,
    ) -> Result<Self> {
        if let Some(rating) = rating {
            validate::rating_in_range(rating)?;
        }
        if let Some(likes) = likes {
            validate::non_negative_count("likes", likes)?;
        }
        if let Some(dislikes) = dislikes {
            validate::non_negative_count("dislikes", dislikes)?;
        }
        self.rating = rating;
        self.likes = likes;
        self.dislikes = dislikes;
        Ok(self)
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach keywords.
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Attach a thumbnail URL.
    pub fn with_thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// Canonical watch URL of the video.
    pub fn url(&self) -> String {
        validate::video_url(&self.video_id)
    }

    /// Append this record's statistics to a store as one observation taken
    /// at `last_updated`.
    pub fn log_stats(&self, store: &mut StatsStore) -> Result<()> {
        store.append(
            &self.video_id,
            self.last_updated,
            self.views,
            self.rating,
            self.likes,
            self.dislikes,
        )
    }

    /// Save to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path.as_ref())
    }

    /// Load from a JSON file, re-running all field validators.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let record: Self = load_json(path.as_ref())?;
        record.validate()?;
        Ok(record)
    }

    fn validate(&self) -> Result<()> {
        validate::video_id(&self.video_id)?;
        validate::non_empty("title", &self.title)?;
        validate::not_future("publish_date", &self.publish_date)?;
        validate::not_future("last_updated", &self.last_updated)?;
        if self.publish_date > self.last_updated {
            return Err(TubeTrackError::RangeViolation {
                field: "publish_date".to_string(),
                constraint: "no later than `last_updated`".to_string(),
                value: format!(
                    "{} > {}",
                    self.publish_date.to_rfc3339(),
                    self.last_updated.to_rfc3339()
                ),
            });
        }
        validate::non_negative_duration("duration", &self.duration)?;
        validate::non_negative_count("views", self.views)?;
        if let Some(rating) = self.rating {
            validate::rating_in_range(rating)?;
        }
        if let Some(likes) = self.likes {
            validate::non_negative_count("likes", likes)?;
        }
        if let Some(dislikes) = self.dislikes {
            validate::non_negative_count("dislikes", dislikes)?;
        }
        Ok(())
    }
}

/// Durations serialize as total seconds (fractional), the shape the archive
/// JSON files use.
mod duration_secs {
    use chrono::Duration as TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::dtype::{duration_from_secs, total_seconds};

    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(total_seconds(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        duration_from_secs(secs)
            .ok_or_else(|| serde::de::Error::custom(format!("duration out of range: {secs}")))
    }
}
