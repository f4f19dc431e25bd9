//! Archived channel metadata.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validate;

use super::{load_json, save_json, FORMAT_VERSION};

/// Raw HTML snapshots taken from a channel's public pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlArchive {
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub community: String,
    #[serde(default)]
    pub featured_channels: String,
    #[serde(default)]
    pub videos: String,
}

/// A validated snapshot of one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Version of tubetrack that wrote the record.
    pub format_version: String,
    /// 24-character channel id, `UC` prefix included.
    pub channel_id: String,
    /// Channel display name.
    pub channel_name: String,
    /// Last time this channel was checked for updates.
    pub last_updated: DateTime<Utc>,
    /// Raw page snapshots.
    #[serde(default)]
    pub html: HtmlArchive,
    /// Ids of the channel's archived videos.
    #[serde(default)]
    pub video_ids: Vec<String>,
}

impl ChannelRecord {
    /// Construct a validated record. Field validators run in declaration
    /// order; the first violation fails the whole construction.
    pub fn new(
        channel_id: impl Into<String>,
        channel_name: impl Into<String>,
        last_updated: DateTime<Utc>,
        html: HtmlArchive,
        video_ids: Vec<String>,
    ) -> Result<Self> {
        let record = Self {
            format_version: FORMAT_VERSION.to_string(),
            channel_id: channel_id.into(),
            channel_name: channel_name.into(),
            last_updated,
            html,
            video_ids,
        };
        record.validate()?;
        Ok(record)
    }

    /// Canonical URL of the channel.
    pub fn url(&self) -> String {
        validate::channel_url(&self.channel_id)
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
        validate::channel_id(&self.channel_id)?;
        validate::non_empty("channel_name", &self.channel_name)?;
        validate::not_future("last_updated", &self.last_updated)?;
        for id in &self.video_ids {
            validate::video_id(id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const CHANNEL_ID: &str = "UCuAXFkgsw1L7xaCfnd5JJOw";

    fn record() -> ChannelRecord {
        ChannelRecord::new(
            CHANNEL_ID,
            "Some Channel",
            Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            HtmlArchive::default(),
            vec!["dQw4w9WgXcQ".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_construction_validates_in_order() {
        assert!(ChannelRecord::new(
            "bad",
            "Some Channel",
            Utc::now(),
            HtmlArchive::default(),
            vec![],
        )
        .is_err());

        assert!(ChannelRecord::new(
            CHANNEL_ID,
            "",
            Utc::now(),
            HtmlArchive::default(),
            vec![],
        )
        .is_err());

        let future = Utc::now() + chrono::Duration::hours(1);
        assert!(
            ChannelRecord::new(CHANNEL_ID, "Some Channel", future, HtmlArchive::default(), vec![])
                .is_err()
        );

        assert!(ChannelRecord::new(
            CHANNEL_ID,
            "Some Channel",
            Utc::now(),
            HtmlArchive::default(),
            vec!["malformed".to_string()],
        )
        .is_err());
    }

    #[test]
    fn test_url() {
        assert_eq!(
            record().url(),
            format!("https://www.youtube.com/channel/{CHANNEL_ID}")
        );
    }

    #[test]
    fn test_json_round_trip() {
        let original = record();
        let text = serde_json::to_string(&original).unwrap();
        // Timestamps serialize in ISO-8601 form.
        assert!(text.contains("2021-01-01T00:00:00Z"));
        let parsed: ChannelRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("channel").join("info.json");
        let original = record();
        original.save(&path).unwrap();
        let loaded = ChannelRecord::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
