use crate::toonbase::Webtoon;
use crate::toonbase::webtoon::{self, Episode, ReleaseStatus};

use chrono::{DateTime, Utc};
use url::Url;

/// A display-ready catalog entry in the release list.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: webtoon::Id,
    pub release_status: ReleaseStatus,
    pub release_date: Option<DateTime<Utc>>,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub thumbnail: Option<Url>,
    pub thumbnail_color: String,
    pub episodes: Vec<Episode>,
    pub is_new_season: bool,
    pub is_notified: bool,
    pub is_summary_expanded: bool,
    pub is_episodes_expanded: bool,
}

impl Row {
    pub const HEIGHT: f32 = 500.0;
    pub const HEIGHT_WITH_EPISODES: f32 = 600.0;

    pub fn project(webtoon: &Webtoon, is_notified: bool) -> Self {
        Self {
            id: webtoon.id,
            release_status: webtoon.release_status(),
            release_date: webtoon.release_date,
            title: webtoon.title.clone(),
            summary: webtoon.summary.clone(),
            tags: webtoon.tags.clone(),
            thumbnail: webtoon.thumbnail.clone(),
            thumbnail_color: webtoon.thumbnail_color.clone(),
            episodes: webtoon.episodes.clone(),
            is_new_season: webtoon.is_new_season.unwrap_or(false),
            is_notified,
            is_summary_expanded: false,
            is_episodes_expanded: false,
        }
    }

    /// The first three tags, as hashtags.
    pub fn display_tags(&self) -> Vec<String> {
        self.tags.iter().take(3).map(|tag| format!("#{tag}")).collect()
    }

    pub fn episode_thumbnail(&self) -> Option<&Url> {
        self.episodes.first()?.thumbnail.as_ref()
    }

    pub fn height(&self) -> f32 {
        if self.episodes.is_empty() {
            Self::HEIGHT
        } else {
            Self::HEIGHT_WITH_EPISODES
        }
    }

    /// Whether the row exposes the notify control.
    pub fn can_notify(&self) -> bool {
        self.release_status == ReleaseStatus::ComingSoon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn webtoon(value: serde_json::Value) -> Webtoon {
        serde_json::from_value(value).expect("Decode webtoon")
    }

    #[test]
    fn projection_is_idempotent() {
        let heroes = webtoon(json!({
            "id": "0b6a1f3e-6d0e-4a7b-9a55-2f8d1d8c4e01",
            "release_date": "2024-07-05T00:00:00+09:00",
            "title": "Choose Your Heroes Carefully",
            "tags": ["BL", "Fantasy", "Adventure", "Comedy"],
            "episodes": [
                { "title": "Episode 1", "thumbnail": "https://example.com/ep1.png" }
            ],
            "is_new_season": "true"
        }));

        let row = Row::project(&heroes, true);

        assert_eq!(row, Row::project(&heroes, true));
        assert_ne!(row, Row::project(&heroes, false));

        assert_eq!(row.release_status, ReleaseStatus::ComingSoon);
        assert_eq!(row.display_tags(), vec!["#BL", "#Fantasy", "#Adventure"]);
        assert_eq!(
            row.episode_thumbnail().map(Url::as_str),
            Some("https://example.com/ep1.png")
        );
        assert_eq!(row.height(), Row::HEIGHT_WITH_EPISODES);
        assert!(row.is_new_season);
        assert!(row.can_notify());
        assert!(!row.is_summary_expanded);
        assert!(!row.is_episodes_expanded);
    }

    #[test]
    fn new_arrivals_cannot_be_notified() {
        let row = Row::project(&webtoon(json!({ "title": "Semantic Error" })), false);

        assert_eq!(row.release_status, ReleaseStatus::NewArrivals);
        assert_eq!(row.height(), Row::HEIGHT);
        assert_eq!(row.episode_thumbnail(), None);
        assert!(!row.can_notify());
    }
}
