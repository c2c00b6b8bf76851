use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Webtoon {
    #[serde(default = "Id::generate", deserialize_with = "id_or_generated")]
    pub id: Id,
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub age_rating: String,
    #[serde(default, deserialize_with = "url")]
    pub thumbnail: Option<Url>,
    #[serde(default, deserialize_with = "url")]
    pub thumbnail_small: Option<Url>,
    #[serde(default)]
    pub thumbnail_color: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub creators: Creators,
    #[serde(default, deserialize_with = "episodes")]
    pub episodes: Vec<Episode>,
    #[serde(default, deserialize_with = "flag")]
    pub is_new_season: Option<bool>,
}

impl Webtoon {
    pub fn release_status(&self) -> ReleaseStatus {
        if self.release_date.is_some() {
            ReleaseStatus::ComingSoon
        } else {
            ReleaseStatus::NewArrivals
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(Uuid);

impl Id {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for Id {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.as_hyphenated().fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReleaseStatus {
    ComingSoon,
    NewArrivals,
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReleaseStatus::ComingSoon => "Coming Soon",
            ReleaseStatus::NewArrivals => "New Arrivals",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Creators {
    #[serde(default)]
    pub production: Option<String>,
    #[serde(default)]
    pub illustration: Option<String>,
    #[serde(default)]
    pub writer: Option<String>,
    #[serde(default)]
    pub original_story: Option<String>,
    #[serde(default)]
    pub localization: Option<String>,
}

impl Creators {
    /// The credited roles, in display order, skipping the empty ones.
    pub fn details(&self) -> Vec<(&'static str, &str)> {
        [
            ("Production", &self.production),
            ("Illustration", &self.illustration),
            ("Writer", &self.writer),
            ("Original Story", &self.original_story),
            ("Localization", &self.localization),
        ]
        .into_iter()
        .filter_map(|(label, value)| Some((label, value.as_deref()?)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Episode {
    pub title: String,
    #[serde(default, deserialize_with = "url")]
    pub thumbnail: Option<Url>,
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub access_type: Option<String>,
}

fn id_or_generated<'de, D>(deserializer: D) -> Result<Id, D::Error>
where
    D: Deserializer<'de>,
{
    let id = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(id
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|id| id.parse().ok())
        .unwrap_or_else(Id::generate))
}

fn url<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    let url = Option::<String>::deserialize(deserializer)?;

    Ok(url.and_then(|url| Url::parse(&url).ok()))
}

fn episodes<'de, D>(deserializer: D) -> Result<Vec<Episode>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(serde_json::from_value(value).unwrap_or_else(|error| {
        log::warn!("Discarding malformed episodes: {error}");

        Vec::new()
    }))
}

fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(
        Option::<Flag>::deserialize(deserializer)?.map(|flag| match flag {
            Flag::Bool(value) => value,
            Flag::Text(text) => text.to_lowercase() == "true",
        }),
    )
}
