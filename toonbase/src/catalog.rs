use crate::{FetchError, Webtoon};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::fs;
use url::Url;

/// The release listing for a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Catalog {
    pub coming_soon: Vec<Webtoon>,
    pub new_arrivals: Vec<Webtoon>,
}

impl Catalog {
    /// Fetches the catalog from the given source.
    ///
    /// A single attempt is made. Retrying is up to the caller.
    pub async fn fetch(source: Source) -> Result<Self, FetchError> {
        let bytes = match &source {
            Source::Bundled => Bytes::from_static(BUNDLED.as_bytes()),
            Source::File(path) => {
                log::info!("Reading catalog: {}", path.display());

                Bytes::from(fs::read(path).await?)
            }
            Source::Remote(url) => {
                log::info!("Fetching catalog: {url}");

                CLIENT
                    .get(url.clone())
                    .send()
                    .await?
                    .error_for_status()?
                    .bytes()
                    .await?
            }
        };

        let catalog = Self::decode(&bytes)?;

        log::info!(
            "Loaded catalog from {source} ({} coming soon, {} new arrivals)",
            catalog.coming_soon.len(),
            catalog.new_arrivals.len(),
        );

        Ok(catalog)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FetchError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn webtoons(&self) -> impl Iterator<Item = &Webtoon> {
        self.coming_soon.iter().chain(&self.new_arrivals)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    #[default]
    Bundled,
    File(PathBuf),
    Remote(Url),
}

impl Source {
    /// Parses a path or an `http(s)` URL.
    pub fn parse(source: &str) -> Self {
        match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::File(PathBuf::from(source)),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Bundled => f.write_str("bundled catalog"),
            Source::File(path) => path.display().fmt(f),
            Source::Remote(url) => url.fmt(f),
        }
    }
}

const BUNDLED: &str = include_str!("../data/catalog.json");

static CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::ClientBuilder::new()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_default()
});
