use crate::toonbase::webtoon;
use crate::toonbase::{Clock, Webtoon};

use chrono::{DateTime, Utc};
use url::Url;

/// A webtoon the user wants to be reminded about.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: webtoon::Id,
    pub title: String,
    pub thumbnail: Option<Url>,
    pub release_date: DateTime<Utc>,
}

impl Item {
    /// Only webtoons with a release date can be reminded about.
    pub fn new(webtoon: &Webtoon) -> Option<Self> {
        Some(Self {
            id: webtoon.id,
            title: webtoon.title.clone(),
            thumbnail: webtoon.thumbnail.clone(),
            release_date: webtoon.release_date?,
        })
    }

    pub fn days_until(&self, clock: &Clock) -> i64 {
        clock.days_until(self.release_date)
    }

    pub fn is_available(&self, clock: &Clock) -> bool {
        self.days_until(clock) <= 0
    }

    pub fn d_day(&self, clock: &Clock) -> String {
        match self.days_until(clock) {
            days if days <= 0 => "Read now".to_owned(),
            days => format!("D - {days}"),
        }
    }
}

/// The upcoming releases strip, soonest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    items: Vec<Item>,
    scroll_target: Option<webtoon::Id>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the item after every item released on or before it.
    ///
    /// An item already in the list is replaced.
    pub fn insert(&mut self, item: Item) {
        let _ = self.remove(item.id);

        let index = self
            .items
            .partition_point(|existing| existing.release_date <= item.release_date);

        self.scroll_target = Some(item.id);
        self.items.insert(index, item);
    }

    /// Removes the item of the webtoon, if present.
    pub fn remove(&mut self, id: webtoon::Id) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == id)?;

        if self.scroll_target == Some(id) {
            self.scroll_target = None;
        }

        Some(self.items.remove(index))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The most recently inserted item.
    pub fn scroll_target(&self) -> Option<webtoon::Id> {
        self.scroll_target
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
