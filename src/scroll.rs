use crate::row::Row;
use crate::toonbase::webtoon::{self, ReleaseStatus};

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    ComingSoon,
    NewArrivals,
}

impl Category {
    pub const ALL: [Self; 2] = [Self::ComingSoon, Self::NewArrivals];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::ComingSoon => "Coming Soon",
            Category::NewArrivals => "New Arrivals",
        })
    }
}

/// Keeps the selected category tab and the list offset in sync.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sync {
    offset: f32,
    threshold: f32,
    selected: Category,
    is_scrolling: bool,
    generation: u64,
}

impl Sync {
    pub fn new(rows: &[Row]) -> Self {
        Self {
            threshold: threshold(rows),
            ..Self::default()
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn selected(&self) -> Category {
        self.selected
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    /// Identifies the latest programmatic scroll.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Records a user scroll, deriving the selected category from it.
    ///
    /// The category is left untouched while a programmatic scroll is in
    /// flight.
    pub fn scrolled(&mut self, offset: f32) {
        self.offset = offset;

        if self.is_scrolling {
            return;
        }

        self.selected = if offset > self.threshold {
            Category::NewArrivals
        } else {
            Category::ComingSoon
        };
    }

    /// Selects the category and returns the offset to scroll to.
    pub fn select(&mut self, category: Category) -> f32 {
        self.selected = category;

        self.scroll_to(match category {
            Category::ComingSoon => 0.0,
            Category::NewArrivals => self.threshold,
        })
    }

    /// Starts a programmatic scroll to the given offset.
    ///
    /// It supersedes any scroll still in flight.
    pub fn scroll_to(&mut self, offset: f32) -> f32 {
        self.offset = offset;
        self.is_scrolling = true;
        self.generation += 1;

        offset
    }

    /// Finishes the given programmatic scroll, unless a later one started.
    pub fn finish(&mut self, generation: u64) {
        if generation == self.generation {
            self.is_scrolling = false;
        }
    }
}

/// The offset where the new arrivals start.
pub fn threshold(rows: &[Row]) -> f32 {
    rows.iter()
        .filter(|row| row.release_status == ReleaseStatus::ComingSoon)
        .map(Row::height)
        .sum()
}

/// The offset of the row in the list, if present.
pub fn row_offset(rows: &[Row], id: webtoon::Id) -> Option<f32> {
    let index = rows.iter().position(|row| row.id == id)?;

    Some(rows[..index].iter().map(Row::height).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::toonbase::Webtoon;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rows() -> Vec<Row> {
        let webtoons: Vec<Webtoon> = serde_json::from_value(json!([
            {
                "title": "A",
                "release_date": "2024-07-05T00:00:00Z",
                "episodes": [{ "title": "Episode 1" }]
            },
            { "title": "B", "release_date": "2024-07-03T00:00:00Z" },
            { "title": "C" }
        ]))
        .expect("Decode webtoons");

        webtoons
            .iter()
            .map(|webtoon| Row::project(webtoon, false))
            .collect()
    }

    #[test]
    fn threshold_sums_coming_soon_rows() {
        let rows = rows();

        assert_eq!(threshold(&rows), 1100.0);
        assert_eq!(row_offset(&rows, rows[0].id), Some(0.0));
        assert_eq!(row_offset(&rows, rows[2].id), Some(1100.0));
        assert_eq!(row_offset(&rows, webtoon::Id::generate()), None);
    }

    #[test]
    fn scrolling_selects_the_category() {
        let mut sync = Sync::new(&rows());

        sync.scrolled(1100.0);
        assert_eq!(sync.selected(), Category::ComingSoon);

        sync.scrolled(1100.5);
        assert_eq!(sync.selected(), Category::NewArrivals);

        sync.scrolled(20.0);
        assert_eq!(sync.selected(), Category::ComingSoon);
    }

    #[test]
    fn programmatic_scrolls_are_not_derived() {
        let mut sync = Sync::new(&rows());

        assert_eq!(sync.select(Category::NewArrivals), 1100.0);
        assert!(sync.is_scrolling());

        sync.scrolled(300.0);
        assert_eq!(sync.selected(), Category::NewArrivals);
        assert_eq!(sync.offset(), 300.0);

        sync.finish(sync.generation());
        sync.scrolled(300.0);
        assert_eq!(sync.selected(), Category::ComingSoon);
    }

    #[test]
    fn only_the_latest_scroll_finishes() {
        let mut sync = Sync::new(&rows());

        let _ = sync.scroll_to(600.0);
        let first = sync.generation();

        let _ = sync.select(Category::NewArrivals);
        let second = sync.generation();

        sync.finish(first);
        sync.scrolled(0.0);
        assert!(sync.is_scrolling());
        assert_eq!(sync.selected(), Category::NewArrivals);

        sync.finish(second);
        sync.scrolled(0.0);
        assert!(!sync.is_scrolling());
        assert_eq!(sync.selected(), Category::ComingSoon);
    }
}
