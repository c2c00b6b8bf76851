pub mod catalog;
pub mod clock;
pub mod error;
pub mod preferences;
pub mod reminder;
pub mod webtoon;

mod map;

pub use catalog::Catalog;
pub use clock::Clock;
pub use error::{FetchError, ScheduleError, StorageError};
pub use map::Map;
pub use preferences::Preferences;
pub use reminder::{Reminder, Reminders};
pub use webtoon::Webtoon;
