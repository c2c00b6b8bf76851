use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

/// The source of "now" for release countdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    source: Source,
    offset: FixedOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Seoul, where releases are scheduled.
    pub const DEFAULT_OFFSET_HOURS: i32 = 9;

    pub fn system(offset: FixedOffset) -> Self {
        Self {
            source: Source::System,
            offset,
        }
    }

    pub fn fixed(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            source: Source::Fixed(now),
            offset,
        }
    }

    /// A clock frozen at the start of the given calendar day.
    pub fn pinned(date: NaiveDate, offset: FixedOffset) -> Self {
        let midnight = offset
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .single()
            .map(|midnight| midnight.with_timezone(&Utc))
            .unwrap_or_else(|| date.and_time(NaiveTime::MIN).and_utc());

        Self::fixed(midnight, offset)
    }

    pub fn offset(hours: i32) -> Option<FixedOffset> {
        FixedOffset::east_opt(hours.checked_mul(3600)?)
    }

    pub fn now(&self) -> DateTime<Utc> {
        match self.source {
            Source::System => Utc::now(),
            Source::Fixed(now) => now,
        }
    }

    /// The start of the current day, in the clock's time zone.
    pub fn today(&self) -> DateTime<Utc> {
        let now = self.now().with_timezone(&self.offset);

        now.with_time(NaiveTime::MIN)
            .single()
            .map(|today| today.with_timezone(&Utc))
            .unwrap_or_else(|| self.now())
    }

    /// Whole days left until the given instant; zero or less once it is due.
    pub fn days_until(&self, date: DateTime<Utc>) -> i64 {
        (date - self.today()).num_days()
    }

    /// The calendar day of the instant, in the clock's time zone.
    pub fn local_date(&self, date: DateTime<Utc>) -> NaiveDate {
        date.with_timezone(&self.offset).date_naive()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system(
            Self::offset(Self::DEFAULT_OFFSET_HOURS).unwrap_or_else(|| Utc.fix()),
        )
    }
}
