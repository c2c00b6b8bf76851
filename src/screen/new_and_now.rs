use crate::notification;
use crate::row::Row;
use crate::screen::Detail;
use crate::scroll::{self, Category};
use crate::task::{self, Task};
use crate::toonbase::catalog::{self, Catalog};
use crate::toonbase::webtoon::{self, ReleaseStatus};
use crate::toonbase::{
    Clock, FetchError, Map, Preferences, Reminder, Reminders, StorageError, Webtoon,
};

use function::Binary;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time;

pub struct NewAndNow {
    source: catalog::Source,
    state: State,
    alert: Option<StorageError>,
}

enum State {
    Loading {
        _fetch: task::Handle,
    },
    Loaded {
        webtoons: Map<webtoon::Id, Webtoon>,
        rows: Map<webtoon::Id, Row>,
        notifications: notification::List,
        toggled: BTreeSet<webtoon::Id>,
        scroll: scroll::Sync,
    },
    Failed(FetchError),
}

#[derive(Debug, Clone)]
pub enum Message {
    Fetched(Result<Catalog, FetchError>),
    NotifiedListed(Result<Vec<webtoon::Id>, StorageError>),
    Retry,
    NotifyToggled(webtoon::Id),
    Stored(webtoon::Id, Result<(), StorageError>),
    SummaryToggled(webtoon::Id),
    EpisodesToggled(webtoon::Id),
    Scrolled(f32),
    CategorySelected(Category),
    NotificationPressed(webtoon::Id),
    ScrollFinished(u64),
    Open(webtoon::Id),
    AlertDismissed,
}

pub enum Action {
    None,
    Run(Task<Message>),
    Open(Detail),
}

impl NewAndNow {
    const SCROLL_DURATION: Duration = Duration::from_millis(300);

    pub fn new(source: catalog::Source) -> (Self, Task<Message>) {
        let (state, fetch) = fetch(&source);

        (
            Self {
                source,
                state,
                alert: None,
            },
            fetch,
        )
    }

    pub fn update(
        &mut self,
        message: Message,
        preferences: &Preferences,
        reminders: &Reminders,
        clock: &Clock,
    ) -> Action {
        match message {
            Message::Fetched(Ok(catalog)) => {
                let mut webtoons = Map::new(|webtoon: &Webtoon| webtoon.id);

                for webtoon in catalog.coming_soon.into_iter().chain(catalog.new_arrivals) {
                    let (id, title) = (webtoon.id, webtoon.title.clone());

                    if !webtoons.push(webtoon) {
                        log::warn!("Skipping {title}: duplicate id {id}");
                    }
                }

                let mut rows = Map::new(|row: &Row| row.id);

                for webtoon in webtoons.values() {
                    let _ = rows.push(Row::project(webtoon, false));
                }

                self.state = State::Loaded {
                    scroll: scroll::Sync::new(rows.values()),
                    webtoons,
                    rows,
                    notifications: notification::List::new(),
                    toggled: BTreeSet::new(),
                };

                let preferences = preferences.clone();

                Action::Run(Task::perform(
                    async move { preferences.list_notified_ids().await },
                    Message::NotifiedListed,
                ))
            }
            Message::Fetched(Err(error)) => {
                log::error!("Catalog fetch failed: {error}");

                self.state = State::Failed(error);

                Action::None
            }
            Message::Retry => {
                let State::Failed(_) = self.state else {
                    return Action::None;
                };

                let (state, fetch) = fetch(&self.source);
                self.state = state;

                Action::Run(fetch)
            }
            Message::NotifiedListed(Ok(ids)) => {
                let State::Loaded {
                    webtoons,
                    rows,
                    notifications,
                    toggled,
                    ..
                } = &mut self.state
                else {
                    return Action::None;
                };

                let ids = BTreeSet::from_iter(ids);

                // Toggles made while listing take precedence
                for webtoon in webtoons.values() {
                    if !ids.contains(&webtoon.id) || toggled.contains(&webtoon.id) {
                        continue;
                    }

                    let Some(item) = notification::Item::new(webtoon) else {
                        continue;
                    };

                    if let Some(row) = rows.get_mut(&webtoon.id) {
                        row.is_notified = true;
                    }

                    notifications.insert(item);
                }

                Action::None
            }
            Message::NotifyToggled(id) => {
                let State::Loaded {
                    webtoons,
                    rows,
                    notifications,
                    toggled,
                    ..
                } = &mut self.state
                else {
                    return Action::None;
                };

                let (Some(webtoon), Some(row)) = (webtoons.get(&id), rows.get_mut(&id)) else {
                    return Action::None;
                };

                if !row.can_notify() {
                    return Action::None;
                }

                row.is_notified = !row.is_notified;
                let _ = toggled.insert(id);

                let preferences = preferences.clone();

                let store = if row.is_notified {
                    if let Some(item) = notification::Item::new(webtoon) {
                        if item.is_available(clock) {
                            if let Err(error) =
                                reminders.schedule(Reminder::available_now(id, &webtoon.title))
                            {
                                log::warn!("Reminder for {} not scheduled: {error}", webtoon.title);
                            }
                        }

                        notifications.insert(item);
                    }

                    Task::perform(
                        async move { preferences.add(id).await },
                        Message::Stored.with(id),
                    )
                } else {
                    let _ = notifications.remove(id);
                    reminders.cancel(id);

                    Task::perform(
                        async move { preferences.remove(id).await },
                        Message::Stored.with(id),
                    )
                };

                Action::Run(store)
            }
            Message::Stored(id, Ok(())) => {
                log::debug!("Notification preference stored: {id}");

                Action::None
            }
            Message::Stored(id, Err(error)) => {
                log::error!("Notification preference for {id} not stored: {error}");

                self.alert = Some(error);

                Action::None
            }
            Message::NotifiedListed(Err(error)) => {
                log::error!("Notification preferences could not be listed: {error}");

                self.alert = Some(error);

                Action::None
            }
            Message::SummaryToggled(id) => {
                if let Some(row) = self.row_mut(id) {
                    row.is_summary_expanded = !row.is_summary_expanded;
                }

                Action::None
            }
            Message::EpisodesToggled(id) => {
                if let Some(row) = self.row_mut(id) {
                    row.is_episodes_expanded = !row.is_episodes_expanded;
                }

                Action::None
            }
            Message::Scrolled(offset) => {
                if let State::Loaded { scroll, .. } = &mut self.state {
                    scroll.scrolled(offset);
                }

                Action::None
            }
            Message::CategorySelected(category) => {
                let State::Loaded { scroll, .. } = &mut self.state else {
                    return Action::None;
                };

                let offset = scroll.select(category);
                log::debug!("Scrolling to {category} at {offset}");

                Action::Run(finish_scroll(scroll.generation()))
            }
            Message::NotificationPressed(id) => {
                let State::Loaded { rows, scroll, .. } = &mut self.state else {
                    return Action::None;
                };

                let Some(offset) = scroll::row_offset(rows.values(), id) else {
                    return Action::None;
                };

                let _ = scroll.scroll_to(offset);

                Action::Run(finish_scroll(scroll.generation()))
            }
            Message::ScrollFinished(generation) => {
                if let State::Loaded { scroll, .. } = &mut self.state {
                    scroll.finish(generation);
                }

                Action::None
            }
            Message::Open(id) => {
                let State::Loaded { webtoons, rows, .. } = &self.state else {
                    return Action::None;
                };

                let (Some(webtoon), Some(row)) = (webtoons.get(&id), rows.get(&id)) else {
                    return Action::None;
                };

                Action::Open(Detail::project(webtoon, row.is_notified))
            }
            Message::AlertDismissed => {
                self.alert = None;

                Action::None
            }
        }
    }

    pub fn rows(&self) -> &[Row] {
        match &self.state {
            State::Loaded { rows, .. } => rows.values(),
            State::Loading { .. } | State::Failed(_) => &[],
        }
    }

    pub fn rows_in(&self, status: ReleaseStatus) -> impl Iterator<Item = &Row> {
        self.rows()
            .iter()
            .filter(move |row| row.release_status == status)
    }

    pub fn row(&self, id: webtoon::Id) -> Option<&Row> {
        let State::Loaded { rows, .. } = &self.state else {
            return None;
        };

        rows.get(&id)
    }

    pub fn notifications(&self) -> &[notification::Item] {
        match &self.state {
            State::Loaded { notifications, .. } => notifications.items(),
            State::Loading { .. } | State::Failed(_) => &[],
        }
    }

    pub fn scroll_target(&self) -> Option<webtoon::Id> {
        match &self.state {
            State::Loaded { notifications, .. } => notifications.scroll_target(),
            State::Loading { .. } | State::Failed(_) => None,
        }
    }

    pub fn scroll(&self) -> Option<&scroll::Sync> {
        match &self.state {
            State::Loaded { scroll, .. } => Some(scroll),
            State::Loading { .. } | State::Failed(_) => None,
        }
    }

    pub fn is_notified(&self, id: webtoon::Id) -> bool {
        self.row(id).is_some_and(|row| row.is_notified)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, State::Loading { .. })
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.state {
            State::Failed(error) => Some(error),
            State::Loading { .. } | State::Loaded { .. } => None,
        }
    }

    pub fn alert(&self) -> Option<&StorageError> {
        self.alert.as_ref()
    }

    pub fn view(&self, clock: &Clock) -> String {
        let (rows, notifications, scroll) = match &self.state {
            State::Loading { .. } => return "Loading...".to_owned(),
            State::Failed(error) => {
                return format!("Failed to load the catalog: {error}\nType retry to try again.");
            }
            State::Loaded {
                rows,
                notifications,
                scroll,
                ..
            } => (rows.values(), notifications, scroll),
        };

        let mut lines = Vec::new();

        lines.push(
            Category::ALL
                .iter()
                .map(|category| {
                    if *category == scroll.selected() {
                        format!("[{category}]")
                    } else {
                        format!(" {category} ")
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        );

        if !notifications.is_empty() {
            lines.push(format!(
                "Reminders: {}",
                notifications
                    .items()
                    .iter()
                    .enumerate()
                    .map(|(i, item)| format!("{}. {} ({})", i + 1, item.title, item.d_day(clock)))
                    .collect::<Vec<_>>()
                    .join("  ")
            ));
        }

        let mut status = None;

        for (i, row) in rows.iter().enumerate() {
            if status != Some(row.release_status) {
                status = Some(row.release_status);
                lines.push(format!("-- {} --", row.release_status));
            }

            let mut line = format!("{:>2}. ", i + 1);

            if row.can_notify() {
                line.push_str(if row.is_notified { "[x] " } else { "[ ] " });
            }

            line.push_str(&row.title);

            if let Some(date) = row.release_date {
                line.push_str(&format!(" ({})", clock.local_date(date)));
            }

            if row.is_new_season {
                line.push_str(" NEW SEASON");
            }

            let tags = row.display_tags();

            if !tags.is_empty() {
                line.push_str(&format!("  {}", tags.join(" ")));
            }

            lines.push(line);

            if row.is_summary_expanded && !row.summary.is_empty() {
                lines.push(format!("      {}", row.summary));
            }

            if row.is_episodes_expanded {
                lines.extend(
                    row.episodes
                        .iter()
                        .map(|episode| format!("      * {}", episode.title)),
                );
            }
        }

        if let Some(alert) = &self.alert {
            lines.push(format!("! {alert} (type dismiss)"));
        }

        lines.join("\n")
    }

    fn row_mut(&mut self, id: webtoon::Id) -> Option<&mut Row> {
        let State::Loaded { rows, .. } = &mut self.state else {
            return None;
        };

        rows.get_mut(&id)
    }
}

fn fetch(source: &catalog::Source) -> (State, Task<Message>) {
    let (fetch, handle) = Task::perform(Catalog::fetch(source.clone()), Message::Fetched).abortable();

    (
        State::Loading {
            _fetch: handle.abort_on_drop(),
        },
        fetch,
    )
}

fn finish_scroll(generation: u64) -> Task<Message> {
    Task::future(async move {
        time::sleep(NewAndNow::SCROLL_DURATION).await;

        Message::ScrollFinished(generation)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{FixedOffset, NaiveDate};
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    const CATALOG: &str = r#"{
        "coming_soon": [
            {
                "id": "0b6a1f3e-6d0e-4a7b-9a55-2f8d1d8c4e01",
                "title": "A",
                "release_date": "2024-07-05T00:00:00+09:00",
                "tags": ["Fantasy", "Adventure"],
                "episodes": [{ "title": "Episode 1" }]
            },
            {
                "id": "6f1c54a2-8a57-4b3a-9c0b-3a1f0f6c2d11",
                "title": "B",
                "release_date": "2024-07-03T00:00:00+09:00"
            }
        ],
        "new_arrivals": [
            { "id": "c3d1e9a4-1b2c-4d5e-8f90-0a1b2c3d4e5f", "title": "C" }
        ]
    }"#;

    struct Env {
        preferences: Preferences,
        reminders: Reminders,
        delivered: mpsc::UnboundedReceiver<Reminder>,
        clock: Clock,
    }

    impl Env {
        async fn new() -> Self {
            let (reminders, delivered) = Reminders::spawn();

            Self {
                preferences: Preferences::in_memory().await.expect("Open preferences"),
                reminders,
                delivered,
                clock: Clock::pinned(
                    NaiveDate::from_ymd_opt(2024, 7, 3).unwrap(),
                    FixedOffset::east_opt(9 * 3600).unwrap(),
                ),
            }
        }

        /// Feeds the messages to the screen, running every task it returns.
        async fn send(&self, screen: &mut NewAndNow, messages: impl IntoIterator<Item = Message>) {
            let mut pending: Vec<Message> = messages.into_iter().collect();

            while !pending.is_empty() {
                let message = pending.remove(0);

                if let Action::Run(task) =
                    screen.update(message, &self.preferences, &self.reminders, &self.clock)
                {
                    pending.extend(task.collect().await);
                }
            }
        }

        async fn loaded(&self) -> NewAndNow {
            let (mut screen, _fetch) = NewAndNow::new(catalog::Source::Bundled);
            let catalog = Catalog::decode(CATALOG.as_bytes()).expect("Decode catalog");

            self.send(&mut screen, [Message::Fetched(Ok(catalog))]).await;

            screen
        }
    }

    fn id(id: &str) -> webtoon::Id {
        id.parse().expect("Valid id")
    }

    fn a() -> webtoon::Id {
        id("0b6a1f3e-6d0e-4a7b-9a55-2f8d1d8c4e01")
    }

    fn b() -> webtoon::Id {
        id("6f1c54a2-8a57-4b3a-9c0b-3a1f0f6c2d11")
    }

    fn c() -> webtoon::Id {
        id("c3d1e9a4-1b2c-4d5e-8f90-0a1b2c3d4e5f")
    }

    fn notified(screen: &NewAndNow) -> Vec<webtoon::Id> {
        screen.notifications().iter().map(|item| item.id).collect()
    }

    #[tokio::test]
    async fn available_webtoons_are_reminded_first() {
        let mut env = Env::new().await;
        let mut screen = env.loaded().await;

        env.send(&mut screen, [Message::NotifyToggled(b())]).await;

        let reminder = env.delivered.recv().await.expect("Reminder delivered");
        assert_eq!(reminder.id, b());
        assert_eq!(reminder.body, "B is now available to read.");

        env.send(&mut screen, [Message::NotifyToggled(a())]).await;

        assert_eq!(notified(&screen), vec![b(), a()]);
        assert_eq!(screen.scroll_target(), Some(a()));
        assert!(screen.is_notified(a()));
        assert!(screen.is_notified(b()));

        let stored = env.preferences.list_notified_ids().await.unwrap();
        assert_eq!(BTreeSet::from_iter(stored), BTreeSet::from([a(), b()]));

        assert_eq!(env.reminders.pending().await, Vec::new());
        assert!(env.delivered.try_recv().is_err());
    }

    #[tokio::test]
    async fn toggling_twice_restores_everything() {
        let env = Env::new().await;
        let mut screen = env.loaded().await;

        env.send(&mut screen, [Message::NotifyToggled(b())]).await;

        let before = screen.notifications().to_vec();
        let stored = env.preferences.list_notified_ids().await.unwrap();

        env.send(
            &mut screen,
            [Message::NotifyToggled(a()), Message::NotifyToggled(a())],
        )
        .await;

        assert_eq!(screen.notifications(), before.as_slice());
        assert_eq!(env.preferences.list_notified_ids().await.unwrap(), stored);
        assert!(!screen.is_notified(a()));
    }

    #[tokio::test]
    async fn new_arrivals_cannot_be_notified() {
        let env = Env::new().await;
        let mut screen = env.loaded().await;

        env.send(&mut screen, [Message::NotifyToggled(c())]).await;

        assert!(screen.notifications().is_empty());
        assert!(!screen.is_notified(c()));
        assert!(env.preferences.list_notified_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stored_preferences_are_restored() {
        let env = Env::new().await;

        env.preferences.add(a()).await.unwrap();
        env.preferences.add(c()).await.unwrap();

        let screen = env.loaded().await;

        assert_eq!(notified(&screen), vec![a()]);
        assert!(screen.is_notified(a()));
        assert!(!screen.is_notified(b()));
        assert!(!screen.is_notified(c()));
        assert!(env.reminders.pending().await.is_empty());
    }

    #[tokio::test]
    async fn storage_failures_raise_an_alert() {
        let env = Env::new().await;
        let mut screen = env.loaded().await;

        env.preferences.close().await;
        env.send(&mut screen, [Message::NotifyToggled(a())]).await;

        assert!(screen.alert().is_some());
        assert!(screen.is_notified(a()));
        assert_eq!(notified(&screen), vec![a()]);

        env.send(&mut screen, [Message::AlertDismissed]).await;

        assert!(screen.alert().is_none());
    }

    #[tokio::test]
    async fn listing_failures_leave_rows_unnotified() {
        let env = Env::new().await;

        env.preferences.add(a()).await.unwrap();
        env.preferences.close().await;

        let screen = env.loaded().await;

        assert!(screen.alert().is_some());
        assert!(!screen.is_notified(a()));
        assert!(screen.notifications().is_empty());
    }

    #[tokio::test]
    async fn failed_fetches_can_be_retried() {
        let env = Env::new().await;
        let path = std::env::temp_dir().join(format!("manta-{}.json", webtoon::Id::generate()));

        let (mut screen, fetch) = NewAndNow::new(catalog::Source::File(path.clone()));
        assert!(screen.is_loading());

        env.send(&mut screen, fetch.collect().await).await;

        assert!(screen.error().is_some_and(FetchError::is_transport));
        assert!(screen.rows().is_empty());

        std::fs::write(&path, CATALOG).unwrap();
        env.send(&mut screen, [Message::Retry]).await;

        assert!(screen.error().is_none());
        assert_eq!(screen.rows().len(), 3);
        assert_eq!(screen.rows_in(ReleaseStatus::ComingSoon).count(), 2);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn dropped_screens_abort_their_fetch() {
        let (screen, fetch) = NewAndNow::new(catalog::Source::Bundled);

        drop(screen);

        assert!(fetch.collect().await.is_empty());
    }

    #[tokio::test]
    async fn pressing_a_notification_scrolls_to_its_row() {
        let env = Env::new().await;
        let mut screen = env.loaded().await;

        let action = screen.update(
            Message::NotificationPressed(b()),
            &env.preferences,
            &env.reminders,
            &env.clock,
        );

        assert!(matches!(action, Action::Run(_)));

        let scroll = screen.scroll().expect("Screen is loaded");
        assert_eq!(scroll.offset(), Row::HEIGHT_WITH_EPISODES);
        assert!(scroll.is_scrolling());
        let generation = scroll.generation();

        let _ = screen.update(
            Message::Scrolled(5000.0),
            &env.preferences,
            &env.reminders,
            &env.clock,
        );
        assert_eq!(screen.scroll().map(scroll::Sync::selected), Some(Category::ComingSoon));

        env.send(
            &mut screen,
            [Message::ScrollFinished(generation), Message::Scrolled(5000.0)],
        )
        .await;
        assert_eq!(screen.scroll().map(scroll::Sync::selected), Some(Category::NewArrivals));
    }

    #[tokio::test]
    async fn overlapping_scrolls_finish_with_the_latest() {
        let env = Env::new().await;
        let mut screen = env.loaded().await;

        let update = |screen: &mut NewAndNow, message| {
            let _ = screen.update(message, &env.preferences, &env.reminders, &env.clock);
        };

        update(&mut screen, Message::NotificationPressed(b()));
        let first = screen.scroll().map(scroll::Sync::generation).unwrap();

        update(&mut screen, Message::CategorySelected(Category::NewArrivals));
        let second = screen.scroll().map(scroll::Sync::generation).unwrap();

        update(&mut screen, Message::ScrollFinished(first));
        update(&mut screen, Message::Scrolled(0.0));

        assert!(screen.scroll().is_some_and(scroll::Sync::is_scrolling));
        assert_eq!(screen.scroll().map(scroll::Sync::selected), Some(Category::NewArrivals));

        update(&mut screen, Message::ScrollFinished(second));
        update(&mut screen, Message::Scrolled(0.0));

        assert_eq!(screen.scroll().map(scroll::Sync::selected), Some(Category::ComingSoon));
    }

    #[tokio::test]
    async fn toggles_win_over_a_stale_listing() {
        let env = Env::new().await;
        env.preferences.add(a()).await.unwrap();

        let (mut screen, _fetch) = NewAndNow::new(catalog::Source::Bundled);
        let catalog = Catalog::decode(CATALOG.as_bytes()).expect("Decode catalog");

        let Action::Run(listing) =
            screen.update(Message::Fetched(Ok(catalog)), &env.preferences, &env.reminders, &env.clock)
        else {
            panic!("Stored ids should be listed");
        };

        let listed = listing.collect().await;

        env.send(
            &mut screen,
            [Message::NotifyToggled(a()), Message::NotifyToggled(a())],
        )
        .await;
        env.send(&mut screen, listed).await;

        assert!(!screen.is_notified(a()));
        assert!(screen.notifications().is_empty());
        assert!(env.preferences.list_notified_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_keep_the_first_webtoon() {
        let env = Env::new().await;
        let (mut screen, _fetch) = NewAndNow::new(catalog::Source::Bundled);

        let catalog = Catalog::decode(
            br#"{
                "coming_soon": [
                    {
                        "id": "0b6a1f3e-6d0e-4a7b-9a55-2f8d1d8c4e01",
                        "title": "A",
                        "release_date": "2024-07-05T00:00:00+09:00"
                    }
                ],
                "new_arrivals": [
                    { "id": "0b6a1f3e-6d0e-4a7b-9a55-2f8d1d8c4e01", "title": "Impostor" },
                    { "id": "c3d1e9a4-1b2c-4d5e-8f90-0a1b2c3d4e5f", "title": "C" }
                ]
            }"#,
        )
        .expect("Decode catalog");

        env.send(&mut screen, [Message::Fetched(Ok(catalog))]).await;

        assert_eq!(screen.rows().len(), 2);
        assert_eq!(screen.row(a()).map(|row| row.title.as_str()), Some("A"));
        assert_eq!(screen.row(c()).map(|row| row.title.as_str()), Some("C"));
    }

    #[tokio::test]
    async fn rows_can_be_expanded_and_opened() {
        let env = Env::new().await;
        let mut screen = env.loaded().await;

        env.send(
            &mut screen,
            [Message::SummaryToggled(a()), Message::EpisodesToggled(a())],
        )
        .await;

        let row = screen.row(a()).expect("Row exists");
        assert!(row.is_summary_expanded);
        assert!(row.is_episodes_expanded);

        let Action::Open(detail) =
            screen.update(Message::Open(a()), &env.preferences, &env.reminders, &env.clock)
        else {
            panic!("Detail should open");
        };

        assert_eq!(detail.id, a());
        assert_eq!(detail.displayed_tag(), "Fantasy · Adventure");
        assert!(!detail.is_notified);
    }
}
