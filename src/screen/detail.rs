use crate::toonbase::{Clock, Webtoon};
use crate::toonbase::webtoon::{self, Episode, ReleaseStatus};

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub id: webtoon::Id,
    pub release_status: ReleaseStatus,
    pub release_date: Option<DateTime<Utc>>,
    pub title: String,
    pub summary: String,
    pub age_rating: String,
    pub thumbnail: Option<Url>,
    pub tags: Vec<String>,
    pub creators: Vec<(&'static str, String)>,
    pub episodes: Vec<Episode>,
    pub buttons: Vec<Button>,
    pub is_notified: bool,
    pub is_tags_expanded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Dismiss,
    ButtonPressed(Button),
    TagsToggled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Dismiss,
    ToggleNotification(webtoon::Id),
}

impl Detail {
    const VISIBLE_TAGS: usize = 5;

    pub fn project(webtoon: &Webtoon, is_notified: bool) -> Self {
        let mut buttons = vec![Button::Save, Button::Notification, Button::Rate];

        if !webtoon.episodes.is_empty() {
            buttons.extend([Button::Download, Button::Highlights]);
        }

        Self {
            id: webtoon.id,
            release_status: webtoon.release_status(),
            release_date: webtoon.release_date,
            title: webtoon.title.clone(),
            summary: webtoon.summary.clone(),
            age_rating: webtoon.age_rating.clone(),
            thumbnail: webtoon.thumbnail.clone(),
            tags: webtoon.tags.clone(),
            creators: webtoon
                .creators
                .details()
                .into_iter()
                .map(|(role, name)| (role, name.to_owned()))
                .collect(),
            episodes: webtoon.episodes.clone(),
            buttons,
            is_notified,
            is_tags_expanded: false,
        }
    }

    pub fn update(&mut self, message: Message) -> Action {
        match message {
            Message::Dismiss => Action::Dismiss,
            Message::ButtonPressed(Button::Notification) => {
                if self.release_status != ReleaseStatus::ComingSoon {
                    log::debug!("{} is already out", self.title);

                    return Action::None;
                }

                Action::ToggleNotification(self.id)
            }
            Message::ButtonPressed(button) => {
                if !self.buttons.contains(&button) {
                    return Action::None;
                }

                log::info!("{button} pressed for {}", self.title);

                Action::None
            }
            Message::TagsToggled => {
                self.is_tags_expanded = !self.is_tags_expanded;

                Action::None
            }
        }
    }

    /// The first two tags, when there are at least two.
    pub fn displayed_tag(&self) -> String {
        if self.tags.len() < 2 {
            return String::new();
        }

        self.tags[..2].join(" · ")
    }

    pub fn visible_tags(&self) -> &[String] {
        if self.is_tags_expanded {
            &self.tags
        } else {
            &self.tags[..self.tags.len().min(Self::VISIBLE_TAGS)]
        }
    }

    pub fn view(&self, clock: &Clock) -> String {
        let mut lines = vec![format!("<< {} ({})", self.title, self.age_rating)];

        let displayed_tag = self.displayed_tag();

        if !displayed_tag.is_empty() {
            lines.push(displayed_tag);
        }

        if let Some(thumbnail) = &self.thumbnail {
            lines.push(format!("Cover: {thumbnail}"));
        }

        if let Some(date) = self.release_date {
            lines.push(format!("Releases on {}", clock.local_date(date)));
        }

        if !self.summary.is_empty() {
            lines.push(self.summary.clone());
        }

        lines.push(
            self.buttons
                .iter()
                .map(|button| match button {
                    Button::Notification if self.is_notified => format!("[{button} on]"),
                    _ => format!("[{button}]"),
                })
                .collect::<Vec<_>>()
                .join(" "),
        );

        if !self.tags.is_empty() {
            let mut tags = self.visible_tags().join(", ");

            if self.visible_tags().len() < self.tags.len() {
                tags.push_str(", ...");
            }

            lines.push(format!("Tags: {tags}"));
        }

        lines.extend(
            self.creators
                .iter()
                .map(|(role, name)| format!("{role}: {name}")),
        );

        lines.push(format!("{} Episodes", self.episodes.len()));

        lines.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Save,
    Notification,
    Rate,
    Download,
    Highlights,
}

impl Button {
    pub fn title(self) -> &'static str {
        match self {
            Button::Save => "Save",
            Button::Notification => "Notification",
            Button::Rate => "Rate",
            Button::Download => "Download",
            Button::Highlights => "Highlights",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Button {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Button::Save,
            Button::Notification,
            Button::Rate,
            Button::Download,
            Button::Highlights,
        ]
        .into_iter()
        .find(|button| button.title().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown button: {s}"))
    }
}
