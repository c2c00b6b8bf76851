use toonbase;

mod config;
mod notification;
mod row;
mod screen;
mod scroll;
mod shell;
mod task;

use crate::config::Config;
use crate::screen::detail;
use crate::screen::new_and_now;
use crate::screen::{Detail, NewAndNow};
use crate::shell::Command;
use crate::task::Task;
use crate::toonbase::{Clock, Preferences, Reminder, Reminders};

use std::path::PathBuf;
use tokio::sync::mpsc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anywho::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::load().await?;
    let (reminders, mut delivered) = Reminders::spawn();
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let (mut manta, task) = Manta::new(config, reminders);
    task.spawn(&sender);

    shell::spawn(sender.clone());

    loop {
        let message = tokio::select! {
            Some(message) = receiver.recv() => message,
            Some(reminder) = delivered.recv() => Message::ReminderDelivered(reminder),
            else => break,
        };

        if let Message::Command(Command::Quit) = message {
            break;
        }

        let is_visible = message.is_visible();

        manta.update(message).spawn(&sender);

        if is_visible {
            println!("{}\n", manta.view());
        }
    }

    manta.shutdown().await;

    Ok(())
}

struct Manta {
    config: Config,
    clock: Clock,
    reminders: Reminders,
    state: State,
}

enum State {
    Loading,
    Ready {
        preferences: Preferences,
        new_and_now: NewAndNow,
        detail: Option<Detail>,
    },
}

#[derive(Debug, Clone)]
enum Message {
    Loaded(Preferences),
    NewAndNow(new_and_now::Message),
    Detail(detail::Message),
    Command(Command),
    Reload,
    ReminderDelivered(Reminder),
}

impl Message {
    fn is_visible(&self) -> bool {
        matches!(
            self,
            Message::Command(_)
                | Message::ReminderDelivered(_)
                | Message::NewAndNow(
                    new_and_now::Message::Fetched(_)
                        | new_and_now::Message::NotifiedListed(_)
                        | new_and_now::Message::Stored(_, Err(_))
                )
        )
    }
}

impl Manta {
    fn new(config: Config, reminders: Reminders) -> (Self, Task<Message>) {
        let clock = config.clock();
        let database = config.database_path();

        (
            Self {
                config,
                clock,
                reminders,
                state: State::Loading,
            },
            Task::perform(open(database), Message::Loaded),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Loaded(preferences) => {
                let (new_and_now, task) = NewAndNow::new(self.config.catalog.clone());

                self.state = State::Ready {
                    preferences,
                    new_and_now,
                    detail: None,
                };

                task.map(Message::NewAndNow)
            }
            Message::NewAndNow(message) => {
                let State::Ready {
                    preferences,
                    new_and_now,
                    detail,
                } = &mut self.state
                else {
                    return Task::none();
                };

                let task = match new_and_now.update(message, preferences, &self.reminders, &self.clock)
                {
                    new_and_now::Action::None => Task::none(),
                    new_and_now::Action::Run(task) => task.map(Message::NewAndNow),
                    new_and_now::Action::Open(new_detail) => {
                        *detail = Some(new_detail);

                        Task::none()
                    }
                };

                if let Some(detail) = detail {
                    detail.is_notified = new_and_now.is_notified(detail.id);
                }

                task
            }
            Message::Detail(message) => {
                let State::Ready {
                    detail: Some(current),
                    ..
                } = &mut self.state
                else {
                    return Task::none();
                };

                match current.update(message) {
                    detail::Action::None => Task::none(),
                    detail::Action::Dismiss => {
                        if let State::Ready { detail, .. } = &mut self.state {
                            *detail = None;
                        }

                        Task::none()
                    }
                    detail::Action::ToggleNotification(id) => {
                        self.update(Message::NewAndNow(new_and_now::Message::NotifyToggled(id)))
                    }
                }
            }
            Message::Reload => {
                let State::Ready {
                    new_and_now,
                    detail,
                    ..
                } = &mut self.state
                else {
                    return Task::none();
                };

                log::info!("Reloading release list");

                let (reloaded, task) = NewAndNow::new(self.config.catalog.clone());

                *new_and_now = reloaded;
                *detail = None;

                task.map(Message::NewAndNow)
            }
            Message::ReminderDelivered(reminder) => {
                log::info!("Reminder delivered: {}", reminder.title);

                println!("** {}: {}", reminder.title, reminder.body);

                Task::none()
            }
            Message::Command(command) => self.run(command),
        }
    }

    fn run(&mut self, command: Command) -> Task<Message> {
        let State::Ready { new_and_now, .. } = &self.state else {
            return Task::none();
        };

        let row = |index: usize| new_and_now.rows().get(index).map(|row| row.id);

        let message = match command {
            Command::List | Command::Quit => return Task::none(),
            Command::Help => {
                println!("{}", shell::HELP);

                return Task::none();
            }
            Command::Notify(index) => row(index).map(new_and_now::Message::NotifyToggled),
            Command::Open(index) => row(index).map(new_and_now::Message::Open),
            Command::Summary(index) => row(index).map(new_and_now::Message::SummaryToggled),
            Command::Episodes(index) => row(index).map(new_and_now::Message::EpisodesToggled),
            Command::Jump(index) => new_and_now
                .notifications()
                .get(index)
                .map(|item| new_and_now::Message::NotificationPressed(item.id)),
            Command::Scroll(offset) => Some(new_and_now::Message::Scrolled(offset)),
            Command::Tab(category) => Some(new_and_now::Message::CategorySelected(category)),
            Command::Retry => Some(new_and_now::Message::Retry),
            Command::Dismiss => Some(new_and_now::Message::AlertDismissed),
            Command::Press(button) => {
                return self.update(Message::Detail(detail::Message::ButtonPressed(button)));
            }
            Command::Tags => return self.update(Message::Detail(detail::Message::TagsToggled)),
            Command::Close => return self.update(Message::Detail(detail::Message::Dismiss)),
            Command::Reload => return self.update(Message::Reload),
        };

        let Some(message) = message else {
            println!("No such entry");

            return Task::none();
        };

        self.update(Message::NewAndNow(message))
    }

    fn view(&self) -> String {
        match &self.state {
            State::Loading => "Loading...".to_owned(),
            State::Ready {
                new_and_now,
                detail,
                ..
            } => match detail {
                Some(detail) => detail.view(&self.clock),
                None => new_and_now.view(&self.clock),
            },
        }
    }

    async fn shutdown(self) {
        if let State::Ready { preferences, .. } = self.state {
            preferences.close().await;
        }
    }
}

async fn open(database: PathBuf) -> Preferences {
    match Preferences::open(&database).await {
        Ok(preferences) => preferences,
        Err(error) => {
            log::error!("Preferences could not be opened: {error}");

            Preferences::unavailable(error)
        }
    }
}
