//! Local release reminders.
//!
//! A background task owns a timer per webtoon. Due reminders are delivered on
//! the channel returned by [`Reminders::spawn`]. Delivery is best-effort.
use crate::ScheduleError;
use crate::webtoon;

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: webtoon::Id,
    pub title: String,
    pub body: String,
    pub delay: Duration,
}

impl Reminder {
    /// A reminder that a webtoon can be read right away.
    pub fn available_now(id: webtoon::Id, title: &str) -> Self {
        Self {
            id,
            title: title.to_owned(),
            body: format!("{title} is now available to read."),
            delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reminders {
    commands: mpsc::UnboundedSender<Command>,
}

enum Command {
    Schedule(Reminder),
    Cancel(webtoon::Id),
    Pending(oneshot::Sender<Vec<webtoon::Id>>),
}

impl Reminders {
    /// Starts the scheduler on the current runtime.
    ///
    /// It stops once every [`Reminders`] handle is dropped.
    pub fn spawn() -> (Self, mpsc::UnboundedReceiver<Reminder>) {
        let (commands, receiver) = mpsc::unbounded_channel();
        let (delivery, delivered) = mpsc::unbounded_channel();

        drop(tokio::spawn(run(receiver, delivery)));

        (Self { commands }, delivered)
    }

    /// Schedules the reminder, replacing any pending one for the same webtoon.
    pub fn schedule(&self, reminder: Reminder) -> Result<(), ScheduleError> {
        self.commands
            .send(Command::Schedule(reminder))
            .map_err(|_| ScheduleError::Stopped)
    }

    /// Cancels the pending reminder of the webtoon, if any.
    pub fn cancel(&self, id: webtoon::Id) {
        if self.commands.send(Command::Cancel(id)).is_err() {
            log::warn!("Reminder for {id} not cancelled: scheduler stopped");
        }
    }

    /// The webtoons with a reminder that has not been delivered yet.
    pub async fn pending(&self) -> Vec<webtoon::Id> {
        let (sender, receiver) = oneshot::channel();

        if self.commands.send(Command::Pending(sender)).is_err() {
            return Vec::new();
        }

        receiver.await.unwrap_or_default()
    }
}

async fn run(
    mut commands: mpsc::UnboundedReceiver<Command>,
    delivery: mpsc::UnboundedSender<Reminder>,
) {
    let mut timers: HashMap<webtoon::Id, JoinHandle<()>> = HashMap::new();

    while let Some(command) = commands.recv().await {
        timers.retain(|_, timer| !timer.is_finished());

        match command {
            Command::Schedule(reminder) => {
                let id = reminder.id;
                let delivery = delivery.clone();

                log::info!(
                    "Scheduling reminder for {id} in {}s",
                    reminder.delay.as_secs()
                );

                let timer = tokio::spawn(async move {
                    time::sleep(reminder.delay).await;

                    if delivery.send(reminder).is_err() {
                        log::warn!("Reminder for {id} dropped: nobody is listening");
                    }
                });

                if let Some(previous) = timers.insert(id, timer) {
                    previous.abort();
                }
            }
            Command::Cancel(id) => {
                if let Some(timer) = timers.remove(&id) {
                    log::info!("Cancelling reminder for {id}");
                    timer.abort();
                }
            }
            Command::Pending(sender) => {
                let _ = sender.send(timers.keys().copied().collect());
            }
        }
    }

    for timer in timers.into_values() {
        timer.abort();
    }
}
