//! A line-based stand-in for the view layer.
use crate::Message;
use crate::screen::detail::Button;
use crate::scroll::Category;

use std::str::FromStr;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub const HELP: &str = "\
list                 show the release list
notify <n>           toggle the reminder of the n-th row
open <n>             open the n-th row
summary <n>          expand or collapse the summary of the n-th row
episodes <n>         expand or collapse the episodes of the n-th row
jump <n>             scroll to the row of the n-th reminder
scroll <offset>      scroll the release list
tab coming|new       select a category
press <button>       press a button of the open webtoon
tags                 show all the tags of the open webtoon
close                close the open webtoon
retry                fetch the catalog again after a failure
reload               reload the release list
dismiss              dismiss the alert
quit                 exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Notify(usize),
    Open(usize),
    Summary(usize),
    Episodes(usize),
    Jump(usize),
    Scroll(f32),
    Tab(Category),
    Press(Button),
    Tags,
    Close,
    Retry,
    Reload,
    Dismiss,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();

        let Some(command) = words.next() else {
            return Ok(Command::List);
        };

        let argument = words.next();

        let index = || -> Result<usize, String> {
            let argument = argument.ok_or_else(|| format!("{command} needs a number"))?;

            match argument.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n - 1),
                _ => Err(format!("invalid number: {argument}")),
            }
        };

        Ok(match command {
            "list" | "ls" => Command::List,
            "notify" => Command::Notify(index()?),
            "open" => Command::Open(index()?),
            "summary" => Command::Summary(index()?),
            "episodes" => Command::Episodes(index()?),
            "jump" => Command::Jump(index()?),
            "scroll" => Command::Scroll(
                argument
                    .and_then(|offset| offset.parse().ok())
                    .ok_or_else(|| "scroll needs an offset".to_owned())?,
            ),
            "tab" => Command::Tab(match argument {
                Some("coming") => Category::ComingSoon,
                Some("new") => Category::NewArrivals,
                _ => return Err("tab needs coming or new".to_owned()),
            }),
            "press" => Command::Press(argument.unwrap_or_default().parse()?),
            "tags" => Command::Tags,
            "close" => Command::Close,
            "retry" => Command::Retry,
            "reload" => Command::Reload,
            "dismiss" => Command::Dismiss,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(format!("unknown command: {command}")),
        })
    }
}

/// Reads commands from the standard input until it is closed.
pub fn spawn(output: mpsc::UnboundedSender<Message>) {
    drop(tokio::spawn(async move {
        let mut lines = BufReader::new(io::stdin()).lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(error) => {
                    log::error!("Standard input failed: {error}");
                    break;
                }
            };

            match line.parse() {
                Ok(command) => {
                    if output.send(Message::Command(command)).is_err() {
                        return;
                    }
                }
                Err(error) => println!("{error} (try help)"),
            }
        }

        let _ = output.send(Message::Command(Command::Quit));
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn commands_use_one_based_indices() {
        assert_eq!("notify 1".parse::<Command>(), Ok(Command::Notify(0)));
        assert_eq!("open 3".parse::<Command>(), Ok(Command::Open(2)));
        assert_eq!("jump 2".parse::<Command>(), Ok(Command::Jump(1)));
        assert!("notify 0".parse::<Command>().is_err());
        assert!("notify".parse::<Command>().is_err());
    }

    #[test]
    fn commands_parse_their_arguments() {
        assert_eq!("".parse::<Command>(), Ok(Command::List));
        assert_eq!("scroll 1100.5".parse::<Command>(), Ok(Command::Scroll(1100.5)));
        assert_eq!("tab new".parse::<Command>(), Ok(Command::Tab(Category::NewArrivals)));
        assert_eq!(
            "press notification".parse::<Command>(),
            Ok(Command::Press(Button::Notification))
        );
        assert!("press share".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }
}
