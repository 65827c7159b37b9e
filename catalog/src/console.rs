//! Line commands driving a [`HomePage`] from a terminal.

use crate::client::FoodApi;
use crate::form::{FormField, SubmitOutcome, UnknownField};
use crate::views::{ActiveModal, Finished, HomePage, PageError, Pending};
use std::str::FromStr;
use thiserror::Error;

/// Printed for `help`
pub const HELP: &str = "\
Commands:
  search [term]          find meals by name (blank shows all)
  more                   load more meals
  add                    open the Add Meal form
  menu <n>               toggle the options of meal #n
  edit <n>               edit meal #n (options must be open)
  delete <n>             delete meal #n (options must be open)
  confirm                confirm the pending delete
  set <field> <value>    fill a field of the open form
                         (name, price, rating, image, restaurant, logo, status)
  submit                 save the open form
  cancel                 close the open dialog
  show                   redraw the page
  help                   this text
  quit                   exit";

/// A parsed console line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `search [term]`
    Search(String),
    /// `more`
    More,
    /// `add`
    Add,
    /// `menu <n>`
    Menu(usize),
    /// `edit <n>`
    Edit(usize),
    /// `delete <n>`
    Delete(usize),
    /// `confirm`
    Confirm,
    /// `cancel`
    Cancel,
    /// `set <field> <value>`
    Set(FormField, String),
    /// `submit`
    Submit,
    /// `show`
    Show,
    /// `help`
    Help,
    /// `quit`
    Quit,
}

/// A line that is not a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Blank line
    #[error("type a command, or `help`")]
    Empty,
    /// First word is not a command
    #[error("unknown command {0:?}, try `help`")]
    Unknown(String),
    /// A required argument is missing
    #[error("`{command}` needs {argument}")]
    MissingArgument {
        /// The command
        command: &'static str,
        /// What is missing
        argument: &'static str,
    },
    /// A meal number is not a positive integer
    #[error("{0:?} is not a meal number")]
    InvalidNumber(String),
    /// `set` names no form field
    #[error(transparent)]
    UnknownField(#[from] UnknownField),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        let position = |command: &'static str| -> Result<usize, CommandError> {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command,
                    argument: "a meal number",
                });
            }
            rest.parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| CommandError::InvalidNumber(rest.to_string()))
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "search" | "find" => Ok(Self::Search(rest.to_string())),
            "more" => Ok(Self::More),
            "add" => Ok(Self::Add),
            "menu" => position("menu").map(Self::Menu),
            "edit" => position("edit").map(Self::Edit),
            "delete" => position("delete").map(Self::Delete),
            "confirm" => Ok(Self::Confirm),
            "cancel" => Ok(Self::Cancel),
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(field, value)| (field, value.trim()));
                if field.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "set",
                        argument: "a field name",
                    });
                }
                Ok(Self::Set(field.parse()?, value.to_string()))
            },
            "submit" | "save" => Ok(Self::Submit),
            "show" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// What the shell should do after a command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reply {
    /// Messages to show the user
    pub alerts: Vec<String>,
    /// Redraw the page
    pub redraw: bool,
    /// Leave the shell
    pub quit: bool,
}

impl Reply {
    fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    fn alert(message: impl Into<String>) -> Self {
        Self {
            alerts: vec![message.into()],
            ..Self::default()
        }
    }

    fn redraw_with(message: Option<String>) -> Self {
        Self {
            alerts: message.into_iter().collect(),
            redraw: true,
            quit: false,
        }
    }
}

/// Where a command got to
#[derive(Debug)]
pub enum Step {
    /// Nothing left to wait for
    Done(Reply),
    /// A call is in flight: render the page, then hand it to [`finish`]
    Pending(Pending),
}

const NO_FORM: &str = "No form is open: use `add` or `edit <n>`";

/// Apply one command to the page, stopping before any network wait
pub async fn start<C>(page: &mut HomePage<C>, command: Command) -> Step
where
    C: FoodApi + Clone + 'static,
{
    tracing::debug!(?command, "Console command");

    let reply = match command {
        Command::Search(term) => match page.begin_search(&term).await {
            Ok(pending) => return Step::Pending(pending),
            Err(error) => Reply::alert(error.to_string()),
        },
        Command::More => {
            if page.load_more().await {
                Reply::redraw()
            } else {
                Reply::alert("Nothing more to load")
            }
        },
        Command::Add => page_reply(page.open_add()),
        Command::Menu(position) => page_reply(page.toggle_menu(position)),
        Command::Edit(position) => page_reply(page.choose_edit(position)),
        Command::Delete(position) => page_reply(page.choose_delete(position)),
        Command::Confirm => {
            if !matches!(page.active(), Some(ActiveModal::Delete(_))) {
                Reply::alert("No delete to confirm")
            } else if let Some(pending) = page.begin_delete() {
                return Step::Pending(pending);
            } else {
                Reply::alert("The delete is already running")
            }
        },
        Command::Cancel => {
            if page.cancel() {
                Reply::redraw()
            } else {
                Reply::alert("Nothing to cancel")
            }
        },
        Command::Set(field, value) => match page.active_form_mut() {
            Some(form) => {
                form.set(field, value);
                Reply::default()
            },
            None => Reply::alert(NO_FORM),
        },
        Command::Submit => {
            if page.active_form_mut().is_none() {
                Reply::alert(NO_FORM)
            } else if let Some(pending) = page.begin_submit() {
                return Step::Pending(pending);
            } else {
                // Inline errors are on the form
                Reply::redraw()
            }
        },
        Command::Show => Reply::redraw(),
        Command::Help => Reply::alert(HELP),
        Command::Quit => Reply {
            quit: true,
            ..Reply::default()
        },
    };
    Step::Done(reply)
}

/// Wait for a call started by [`start`] and report its outcome
pub async fn finish<C>(page: &mut HomePage<C>, pending: Pending) -> Reply
where
    C: FoodApi + Clone + 'static,
{
    match page.finish(pending).await {
        Finished::Searched(_) | Finished::Saved(SubmitOutcome::Invalid) => Reply::redraw(),
        Finished::Saved(SubmitOutcome::Saved(food)) => {
            Reply::redraw_with(Some(format!("Saved {}", food.name)))
        },
        Finished::Saved(SubmitOutcome::Failed { alert }) => Reply::redraw_with(Some(alert)),
        Finished::Deleted(alert) => Reply::redraw_with(alert),
    }
}

/// Apply one command and wait for whatever it started
pub async fn apply<C>(page: &mut HomePage<C>, command: Command) -> Reply
where
    C: FoodApi + Clone + 'static,
{
    match start(page, command).await {
        Step::Done(reply) => reply,
        Step::Pending(pending) => finish(page, pending).await,
    }
}

fn page_reply(result: Result<(), PageError>) -> Reply {
    match result {
        Ok(()) => Reply::redraw(),
        Err(error) => Reply::alert(error.to_string()),
    }
}
