use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::render::{loading_line, render_search_results, render_user, render_view};
use super::{Explorer, ExplorerApi, ExplorerError, Outcome};
use crate::models::SearchResultItem;

const HELP: &str = "\
Commands:
  type <text>            edit the search box (searches after a short pause)
  search [text]          search now, for <text> or the current term
  open <number|login>    show a user from the result list
  details <repo>         load commit details for a repository of the shown user
  show                   print the whole view
  help                   print this help
  quit                   leave";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command `{0}`, try `help`")]
    Unknown(String),

    #[error("`{0}` needs an argument, try `help`")]
    MissingArgument(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Type(String),
    Search(Option<String>),
    Open(String),
    Details(String),
    Show,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    let command = match word {
        "type" => Command::Type(rest.to_string()),
        "search" => Command::Search(argument),
        "open" => Command::Open(argument.ok_or(ParseError::MissingArgument("open"))?),
        "details" => Command::Details(argument.ok_or(ParseError::MissingArgument("details"))?),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// Find the login behind `open <key>`: a 1-based index into the results,
/// otherwise a login present in the results.
pub fn resolve_result(results: &[SearchResultItem], key: &str) -> Option<String> {
    let by_index = key
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| results.get(i));
    by_index
        .or_else(|| results.iter().find(|item| item.login == key))
        .map(|item| item.login.clone())
}

/// Whether `command` will reach the proxy, given the current view.
/// The spinner is printed for exactly these.
pub fn starts_fetch(command: &Command, search_term: &str, has_selected_user: bool) -> bool {
    match command {
        Command::Type(term) => !term.is_empty(),
        Command::Search(Some(term)) => !term.is_empty(),
        Command::Search(None) => !search_term.is_empty(),
        Command::Open(_) => true,
        Command::Details(_) => has_selected_user,
        Command::Show | Command::Help | Command::Quit => false,
    }
}

#[derive(Debug, Clone, Copy)]
enum Section {
    Results,
    User,
}

/// Print the affected part of the view once an action's response was applied.
/// Failures were already logged by the explorer.
async fn print_outcome<A: ExplorerApi>(
    explorer: &Explorer<A>,
    result: Result<Outcome, ExplorerError>,
    section: Section,
) {
    match result {
        Ok(Outcome::Applied) => {
            let view = explorer.snapshot().await;
            match section {
                Section::Results => print!("{}", render_search_results(&view.search_results)),
                Section::User => {
                    if let Some(record) = &view.selected_user {
                        print!("{}", render_user(record));
                    }
                }
            }
        }
        Ok(outcome) => debug!(?outcome, "nothing to print"),
        Err(e) => debug!(error = %e, "action failed"),
    }
}

/// Read commands from stdin until `quit` or end of input.
/// Fetches run as independent tasks; the prompt never waits on them.
pub async fn run<A: ExplorerApi + 'static>(explorer: Arc<Explorer<A>>) -> Result<(), ExplorerError> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        debug!(?command, "shell command");

        let view = explorer.snapshot().await;
        let fetching = starts_fetch(&command, &view.search_term, view.selected_user.is_some());

        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Show => print!("{}", render_view(&view)),
            Command::Type(term) => {
                let explorer = explorer.clone();
                tokio::spawn(async move {
                    let result = explorer.type_term(&term).await;
                    print_outcome(&explorer, result, Section::Results).await;
                });
            }
            Command::Search(term) => {
                let explorer = explorer.clone();
                tokio::spawn(async move {
                    let result = explorer.submit_search(term.as_deref()).await;
                    print_outcome(&explorer, result, Section::Results).await;
                });
            }
            Command::Open(key) => {
                let Some(login) = resolve_result(&view.search_results, &key) else {
                    println!("No search result `{key}`");
                    continue;
                };
                let explorer = explorer.clone();
                tokio::spawn(async move {
                    let result = explorer.select_user(&login).await;
                    print_outcome(&explorer, result, Section::User).await;
                });
            }
            Command::Details(repo) => {
                let explorer = explorer.clone();
                tokio::spawn(async move {
                    let result = explorer.load_repo_details(&repo).await;
                    print_outcome(&explorer, result, Section::User).await;
                });
            }
        }

        if fetching {
            print!("{}", loading_line());
        }
    }

    info!("leaving explorer");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<SearchResultItem> {
        vec![
            SearchResultItem {
                id: 1,
                login: "octocat".to_string(),
            },
            SearchResultItem {
                id: 2,
                login: "1337".to_string(),
            },
        ]
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("type  octo cat ").unwrap(),
            Some(Command::Type("octo cat".to_string()))
        );
        assert_eq!(parse_command("type").unwrap(), Some(Command::Type(String::new())));
        assert_eq!(parse_command("search").unwrap(), Some(Command::Search(None)));
        assert_eq!(
            parse_command("search test").unwrap(),
            Some(Command::Search(Some("test".to_string())))
        );
        assert_eq!(
            parse_command("open 2").unwrap(),
            Some(Command::Open("2".to_string()))
        );
        assert_eq!(
            parse_command("details Hello-World").unwrap(),
            Some(Command::Details("Hello-World".to_string()))
        );
        assert_eq!(parse_command("exit").unwrap(), Some(Command::Quit));
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("open"), Err(ParseError::MissingArgument("open")));
        assert_eq!(
            parse_command("details  "),
            Err(ParseError::MissingArgument("details"))
        );
        assert_eq!(
            parse_command("frobnicate now"),
            Err(ParseError::Unknown("frobnicate".to_string()))
        );
    }

    #[test]
    fn test_spinner_only_for_commands_that_fetch() {
        assert!(starts_fetch(&Command::Type("oct".to_string()), "", false));
        assert!(!starts_fetch(&Command::Type(String::new()), "oct", false));
        assert!(starts_fetch(&Command::Search(None), "oct", false));
        assert!(!starts_fetch(&Command::Search(None), "", false));
        assert!(starts_fetch(&Command::Search(Some("x".to_string())), "", false));
        assert!(starts_fetch(&Command::Open("1".to_string()), "", false));
        assert!(starts_fetch(&Command::Details("repo".to_string()), "", true));
        assert!(!starts_fetch(&Command::Details("repo".to_string()), "", false));
        assert!(!starts_fetch(&Command::Show, "oct", true));
        assert!(!starts_fetch(&Command::Quit, "oct", true));
    }

    #[test]
    fn test_resolve_by_index_or_login() {
        let results = results();
        assert_eq!(resolve_result(&results, "1").as_deref(), Some("octocat"));
        assert_eq!(resolve_result(&results, "octocat").as_deref(), Some("octocat"));
        assert_eq!(resolve_result(&results, "1337").as_deref(), Some("1337"));
        assert_eq!(resolve_result(&results, "0"), None);
        assert_eq!(resolve_result(&results, "3"), None);
        assert_eq!(resolve_result(&results, "nobody"), None);
    }
}
