//! Command-line front end for local to-do list stores.
//!
//! # Responsibility
//! - Resolve settings from the environment and open the store once.
//! - Map each subcommand to one DAL call and print the result as JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use todo_core::config::DB_PATH_ENV;
use todo_core::db::{open_db, open_db_in_memory, ping};
use todo_core::{core_version, init_logging, SqliteDocumentStore, ToDoDal, TodoConfig};

/// Manage to-do lists stored in a local SQLite document store.
///
/// The database file is read from `TODO_DB_PATH`, which every command except
/// `ping` and `version` requires.
#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all lists with their item counts, sorted by name
    Lists,
    /// Create an empty list
    CreateList { name: String },
    /// Show one list with its items
    Show { list_id: String },
    /// Delete a list and all its items
    DeleteList { list_id: String },
    /// Append an unchecked item to a list
    AddItem { list_id: String, label: String },
    /// Set the checked state of one item
    Check {
        list_id: String,
        item_id: String,
        #[arg(action = clap::ArgAction::Set)]
        checked: bool,
    },
    /// Remove one item from a list
    RemoveItem { list_id: String, item_id: String },
    /// Verify the database answers (a scratch in-memory one when
    /// `TODO_DB_PATH` is unset)
    Ping,
    /// Print the core library version
    Version,
}

#[derive(Serialize)]
struct CreatedList<'a> {
    id: String,
    name: &'a str,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = TodoConfig::from_env()?;

    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.log_level, log_dir).map_err(anyhow::Error::msg)?;
    }

    // Version must work without a reachable database.
    if matches!(cli.command, Command::Version) {
        return Ok(print_version());
    }

    let conn = match database_path(&config, &cli.command)? {
        Some(path) => open_db(path)
            .with_context(|| format!("failed to open database `{}`", path.display()))?,
        None => open_db_in_memory().context("failed to open in-memory database")?,
    };
    ping(&conn).context("database is not answering")?;
    info!("event=cli_start module=cli status=ok command={:?}", cli.command);

    let dal = ToDoDal::new(SqliteDocumentStore::try_new(&conn)?);
    run(&dal, cli.command)
}

/// Resolves where `command` keeps its lists.
///
/// `None` means a throwaway in-memory database, which only `ping` may use.
fn database_path<'a>(config: &'a TodoConfig, command: &Command) -> Result<Option<&'a Path>> {
    match (config.db_path.as_deref(), command) {
        (Some(path), _) => Ok(Some(path)),
        (None, Command::Ping | Command::Version) => Ok(None),
        (None, _) => bail!("{DB_PATH_ENV} must name the database file for this command"),
    }
}

fn run(dal: &ToDoDal<SqliteDocumentStore<'_>>, command: Command) -> Result<ExitCode> {
    match command {
        Command::Lists => print_json(&dal.list_todo_lists(None)?),
        Command::CreateList { name } => {
            let id = dal.create_todo_list(&name, None)?;
            print_json(&CreatedList {
                id: id.to_string(),
                name: &name,
            })
        }
        Command::Show { list_id } => print_json(&dal.get_todo_list(&list_id, None)?),
        Command::DeleteList { list_id } => {
            if dal.delete_todo_list(&list_id, None)? {
                Ok(ExitCode::SUCCESS)
            } else {
                not_found(&list_id)
            }
        }
        Command::AddItem { list_id, label } => {
            print_or_not_found(dal.create_item(&list_id, &label, None)?, &list_id)
        }
        Command::Check {
            list_id,
            item_id,
            checked,
        } => print_or_not_found(
            dal.set_checked_state(&list_id, &item_id, checked, None)?,
            &list_id,
        ),
        Command::RemoveItem { list_id, item_id } => {
            print_or_not_found(dal.delete_item(&list_id, &item_id, None)?, &list_id)
        }
        Command::Ping => {
            println!("pong");
            Ok(ExitCode::SUCCESS)
        }
        Command::Version => Ok(print_version()),
    }
}

fn print_version() -> ExitCode {
    println!("todo_core version={}", core_version());
    ExitCode::SUCCESS
}

fn print_or_not_found<T: Serialize>(value: Option<T>, list_id: &str) -> Result<ExitCode> {
    match value {
        Some(value) => print_json(&value),
        None => not_found(list_id),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(ExitCode::SUCCESS)
}

fn not_found(list_id: &str) -> Result<ExitCode> {
    eprintln!("not found: {list_id}");
    Ok(ExitCode::FAILURE)
}

#[cfg(test)]
mod tests {
    use super::{database_path, Cli, Command};
    use clap::{CommandFactory, Parser};
    use std::path::Path;
    use todo_core::TodoConfig;

    fn config(db_path: Option<&str>) -> TodoConfig {
        TodoConfig::from_lookup(|key| match key {
            "TODO_DB_PATH" => db_path.map(str::to_string),
            _ => None,
        })
        .unwrap()
    }

    fn command(args: &[&str]) -> Command {
        let mut argv = vec!["todo"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_parses_explicit_boolean() {
        let cli = Cli::try_parse_from(["todo", "check", "list", "item", "false"]).unwrap();
        match cli.command {
            Command::Check {
                list_id,
                item_id,
                checked,
            } => {
                assert_eq!(list_id, "list");
                assert_eq!(item_id, "item");
                assert!(!checked);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["todo", "check", "list", "item", "maybe"]).is_err());
    }

    #[test]
    fn list_commands_require_a_database_file() {
        let unset = config(None);
        for args in [
            vec!["lists"],
            vec!["create-list", "groceries"],
            vec!["show", "id"],
            vec!["delete-list", "id"],
            vec!["add-item", "id", "milk"],
            vec!["check", "id", "item", "true"],
            vec!["remove-item", "id", "item"],
        ] {
            let err = database_path(&unset, &command(&args)).unwrap_err();
            assert!(err.to_string().contains("TODO_DB_PATH"), "{args:?}");
        }
    }

    #[test]
    fn ping_and_version_run_without_a_database_file() {
        let unset = config(None);
        assert!(database_path(&unset, &Command::Ping).unwrap().is_none());
        assert!(database_path(&unset, &Command::Version).unwrap().is_none());
    }

    #[test]
    fn configured_database_file_is_used_by_every_command() {
        let set = config(Some("/tmp/todo.sqlite3"));
        for cmd in [command(&["lists"]), Command::Ping] {
            assert_eq!(
                database_path(&set, &cmd).unwrap(),
                Some(Path::new("/tmp/todo.sqlite3"))
            );
        }
    }
}
