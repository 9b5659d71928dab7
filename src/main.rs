//! Line-oriented front end for the sync core.
//!
//! Reads commands from stdin, translates them to library events, pumps the
//! worker until quiescent, and prints the resulting snapshots as JSON lines.
//!
//! ```text
//! stdin line → Command → Event → Session::dispatch → Session::pump → stdout
//! ```
//!
//! # Usage
//!
//! ```text
//! pokedex-sync [config.toml]
//! ```
//!
//! On first run the bundled fixture catalog is copied to the configured
//! catalog path, so favorites persist between runs.
//!
//! # Commands
//!
//! - `search <text>`: set the search (empty clears it)
//! - `type <name>`: filter by type (no argument clears it)
//! - `favorites on|off`: favorite-only filter
//! - `view grid|list`: layout
//! - `scroll`: report the list sentinel as visible
//! - `fav <id>`: toggle a favorite
//! - `detail <name>` / `close`: open or close the detail view
//! - `show`: print the list, detail and type snapshots
//! - `quit`

#![allow(clippy::multiple_crate_versions)]

use pokedex_sync::app::notifications::ToastSlot;
use pokedex_sync::app::scroll::ManualObserver;
use pokedex_sync::catalog::JsonCatalog;
use pokedex_sync::infrastructure::paths;
use pokedex_sync::worker::CatalogWorker;
use pokedex_sync::{Config, Event, ItemId, PokedexError, Result, Session};
use serde::Serialize;
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::rc::Rc;

const FIXTURE: &str = include_str!("../fixtures/catalog.json");

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Dispatch(Event),
    Scroll,
    Show,
    Quit,
}

/// Maps an input line to a command. Blank lines map to `None`.
fn parse_command(line: &str) -> std::result::Result<Option<Command>, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').map_or((line, ""), |(v, r)| (v, r.trim()));

    let command = match verb {
        "" => return Ok(None),
        "search" => Command::Dispatch(Event::SetSearch(rest.to_string())),
        "type" => Command::Dispatch(Event::SetType(Some(rest.to_string()))),
        "favorites" => match rest {
            "on" => Command::Dispatch(Event::SetIsFavorite(true)),
            "off" => Command::Dispatch(Event::SetIsFavorite(false)),
            other => return Err(format!("expected on|off, got {other:?}")),
        },
        "view" => Command::Dispatch(Event::SetView(rest.to_string())),
        "scroll" => Command::Scroll,
        "fav" => {
            let id: ItemId = rest.parse().map_err(|_| format!("invalid id {rest:?}"))?;
            Command::Dispatch(Event::ToggleFavorite { id })
        }
        "detail" if !rest.is_empty() => Command::Dispatch(Event::OpenDetail {
            name: rest.to_string(),
        }),
        "close" => Command::Dispatch(Event::CloseDetail),
        "show" => Command::Show,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command {other:?}")),
    };
    Ok(Some(command))
}

struct Shell {
    session: Session,
    observer: ManualObserver,
    toast: Rc<RefCell<ToastSlot>>,
}

impl Shell {
    fn load(config: &Config) -> Result<Self> {
        let _span = tracing::debug_span!("shell_load").entered();

        let catalog_path = paths::catalog_path(config);
        if config.catalog_path.is_none() {
            install_fixture(&catalog_path)?;
        }
        let catalog = JsonCatalog::open(catalog_path)?;

        let toast = Rc::new(RefCell::new(ToastSlot::new(config.notification_timeout_ms)));
        let mut session = Session::new(
            pokedex_sync::initialize(config),
            CatalogWorker::new(Box::new(catalog)),
            Box::new(Rc::clone(&toast)),
        );

        let observer = ManualObserver::new();
        session.mount(Box::new(observer.clone()))?;
        session.pump()?;

        Ok(Self {
            session,
            observer,
            toast,
        })
    }

    /// Runs one command. Returns `false` when the loop should stop.
    fn update(&mut self, command: Command, out: &mut impl Write) -> Result<bool> {
        let _span = tracing::debug_span!("shell_update", command = ?command).entered();

        match command {
            Command::Quit => return Ok(false),
            Command::Show => {
                self.print_all(out)?;
                return Ok(true);
            }
            Command::Scroll => {
                if !self.observer.reveal() {
                    tracing::debug!("sentinel not observed");
                }
            }
            Command::Dispatch(event) => {
                self.session.dispatch(&event)?;
            }
        }

        self.session.pump()?;
        self.print_list(out)?;
        if let Some(detail) = self.session.detail_snapshot() {
            print_json(out, "detail", &detail)?;
        }
        self.print_toast(out)?;
        Ok(true)
    }

    fn print_list(&self, out: &mut impl Write) -> Result<()> {
        print_json(out, "list", &self.session.list_snapshot())
    }

    fn print_all(&self, out: &mut impl Write) -> Result<()> {
        self.print_list(out)?;
        print_json(out, "types", &self.session.types_snapshot())?;
        if let Some(detail) = self.session.detail_snapshot() {
            print_json(out, "detail", &detail)?;
        }
        Ok(())
    }

    /// Prints and dismisses the current toast.
    fn print_toast(&self, out: &mut impl Write) -> Result<()> {
        let mut toast = self.toast.borrow_mut();
        if let Some(notification) = toast.current() {
            print_json(out, "toast", notification)?;
        }
        toast.clear();
        Ok(())
    }
}

fn install_fixture(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::debug!(path = ?path, "installing bundled catalog");
    std::fs::write(path, FIXTURE)?;
    Ok(())
}

fn print_json<T: Serialize>(out: &mut impl Write, label: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)
        .map_err(|e| PokedexError::Worker(format!("failed to encode {label}: {e}")))?;
    writeln!(out, "{label} {json}")?;
    Ok(())
}

fn main() -> Result<()> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => Config::from_file(Path::new(&path))?,
        None => Config::default(),
    };
    pokedex_sync::observability::init_tracing(&config);

    let mut shell = Shell::load(&config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    shell.print_all(&mut out)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "error {message}")?;
                continue;
            }
        };

        match shell.update(command, &mut out) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => writeln!(out, "error {e}")?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  "), Ok(None));
        assert_eq!(
            parse_command("search char"),
            Ok(Some(Command::Dispatch(Event::SetSearch("char".into()))))
        );
        assert_eq!(parse_command("search"), Ok(Some(Command::Dispatch(Event::SetSearch(String::new())))));
        assert_eq!(parse_command("type"), Ok(Some(Command::Dispatch(Event::SetType(Some(String::new()))))));
        assert_eq!(
            parse_command("fav 25"),
            Ok(Some(Command::Dispatch(Event::ToggleFavorite { id: 25 })))
        );
        assert_eq!(parse_command("scroll"), Ok(Some(Command::Scroll)));
        assert!(parse_command("fav pikachu").is_err());
        assert!(parse_command("favorites maybe").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn fixture_is_a_valid_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dex").join("catalog.json");
        install_fixture(&path).unwrap();
        assert!(JsonCatalog::open(path).is_ok());
    }

    #[test]
    fn shell_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let mut shell = Shell::load(&config).unwrap();
        assert_eq!(shell.session.list_snapshot().items.len(), 9);

        let mut out = Vec::new();
        assert!(shell.update(Command::Scroll, &mut out).unwrap());
        assert_eq!(shell.session.list_snapshot().items.len(), 18);

        assert!(shell
            .update(Command::Dispatch(Event::ToggleFavorite { id: 1 }), &mut out)
            .unwrap());
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("toast "));
        assert!(printed.contains("Bulbasaur favorite added"));

        assert!(!shell.update(Command::Quit, &mut Vec::new()).unwrap());
    }
}
