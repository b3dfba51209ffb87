//! Drive the hunt sync controller from line commands against in-memory adapters.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use hunts::config::{HuntsSettings, LogFormat};
use hunts::domain::{
    DeleteConfirmation, DetailUpdate, HuntAlert, HuntId, HuntIntent, HuntSyncController,
    SessionManager, UserId,
};
use hunts::outbound::memory::{InMemoryAuthProvider, InMemoryHuntCollection};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const DETAIL_TIMEOUT: Duration = Duration::from_secs(2);

/// `hunt-console` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hunt-console",
    about = "Create, rename, and delete scavenger hunts against an in-memory backend",
    version
)]
struct CliArgs {
    /// Account to register, as `email:password:uid`. May be repeated.
    #[arg(long = "account", value_name = "email:password:uid", value_parser = parse_account)]
    accounts: Vec<Account>,
    /// File of commands to run. Reads standard input when omitted.
    #[arg(long = "script", value_name = "path")]
    script: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Account {
    email: String,
    password: String,
    uid: UserId,
}

/// One console line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    SignIn { email: String, password: String },
    SignOut,
    Create { name: String },
    Rename { id: HuntId, name: String },
    Delete { id: HuntId },
    Confirm,
    Cancel,
    List,
    Open { id: HuntId },
    Quit,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = HuntsSettings::load_from_iter([OsString::from("hunt-console")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let log_format = settings.log_format().map_err(io::Error::other)?;
    init_tracing(log_format);
    if settings.hosted_backend_configured() {
        warn!("hosted backend settings found; this console only uses the in-memory backend");
    }
    info!(collection = settings.collection(), "starting hunt console");

    let provider = InMemoryAuthProvider::new();
    for account in args.accounts {
        provider.add_account(&account.email, &account.password, account.uid);
    }
    let clock = Arc::new(DefaultClock);
    let mut console = Console {
        sessions: SessionManager::new(Arc::new(provider)),
        controller: HuntSyncController::new(
            Arc::new(InMemoryHuntCollection::new(clock.clone())),
            clock,
        ),
        pending_delete: None,
    };

    match args.script {
        Some(path) => {
            let script = read_script(&path)?;
            for line in script.lines() {
                if !console.run_line(line).await {
                    break;
                }
            }
        }
        None => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                if !console.run_line(&line).await {
                    break;
                }
            }
        }
    }

    console.controller.dispose();
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

struct Console {
    sessions: SessionManager<InMemoryAuthProvider>,
    controller: HuntSyncController<InMemoryHuntCollection>,
    pending_delete: Option<DeleteConfirmation<InMemoryHuntCollection>>,
}

impl Console {
    /// Run one line. Returns `false` once the console should stop.
    async fn run_line(&mut self, line: &str) -> bool {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return true,
            Err(message) => {
                println!("error: {message}");
                return true;
            }
        };
        if command == Command::Quit {
            return false;
        }
        self.run(command).await;
        settle().await;
        true
    }

    async fn run(&mut self, command: Command) {
        match command {
            Command::SignIn { email, password } => {
                match self.sessions.sign_in(&email, &password).await {
                    Ok(uid) => println!("signed in uid={uid}"),
                    Err(failure) => println!("sign-in failed: {failure}"),
                }
                self.apply_session();
            }
            Command::SignOut => {
                if let Err(error) = self.sessions.sign_out().await {
                    println!("sign-out: {}", error.message());
                }
                self.apply_session();
                println!("signed out");
            }
            Command::Create { name } => match self.controller.create(&name).await {
                Ok(id) => println!("created id={id}"),
                Err(error) => print_alert(&HuntAlert::for_error(HuntIntent::Create, &error)),
            },
            Command::Rename { id, name } => match self.controller.rename(&id, &name).await {
                Ok(()) => print_alert(&HuntAlert::renamed()),
                Err(error) => print_alert(&HuntAlert::for_error(HuntIntent::Rename, &error)),
            },
            Command::Delete { id } => match self.controller.request_delete(&id) {
                Ok(confirmation) => {
                    print_alert(&confirmation.prompt());
                    if let Some(previous) = self.pending_delete.replace(confirmation) {
                        previous.cancel();
                    }
                }
                Err(error) => print_alert(&HuntAlert::for_error(HuntIntent::Delete, &error)),
            },
            Command::Confirm => match self.pending_delete.take() {
                Some(confirmation) => {
                    let id = confirmation.id().clone();
                    match confirmation.confirm().await {
                        Ok(_) => println!("deleted id={id}"),
                        Err(error) => {
                            print_alert(&HuntAlert::for_error(HuntIntent::Delete, &error));
                        }
                    }
                }
                None => println!("error: nothing to confirm"),
            },
            Command::Cancel => match self.pending_delete.take() {
                Some(confirmation) => confirmation.cancel(),
                None => println!("error: nothing to cancel"),
            },
            Command::List => self.list(),
            Command::Open { id } => self.open(&id).await,
            Command::Quit => {}
        }
    }

    /// Push the current session to the controller. A pending delete belongs
    /// to the previous session and is dropped.
    fn apply_session(&mut self) {
        if let Some(pending) = self.pending_delete.take() {
            pending.cancel();
        }
        if let Err(error) = self.controller.set_session(&self.sessions.current()) {
            print_alert(&HuntAlert {
                title: "Error".to_owned(),
                message: error.message().to_owned(),
            });
        }
    }

    fn list(&self) {
        let hunts = self.controller.hunts().current();
        if hunts.is_loading() {
            println!("loading");
            return;
        }
        if hunts.is_empty() {
            println!("no hunts");
            return;
        }
        for hunt in hunts.items() {
            println!(
                "{}\t{}\t{}",
                hunt.id(),
                hunt.created_at().to_rfc3339(),
                hunt.name()
            );
        }
    }

    async fn open(&self, id: &HuntId) {
        let mut detail = match self.controller.open_detail(id) {
            Ok(detail) => detail,
            Err(error) => {
                println!("error: {}", error.message());
                return;
            }
        };
        match tokio::time::timeout(DETAIL_TIMEOUT, detail.next()).await {
            Ok(Some(DetailUpdate::Loaded(hunt))) => {
                println!("hunt id={} name={}", hunt.id(), hunt.name());
            }
            Ok(Some(DetailUpdate::Removed) | None) => println!("hunt id={id} not found"),
            Err(_) => println!("hunt id={id} still loading"),
        }
        detail.close();
    }
}

/// Give the snapshot listener a chance to apply what the collection
/// published during the last command.
async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

fn print_alert(alert: &HuntAlert) {
    println!("{}: {}", alert.title, alert.message);
}

/// Parse a console line. Blank lines and `#` comments yield `None`.
fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim_start();
    if line.trim().is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(' ').unwrap_or((line.trim_end(), ""));
    let command = match verb {
        "signin" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(email), Some(password), None) => Command::SignIn {
                    email: email.to_owned(),
                    password: password.to_owned(),
                },
                _ => return Err("usage: signin <email> <password>".to_owned()),
            }
        }
        "signout" => Command::SignOut,
        "create" => Command::Create {
            name: rest.to_owned(),
        },
        "rename" => {
            let (id, name) = rest.split_once(' ').unwrap_or((rest, ""));
            Command::Rename {
                id: parse_id(id)?,
                name: name.to_owned(),
            }
        }
        "delete" => Command::Delete {
            id: parse_id(rest)?,
        },
        "confirm" => Command::Confirm,
        "cancel" => Command::Cancel,
        "list" => Command::List,
        "open" => Command::Open {
            id: parse_id(rest)?,
        },
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command `{other}`")),
    };
    Ok(Some(command))
}

fn parse_id(raw: &str) -> Result<HuntId, String> {
    HuntId::new(raw.trim()).map_err(|error| format!("invalid hunt id: {error}"))
}

/// Passwords may contain `:`; the email and uid may not.
fn parse_account(raw: &str) -> Result<Account, String> {
    let Some((email, rest)) = raw.split_once(':') else {
        return Err("account must be `email:password:uid`".to_owned());
    };
    let Some((password, uid)) = rest.rsplit_once(':') else {
        return Err("account must be `email:password:uid`".to_owned());
    };
    if email.trim().is_empty() || password.is_empty() {
        return Err("account email and password must not be empty".to_owned());
    }
    let uid = UserId::new(uid).map_err(|error| format!("invalid uid: {error}"))?;
    Ok(Account {
        email: email.trim().to_owned(),
        password: password.to_owned(),
        uid,
    })
}

fn read_script(path: &Path) -> io::Result<String> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "script path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open script directory '{}': {error}",
            parent.display()
        ))
    })?;
    let mut file = directory.open(Path::new(file_name)).map_err(|error| {
        io::Error::other(format!("open script '{}': {error}", path.display()))
    })?;
    let mut script = String::new();
    file.read_to_string(&mut script)
        .map_err(|error| io::Error::other(format!("read script '{}': {error}", path.display())))?;
    Ok(script)
}

#[cfg(test)]
mod tests {
    //! Unit tests for command and argument parsing.

    use super::*;
    use rstest::rstest;

    fn id(raw: &str) -> HuntId {
        HuntId::new(raw).expect("valid id")
    }

    #[rstest]
    #[case("", None)]
    #[case("   ", None)]
    #[case("# a comment", None)]
    #[case("list", Some(Command::List))]
    #[case("signout", Some(Command::SignOut))]
    #[case("confirm", Some(Command::Confirm))]
    #[case("exit", Some(Command::Quit))]
    #[case("delete abc123", Some(Command::Delete { id: id("abc123") }))]
    #[case("open abc123 ", Some(Command::Open { id: id("abc123") }))]
    fn parses_simple_commands(#[case] line: &str, #[case] expected: Option<Command>) {
        assert_eq!(parse_command(line), Ok(expected));
    }

    #[rstest]
    fn create_keeps_the_raw_name() {
        let parsed = parse_command("create   Beach Hunt  ").expect("parses");
        assert_eq!(
            parsed,
            Some(Command::Create {
                name: "  Beach Hunt  ".to_owned()
            })
        );
    }

    #[rstest]
    fn create_without_a_name_is_left_to_validation() {
        let parsed = parse_command("create").expect("parses");
        assert_eq!(
            parsed,
            Some(Command::Create {
                name: String::new()
            })
        );
    }

    #[rstest]
    fn rename_splits_id_from_name() {
        let parsed = parse_command("rename abc123 Beach Hunt 2").expect("parses");
        assert_eq!(
            parsed,
            Some(Command::Rename {
                id: id("abc123"),
                name: "Beach Hunt 2".to_owned()
            })
        );
    }

    #[rstest]
    fn signin_takes_email_and_password() {
        let parsed = parse_command("signin ana@example.com secret").expect("parses");
        assert_eq!(
            parsed,
            Some(Command::SignIn {
                email: "ana@example.com".to_owned(),
                password: "secret".to_owned()
            })
        );
    }

    #[rstest]
    #[case("signin ana@example.com")]
    #[case("delete")]
    #[case("open a/b")]
    #[case("launch")]
    fn rejects_malformed_lines(#[case] line: &str) {
        assert!(parse_command(line).is_err());
    }

    #[rstest]
    fn parses_accounts() {
        let account = parse_account("ana@example.com:pa:ss:u1").expect("valid account");
        assert_eq!(account.email, "ana@example.com");
        assert_eq!(account.password, "pa:ss");
        assert_eq!(account.uid.as_ref(), "u1");
    }

    #[rstest]
    #[case("ana@example.com")]
    #[case("ana@example.com:secret")]
    #[case(":secret:u1")]
    #[case("ana@example.com::u1")]
    #[case("ana@example.com:secret:")]
    fn rejects_malformed_accounts(#[case] raw: &str) {
        assert!(parse_account(raw).is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn session_change_drops_the_pending_delete() {
        let u1 = UserId::new("u1").expect("valid uid");
        let provider = InMemoryAuthProvider::new();
        provider.add_account("ana@example.com", "secret", u1.clone());
        provider.add_account("bo@example.com", "secret", UserId::new("u2").expect("valid uid"));
        let clock = Arc::new(DefaultClock);
        let collection = Arc::new(InMemoryHuntCollection::new(clock.clone()));
        let hunt = collection.seed(&u1, "Beach Hunt");
        let mut console = Console {
            sessions: SessionManager::new(Arc::new(provider)),
            controller: HuntSyncController::new(Arc::clone(&collection), clock),
            pending_delete: None,
        };

        console.run_line("signin ana@example.com secret").await;
        tokio::time::timeout(
            DETAIL_TIMEOUT,
            console.controller.hunts().wait_for(|list| list.contains(&hunt)),
        )
        .await
        .expect("snapshot in time")
        .expect("store alive");
        console.run_line(&format!("delete {hunt}")).await;
        assert!(console.pending_delete.is_some());

        console.run_line("signin bo@example.com secret").await;
        assert!(console.pending_delete.is_none());
        console.run_line("confirm").await;
        assert_eq!(collection.document_count(), 1);
    }
}
