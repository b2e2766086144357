//! Purpose: `bookshelf` CLI entry point.
//! Role: Binary crate root; parses args, installs logging, runs commands, renders errors.
//! Invariants: Command output goes to stdout; logs and errors go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All catalog reads and writes go through `api::Library`.
use std::error::Error as StdError;
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod book_view;
mod catalog_paths;
mod command_dispatch;
mod menu;

use bookshelf::api::{Error, ErrorKind, to_exit_code};
use catalog_paths::resolve_catalog_path;

const LOG_ENV: &str = "BOOKSHELF_LOG";

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run(std::env::args_os()) {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run<I>(args: I) -> Result<RunOutcome, (Error, ColorMode)>
where
    I: IntoIterator<Item = OsString>,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `bookshelf --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing();

    let color_mode = cli.color;
    let catalog_path = resolve_catalog_path(cli.file);
    let command = cli.command.unwrap_or(Command::Menu);

    command_dispatch::dispatch_command(command, catalog_path, color_mode)
        .map_err(add_format_hint)
        .map_err(|err| (err, color_mode))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "bookshelf",
    version,
    about = "Personal library catalog kept in one JSON file",
    long_about = None,
    after_help = r#"EXAMPLES
  $ bookshelf add "Мастер и Маргарита" "Булгаков" 1967
  $ bookshelf list
  $ bookshelf search булгаков
  $ bookshelf status 1 выдана
  $ bookshelf                      # interactive menu

NOTES
  - Catalog file: --file, else $BOOKSHELF_FILE, else ./library.json
  - Logging: BOOKSHELF_LOG=debug"#
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Catalog file (default: $BOOKSHELF_FILE or ./library.json)",
        value_hint = ValueHint::FilePath
    )]
    file: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics (always also pretty-prints JSON): auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Add a book",
        after_help = r#"EXAMPLES
  $ bookshelf add "Война и мир" "Толстой" 1869
  $ bookshelf add --json "Dune" "Frank Herbert" 1965"#
    )]
    Add {
        #[arg(help = "Book title")]
        title: String,
        #[arg(help = "Book author")]
        author: String,
        #[arg(help = "Publication year", allow_negative_numbers = true)]
        year: i32,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(visible_alias = "rm", about = "Delete a book by id")]
    Delete {
        #[arg(help = "Book id")]
        id: u64,
    },
    #[command(about = "Show one book by id")]
    Show {
        #[arg(help = "Book id")]
        id: u64,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(
        about = "Search by title, author, or year",
        long_about = r#"Search books.

Title and author match case-insensitively; the year matches as literal text."#
    )]
    Search {
        #[arg(help = "Text to look for")]
        term: String,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(visible_alias = "ls", about = "List all books in insertion order")]
    List {
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(
        visible_alias = "set-status",
        about = "Change a book's status",
        after_help = r#"EXAMPLES
  $ bookshelf status 3 выдана
  $ bookshelf status 3 "в наличии"
  $ bookshelf status 3 available

NOTES
  - Statuses: 'в наличии' (alias: available), 'выдана' (alias: checked_out)"#
    )]
    Status {
        #[arg(help = "Book id")]
        id: u64,
        #[arg(help = "New status")]
        status: String,
    },
    #[command(about = "Run the interactive menu (default)")]
    Menu,
    #[command(
        about = "Check the catalog file for malformed entries",
        after_help = r#"NOTES
  - Exits with the format error code (5) when issues are found."#
    )]
    Doctor {
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(about = "Print version info as JSON")]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ bookshelf completion bash > ~/.local/share/bash-completion/completions/bookshelf
  $ bookshelf completion zsh > ~/.zfunc/_bookshelf"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn add_format_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Format || err.hint().is_some() {
        return err;
    }
    err.with_hint("The catalog file is malformed. Run `bookshelf doctor` for details.")
}

fn emit_json(value: Value, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let pretty = is_tty || color_mode.use_color(is_tty);
    let encoded = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    let json = encoded.unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::InvalidStatus => "invalid status".to_string(),
        ErrorKind::Format => "malformed catalog".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(id) = err.id() {
        inner.insert("id".to_string(), json!(id));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = vec![format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    )];
    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, Error, ErrorKind, add_format_hint, error_json, error_text};
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["bookshelf", "--file", "/tmp/x.json"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.file.as_deref(), Some(Path::new("/tmp/x.json")));
    }

    #[test]
    fn color_help_describes_stderr_and_pretty_json() {
        use clap::CommandFactory;
        let command = Cli::command();
        let color = command
            .get_arguments()
            .find(|arg| arg.get_id() == "color")
            .expect("color arg");
        let help = color.get_help().map(ToString::to_string).unwrap_or_default();
        assert!(help.contains("stderr diagnostics"));
        assert!(help.contains("pretty-prints JSON"));
        assert!(!help.contains("Colorize JSON"));
    }

    #[test]
    fn add_accepts_negative_years_and_rejects_text() {
        let cli = Cli::try_parse_from(["bookshelf", "add", "Анабасис", "Ксенофонт", "-370"])
            .expect("parse");
        match cli.command {
            Some(Command::Add { year, .. }) => assert_eq!(year, -370),
            _ => panic!("expected add"),
        }

        assert!(Cli::try_parse_from(["bookshelf", "add", "a", "b", "soon"]).is_err());
    }

    #[test]
    fn error_json_carries_kind_id_and_hint() {
        let err = Error::not_found(999).with_hint("Run `bookshelf list`.");
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "NotFound");
        assert_eq!(value["error"]["message"], "book with id 999 not found");
        assert_eq!(value["error"]["id"], 999);
        assert_eq!(value["error"]["hint"], "Run `bookshelf list`.");
    }

    #[test]
    fn error_text_without_color_is_plain() {
        let err = Error::new(ErrorKind::Format).with_path("/tmp/library.json");
        let err = add_format_hint(err);
        let text = error_text(&err, false);
        assert!(text.starts_with("error: malformed catalog"));
        assert!(text.contains("hint: The catalog file is malformed."));
        assert!(text.contains("path: /tmp/library.json"));
        assert!(!text.contains('\u{1b}'));
    }
}
