//! Purpose: Hold top-level CLI command dispatch for `bookshelf`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each command opens the catalog once and runs one catalog operation.
//! Invariants: Failures surface as `Error`; exit codes are mapped by the caller.

use std::path::Path;

use bookshelf::api::{Book, Library, validate_catalog};

use super::*;
use crate::book_view::{book_detail, book_json, books_json, books_table, report_json};

pub(super) fn dispatch_command(
    command: Command,
    catalog_path: PathBuf,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Add {
            title,
            author,
            year,
            json,
        } => {
            let mut library = Library::open(&catalog_path)?;
            let book = library.add(title, author, year)?;
            if json {
                emit_json(book_json(book), color_mode);
            } else {
                println!("Added book {}.", book.id);
            }
            Ok(RunOutcome::ok())
        }
        Command::Delete { id } => {
            let mut library = Library::open(&catalog_path)?;
            let removed = library.delete(id)?;
            println!("Deleted book {}: {}", removed.id, removed.title);
            Ok(RunOutcome::ok())
        }
        Command::Show { id, json } => {
            let library = Library::open(&catalog_path)?;
            let book = library.find_by_id(id).ok_or_else(|| {
                Error::not_found(id).with_hint("Run `bookshelf list` to see every id.")
            })?;
            if json {
                emit_json(book_json(book), color_mode);
            } else {
                println!("{}", book_detail(book));
            }
            Ok(RunOutcome::ok())
        }
        Command::Search { term, json } => {
            let library = Library::open(&catalog_path)?;
            let found = library.search(&term);
            emit_books(&found, json, "No books found.", color_mode);
            Ok(RunOutcome::ok())
        }
        Command::List { json } => {
            let library = Library::open(&catalog_path)?;
            let books = library.list_all().iter().collect::<Vec<_>>();
            emit_books(&books, json, "Library is empty.", color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Status { id, status } => {
            let mut library = Library::open(&catalog_path)?;
            let book = library.change_status(id, &status)?;
            println!("Book {} status: {}", book.id, book.status);
            Ok(RunOutcome::ok())
        }
        Command::Menu => {
            let mut library = Library::open(&catalog_path)?;
            let stdin = io::stdin();
            menu::run_menu(&mut library, stdin.lock(), io::stdout().lock())?;
            Ok(RunOutcome::ok())
        }
        Command::Doctor { json } => doctor(&catalog_path, json, color_mode),
        Command::Version => {
            emit_json(
                json!({ "bookshelf": { "version": env!("CARGO_PKG_VERSION") } }),
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "bookshelf", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
    }
}

fn emit_books(books: &[&Book], json: bool, empty_message: &str, color_mode: ColorMode) {
    if json {
        emit_json(books_json(books), color_mode);
    } else if books.is_empty() {
        println!("{empty_message}");
    } else {
        println!("{}", books_table(books));
    }
}

fn doctor(path: &Path, json: bool, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    let report = validate_catalog(path)?;
    if json {
        emit_json(json!({ "report": report_json(&report) }), color_mode);
    } else if report.is_ok() {
        println!("OK: {} ({} books)", path.display(), report.record_count);
    } else {
        println!("CORRUPT: {} ({} issues)", path.display(), report.issues.len());
        for issue in &report.issues {
            let location = issue
                .index
                .map(|index| format!(" entry {index}"))
                .unwrap_or_default();
            println!("  [{}]{location} {}", issue.code, issue.message);
        }
        for hint in &report.remediation_hints {
            println!("  hint: {hint}");
        }
    }

    let exit_code = if report.is_ok() {
        0
    } else {
        to_exit_code(ErrorKind::Format)
    };
    Ok(RunOutcome::with_code(exit_code))
}
