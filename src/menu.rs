//! Purpose: Interactive six-action menu over a `Library`.
//! Exports: `run_menu`.
//! Role: Line-oriented presentation loop; one catalog operation per action.
//! Invariants: Catalog and input errors are printed and the loop continues.
//! Invariants: EOF on input ends the loop like the exit action.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use bookshelf::api::{Error, ErrorKind, Library};

use crate::book_view::book_details;
use crate::error_message;

const MENU: &str = "\nMenu:
1. Add book
2. Delete book
3. Search books
4. List all books
5. Change book status
6. Exit";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Flow {
    Continue,
    Exit,
}

pub(crate) fn run_menu<R: BufRead, W: Write>(
    library: &mut Library,
    mut input: R,
    mut output: W,
) -> Result<(), Error> {
    writeln!(output, "Catalog: {}", library.path().display()).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("terminal i/o failed")
            .with_source(err)
    })?;
    loop {
        let flow = step(library, &mut input, &mut output).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("terminal i/o failed")
                .with_source(err)
        })?;
        if flow == Flow::Exit {
            return Ok(());
        }
    }
}

fn step<R: BufRead, W: Write>(
    library: &mut Library,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    writeln!(output, "{MENU}")?;
    let Some(choice) = prompt(input, output, "Choose an action (1-6): ")? else {
        return Ok(Flow::Exit);
    };
    match choice.trim() {
        "1" => add_book(library, input, output),
        "2" => delete_book(library, input, output),
        "3" => search_books(library, input, output),
        "4" => {
            list_books(library, output)?;
            Ok(Flow::Continue)
        }
        "5" => change_status(library, input, output),
        "6" => {
            writeln!(output, "Goodbye.")?;
            Ok(Flow::Exit)
        }
        _ => {
            writeln!(output, "Unknown choice. Try again.")?;
            Ok(Flow::Continue)
        }
    }
}

fn add_book<R: BufRead, W: Write>(
    library: &mut Library,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    let Some(title) = prompt(input, output, "Title: ")? else {
        return Ok(Flow::Exit);
    };
    let Some(author) = prompt(input, output, "Author: ")? else {
        return Ok(Flow::Exit);
    };
    let Some(year) = prompt(input, output, "Year: ")? else {
        return Ok(Flow::Exit);
    };
    let result = parse_number::<i32>("year", &year).and_then(|year| {
        library
            .add(title, author, year)
            .map(|book| format!("Book added (id {}).", book.id))
    });
    finish(output, result)
}

fn delete_book<R: BufRead, W: Write>(
    library: &mut Library,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    let Some(id) = prompt(input, output, "Id of the book to delete: ")? else {
        return Ok(Flow::Exit);
    };
    let result = parse_number::<u64>("id", &id).and_then(|id| {
        library
            .delete(id)
            .map(|book| format!("Book {} deleted.", book.id))
    });
    finish(output, result)
}

fn search_books<R: BufRead, W: Write>(
    library: &mut Library,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    let Some(term) = prompt(input, output, "Search text: ")? else {
        return Ok(Flow::Exit);
    };
    let found = library.search(&term);
    if found.is_empty() {
        writeln!(output, "No books found.")?;
    } else {
        writeln!(output, "Found books:")?;
        writeln!(output, "{}", book_details(&found))?;
    }
    Ok(Flow::Continue)
}

fn list_books<W: Write>(library: &Library, output: &mut W) -> io::Result<()> {
    let books = library.list_all().iter().collect::<Vec<_>>();
    if books.is_empty() {
        writeln!(output, "Library is empty.")
    } else {
        writeln!(output, "{}", book_details(&books))
    }
}

fn change_status<R: BufRead, W: Write>(
    library: &mut Library,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    let Some(id) = prompt(input, output, "Id of the book: ")? else {
        return Ok(Flow::Exit);
    };
    let Some(status) = prompt(input, output, "New status (в наличии/выдана): ")? else {
        return Ok(Flow::Exit);
    };
    let result = parse_number::<u64>("id", &id).and_then(|id| {
        library
            .change_status(id, &status)
            .map(|book| format!("Book {} status changed to '{}'.", book.id, book.status))
    });
    finish(output, result)
}

fn finish<W: Write>(output: &mut W, result: Result<String, Error>) -> io::Result<Flow> {
    match result {
        Ok(message) => writeln!(output, "{message}")?,
        Err(err) => writeln!(output, "Error: {}", error_message(&err))?,
    }
    Ok(Flow::Continue)
}

/// Returns the line without its terminator, or `None` at EOF.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> io::Result<Option<String>> {
    write!(output, "{label}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}

fn parse_number<T: FromStr>(field: &str, raw: &str) -> Result<T, Error> {
    raw.trim().parse::<T>().map_err(|_| {
        Error::new(ErrorKind::Usage).with_message(format!("{field} must be an integer, got {raw:?}"))
    })
}
