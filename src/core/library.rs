// Catalog store: in-memory book list persisted as one JSON array per file.
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info, warn};

use crate::core::error::{Error, ErrorKind};
use crate::core::record::{Book, Status};

const TEMP_SUFFIX: &str = "tmp";
const INDENT: &[u8] = b"    ";

pub struct Library {
    path: PathBuf,
    books: Vec<Book>,
}

impl Library {
    /// Opens the catalog at `path`. A missing file is an empty catalog.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let mut library = Self {
            path: path.as_ref().to_path_buf(),
            books: Vec::new(),
        };
        library.load()?;
        Ok(library)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Replaces the in-memory list with the file contents. Unsaved state is
    /// discarded.
    pub fn load(&mut self) -> Result<(), Error> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "catalog file missing; starting empty");
                self.books.clear();
                return Ok(());
            }
            Err(err) => return Err(Error::io(&self.path, err)),
        };
        self.books = decode_catalog(&text).map_err(|err| err.with_path(&self.path))?;
        debug!(path = %self.path.display(), count = self.books.len(), "catalog loaded");
        Ok(())
    }

    /// Rewrites the whole file through a sibling temp file and a rename.
    pub fn save(&self) -> Result<(), Error> {
        let bytes = encode_catalog(&self.books)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
        }

        let temp_path = temp_path_for(&self.path);
        if let Err(err) = write_synced(&temp_path, &bytes) {
            remove_temp(&temp_path);
            return Err(err);
        }
        if let Err(err) = fs::rename(&temp_path, &self.path) {
            remove_temp(&temp_path);
            return Err(Error::io(&self.path, err));
        }
        sync_parent_dir(&self.path)?;
        debug!(path = %self.path.display(), count = self.books.len(), "catalog saved");
        Ok(())
    }

    pub fn add(
        &mut self,
        title: impl Into<String>,
        author: impl Into<String>,
        year: i32,
    ) -> Result<&Book, Error> {
        let id = self.next_id()?;
        self.books.push(Book::new(id, title, author, year));
        self.save()?;
        info!(id = id, "book added");
        Ok(&self.books[self.books.len() - 1])
    }

    /// Removes the book with `id`. Nothing is written when it is absent.
    pub fn delete(&mut self, id: u64) -> Result<Book, Error> {
        let index = self.position(id).ok_or_else(|| Error::not_found(id))?;
        let removed = self.books.remove(index);
        self.save()?;
        info!(id = id, "book deleted");
        Ok(removed)
    }

    pub fn find_by_id(&self, id: u64) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn search(&self, term: &str) -> Vec<&Book> {
        self.books.iter().filter(|book| book.matches(term)).collect()
    }

    /// Parses `new_status` before looking up `id`.
    pub fn change_status(&mut self, id: u64, new_status: &str) -> Result<&Book, Error> {
        let status = new_status.parse::<Status>()?;
        self.set_status(id, status)
    }

    pub fn set_status(&mut self, id: u64, status: Status) -> Result<&Book, Error> {
        let index = self.position(id).ok_or_else(|| Error::not_found(id))?;
        self.books[index].status = status;
        self.save()?;
        info!(id = id, status = %status, "book status changed");
        Ok(&self.books[index])
    }

    pub fn list_all(&self) -> &[Book] {
        &self.books
    }

    // max + 1: the highest id becomes reusable once its book is deleted.
    fn next_id(&self) -> Result<u64, Error> {
        let max = self.books.iter().map(|book| book.id).max().unwrap_or(0);
        max.checked_add(1).ok_or_else(|| {
            Error::new(ErrorKind::Format)
                .with_message(format!("no id left after {max}"))
                .with_id(max)
                .with_path(&self.path)
                .with_hint("Renumber or remove the book with the highest id.")
        })
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }
}

pub(crate) fn decode_catalog(text: &str) -> Result<Vec<Book>, Error> {
    let value: Value = serde_json::from_str(text).map_err(|err| {
        Error::new(ErrorKind::Format)
            .with_message(format!("catalog is not valid JSON: {err}"))
            .with_source(err)
    })?;
    let Value::Array(items) = value else {
        return Err(Error::new(ErrorKind::Format).with_message("catalog must be a JSON array"));
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut books = Vec::with_capacity(items.len());
    for item in &items {
        let book = Book::from_json(item)?;
        if !seen.insert(book.id) {
            return Err(Error::new(ErrorKind::Format)
                .with_message(format!("duplicate book id {}", book.id))
                .with_id(book.id)
                .with_hint("Run `bookshelf doctor` to list every issue in the file."));
        }
        books.push(book);
    }
    Ok(books)
}

// Serializes the records directly so keys keep the file order: id, title, author, year, status.
fn encode_catalog(books: &[Book]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    books.serialize(&mut serializer).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode catalog")
            .with_source(err)
    })?;
    Ok(out)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    let mut file: File = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .map_err(|err| Error::io(path, err))?;
    file.write_all(bytes).map_err(|err| Error::io(path, err))?;
    file.sync_all().map_err(|err| Error::io(path, err))?;
    Ok(())
}

// The rename is only durable once the directory entry is flushed.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<(), Error> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    let dir = File::open(parent).map_err(|err| Error::io(parent, err))?;
    dir.sync_all().map_err(|err| Error::io(parent, err))
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<(), Error> {
    Ok(())
}

fn remove_temp(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %err, "failed to remove temporary catalog file");
        }
    }
}
