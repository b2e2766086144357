// Catalog error type, kind taxonomy, and the stable exit-code mapping.
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use libc::{EACCES, EPERM};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    NotFound,
    InvalidStatus,
    Format,
    Permission,
    Io,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    path: Option<PathBuf>,
    id: Option<u64>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            path: None,
            id: None,
            source: None,
        }
    }

    /// `NotFound` for a book id that is not in the catalog.
    pub fn not_found(id: u64) -> Self {
        Self::new(ErrorKind::NotFound)
            .with_message(format!("book with id {id} not found"))
            .with_id(id)
    }

    /// `InvalidStatus` carrying the rejected value.
    pub fn invalid_status(value: &str) -> Self {
        Self::new(ErrorKind::InvalidStatus)
            .with_message(format!("invalid status {value:?}"))
            .with_hint("Valid statuses: 'в наличии' (available), 'выдана' (checked_out).")
    }

    /// Classify an I/O failure on `path` by kind and errno.
    pub fn io(path: &Path, err: io::Error) -> Self {
        Self::new(io_error_kind(&err))
            .with_path(path)
            .with_source(err)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub(crate) fn io_error_kind(err: &io::Error) -> ErrorKind {
    let errno = err.raw_os_error().unwrap_or_default();
    if errno == EACCES || errno == EPERM {
        return ErrorKind::Permission;
    }
    match err.kind() {
        io::ErrorKind::PermissionDenied => ErrorKind::Permission,
        _ => ErrorKind::Io,
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::InvalidStatus => 4,
        ErrorKind::Format => 5,
        ErrorKind::Permission => 6,
        ErrorKind::Io => 7,
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, io_error_kind, to_exit_code};

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
            (ErrorKind::NotFound, 3),
            (ErrorKind::InvalidStatus, 4),
            (ErrorKind::Format, 5),
            (ErrorKind::Permission, 6),
            (ErrorKind::Io, 7),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn io_errors_map_to_expected_kinds() {
        let err = std::io::Error::from_raw_os_error(libc::EACCES);
        assert_eq!(io_error_kind(&err), ErrorKind::Permission);

        let err = std::io::Error::from_raw_os_error(libc::EPERM);
        assert_eq!(io_error_kind(&err), ErrorKind::Permission);

        let err = std::io::Error::from_raw_os_error(libc::ENOSPC);
        assert_eq!(io_error_kind(&err), ErrorKind::Io);
    }

    #[test]
    fn not_found_display_names_the_id() {
        let err = Error::not_found(999);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.id(), Some(999));
        assert_eq!(err.to_string(), "NotFound: book with id 999 not found");
    }
}
