// Book record and its JSON object mapping.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::{Error, ErrorKind};

pub const STATUS_AVAILABLE: &str = "в наличии";
pub const STATUS_CHECKED_OUT: &str = "выдана";

/// Availability of a book. Serialized with the catalog file's spelling.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "в наличии")]
    Available,
    #[serde(rename = "выдана")]
    CheckedOut,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Available => STATUS_AVAILABLE,
            Status::CheckedOut => STATUS_CHECKED_OUT,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            STATUS_AVAILABLE | "available" => Ok(Status::Available),
            STATUS_CHECKED_OUT | "checked_out" => Ok(Status::CheckedOut),
            _ => Err(Error::invalid_status(value)),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub status: Status,
}

impl Book {
    pub fn new(id: u64, title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            year,
            status: Status::Available,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "title": self.title,
            "author": self.author,
            "year": self.year,
            "status": self.status.as_str(),
        })
    }

    /// Every key must be present with the right type; extra keys are ignored.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        Book::deserialize(value).map_err(|err| {
            Error::new(ErrorKind::Format)
                .with_message(format!("malformed book record: {err}"))
                .with_source(err)
        })
    }

    /// Case-insensitive on title and author, literal on the decimal year.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.author.to_lowercase().contains(&needle)
            || self.year.to_string().contains(term)
    }
}

#[cfg(test)]
mod tests {
    use super::{Book, Status};
    use crate::core::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn to_json_uses_catalog_keys_and_spelling() {
        let book = Book::new(7, "Мастер и Маргарита", "Булгаков", 1967);
        let value = book.to_json();
        let obj = value.as_object().expect("object");
        assert_eq!(obj.len(), 5);
        assert_eq!(obj["id"], 7);
        assert_eq!(obj["title"], "Мастер и Маргарита");
        assert_eq!(obj["author"], "Булгаков");
        assert_eq!(obj["year"], 1967);
        assert_eq!(obj["status"], "в наличии");
    }

    #[test]
    fn to_json_keeps_catalog_key_order() {
        let value = Book::new(1, "T", "A", 2000).to_json();
        let keys = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["id", "title", "author", "year", "status"]);
    }

    #[test]
    fn from_json_reverses_to_json() {
        let mut book = Book::new(3, "Dune", "Frank Herbert", 1965);
        book.status = Status::CheckedOut;
        let decoded = Book::from_json(&book.to_json()).expect("decode");
        assert_eq!(decoded, book);
    }

    #[test]
    fn from_json_rejects_missing_field() {
        let value = json!({"id": 1, "title": "t", "author": "a", "year": 2000});
        let err = Book::from_json(&value).expect_err("missing status");
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.message().unwrap_or_default().contains("status"));
    }

    #[test]
    fn from_json_rejects_wrong_types_and_unknown_status() {
        let wrong_year = json!({"id": 1, "title": "t", "author": "a", "year": "2000", "status": "выдана"});
        assert_eq!(
            Book::from_json(&wrong_year).expect_err("year").kind(),
            ErrorKind::Format
        );

        let bad_status = json!({"id": 1, "title": "t", "author": "a", "year": 2000, "status": "lost"});
        assert_eq!(
            Book::from_json(&bad_status).expect_err("status").kind(),
            ErrorKind::Format
        );

        assert_eq!(
            Book::from_json(&json!([1, 2])).expect_err("array").kind(),
            ErrorKind::Format
        );
    }

    #[test]
    fn status_parses_external_spelling_and_aliases() {
        assert_eq!("в наличии".parse::<Status>().expect("parse"), Status::Available);
        assert_eq!("выдана".parse::<Status>().expect("parse"), Status::CheckedOut);
        assert_eq!("available".parse::<Status>().expect("parse"), Status::Available);
        assert_eq!("checked_out".parse::<Status>().expect("parse"), Status::CheckedOut);

        let err = "invalid".parse::<Status>().expect_err("invalid");
        assert_eq!(err.kind(), ErrorKind::InvalidStatus);
        assert_eq!("Выдана".parse::<Status>().expect_err("case").kind(), ErrorKind::InvalidStatus);
    }

    #[test]
    fn matches_is_case_insensitive_for_text_and_literal_for_year() {
        let book = Book::new(1, "Поиск по названию", "Автор поиска", 2023);
        assert!(book.matches("поиск"));
        assert!(book.matches("АВТОР"));
        assert!(book.matches("202"));
        assert!(book.matches(""));
        assert!(!book.matches("2022"));
    }
}
