//! Purpose: Read-only integrity check of a catalog file.
//! Exports: `ValidationReport`, `ValidationStatus`, `ValidationIssue`, `validate_catalog`.
//! Role: Backs `bookshelf doctor`; reports every issue instead of stopping at the first.
//! Invariants: Never writes to the catalog; a missing file is a valid empty catalog.
//! Invariants: Issue codes are stable: `malformed`, `duplicate_id`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::core::error::Error;
use crate::core::record::Book;

pub const ISSUE_MALFORMED: &str = "malformed";
pub const ISSUE_DUPLICATE_ID: &str = "duplicate_id";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationStatus {
    Ok,
    Corrupt,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    pub index: Option<usize>,
    pub id: Option<u64>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationReport {
    pub path: PathBuf,
    pub status: ValidationStatus,
    pub record_count: usize,
    pub issues: Vec<ValidationIssue>,
    pub remediation_hints: Vec<String>,
}

impl ValidationReport {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            status: ValidationStatus::Ok,
            record_count: 0,
            issues: Vec::new(),
            remediation_hints: Vec::new(),
        }
    }

    fn set_issues(mut self, issues: Vec<ValidationIssue>) -> Self {
        self.status = if issues.is_empty() {
            ValidationStatus::Ok
        } else {
            ValidationStatus::Corrupt
        };
        self.remediation_hints = if issues.is_empty() {
            Vec::new()
        } else {
            vec![
                "Fix or remove the listed entries by hand; bookshelf refuses to open a malformed catalog."
                    .to_string(),
            ]
        };
        self.issues = issues;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == ValidationStatus::Ok
    }
}

pub fn validate_catalog(path: &Path) -> Result<ValidationReport, Error> {
    let report = ValidationReport::new(path.to_path_buf());
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(report),
        Err(err) if err.kind() == io::ErrorKind::InvalidData => {
            return Ok(report.set_issues(vec![issue(
                ISSUE_MALFORMED,
                "catalog is not valid UTF-8",
                None,
                None,
            )]));
        }
        Err(err) => return Err(Error::io(path, err)),
    };
    Ok(validate_text(report, &text))
}

fn validate_text(mut report: ValidationReport, text: &str) -> ValidationReport {
    let items = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            return report.set_issues(vec![issue(
                ISSUE_MALFORMED,
                "catalog must be a JSON array",
                None,
                None,
            )]);
        }
        Err(err) => {
            let message = format!("catalog is not valid JSON: {err}");
            return report.set_issues(vec![issue(ISSUE_MALFORMED, &message, None, None)]);
        }
    };

    let mut issues = Vec::new();
    let mut first_index: HashMap<u64, usize> = HashMap::new();
    for (index, item) in items.iter().enumerate() {
        match Book::from_json(item) {
            Ok(book) => {
                report.record_count += 1;
                if let Some(first) = first_index.get(&book.id) {
                    let message = format!("id {} already used by entry {first}", book.id);
                    issues.push(issue(ISSUE_DUPLICATE_ID, &message, Some(index), Some(book.id)));
                } else {
                    first_index.insert(book.id, index);
                }
            }
            Err(err) => {
                let message = err.message().unwrap_or("malformed book record").to_string();
                let id = item.get("id").and_then(Value::as_u64);
                issues.push(issue(ISSUE_MALFORMED, &message, Some(index), id));
            }
        }
    }
    report.set_issues(issues)
}

fn issue(code: &str, message: &str, index: Option<usize>, id: Option<u64>) -> ValidationIssue {
    ValidationIssue {
        code: code.to_string(),
        message: message.to_string(),
        index,
        id,
    }
}
