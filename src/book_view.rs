//! Purpose: Shared book and report renderers for CLI commands and the menu.
//! Exports: JSON envelopes (`book_json`, `books_json`, `report_json`) and human text helpers.
//! Role: Keep record output shape consistent across one-shot commands and the interactive menu.
//! Invariants: JSON book objects use the catalog file keys verbatim.
//! Invariants: Human renderers return strings; callers own the writer.

use bookshelf::api::{Book, ValidationReport, ValidationStatus};
use serde_json::{Map, Value, json};

const DETAIL_SEPARATOR: &str = "############################";

pub(crate) fn book_json(book: &Book) -> Value {
    json!({ "book": book.to_json() })
}

pub(crate) fn books_json(books: &[&Book]) -> Value {
    let values = books.iter().map(|book| book.to_json()).collect::<Vec<_>>();
    json!({ "count": values.len(), "books": values })
}

pub(crate) fn report_json(report: &ValidationReport) -> Value {
    let issues = report
        .issues
        .iter()
        .map(|issue| {
            let mut map = Map::new();
            map.insert("code".to_string(), json!(issue.code));
            map.insert("message".to_string(), json!(issue.message));
            if let Some(index) = issue.index {
                map.insert("index".to_string(), json!(index));
            }
            if let Some(id) = issue.id {
                map.insert("id".to_string(), json!(id));
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();
    json!({
        "path": report.path.display().to_string(),
        "status": status_label(report.status),
        "record_count": report.record_count,
        "issues": issues,
        "remediation_hints": report.remediation_hints,
    })
}

fn status_label(status: ValidationStatus) -> &'static str {
    match status {
        ValidationStatus::Ok => "ok",
        ValidationStatus::Corrupt => "corrupt",
    }
}

pub(crate) fn book_detail(book: &Book) -> String {
    format!(
        "ID: {}\nTitle: {}\nAuthor: {}\nYear: {}\nStatus: {}",
        book.id, book.title, book.author, book.year, book.status
    )
}

/// One detail block per book, separated like the original listing.
pub(crate) fn book_details(books: &[&Book]) -> String {
    books
        .iter()
        .map(|book| format!("{}\n{DETAIL_SEPARATOR}", book_detail(book)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn books_table(books: &[&Book]) -> String {
    let rows = books
        .iter()
        .map(|book| {
            vec![
                book.id.to_string(),
                book.title.clone(),
                book.author.clone(),
                book.year.to_string(),
                book.status.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&["ID", "TITLE", "AUTHOR", "YEAR", "STATUS"], &rows)
}

pub(crate) fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();
    let mut sanitized_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let mut sanitized = Vec::with_capacity(widths.len());
        for (idx, width) in widths.iter_mut().enumerate() {
            let cleaned = sanitize_table_cell(row.get(idx).map(String::as_str).unwrap_or(""));
            *width = (*width).max(cleaned.chars().count());
            sanitized.push(cleaned);
        }
        sanitized_rows.push(sanitized);
    }

    let header_cells = headers
        .iter()
        .map(|header| header.to_string())
        .collect::<Vec<_>>();
    let mut lines = Vec::with_capacity(sanitized_rows.len() + 1);
    lines.push(format_table_line(&header_cells, &widths));
    for row in sanitized_rows {
        lines.push(format_table_line(&row, &widths));
    }
    lines.join("\n")
}

fn sanitize_table_cell(value: &str) -> String {
    value.replace('\n', "\\n").replace('\r', "\\r")
}

fn format_table_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        line.push_str(cell);
        let cell_len = cell.chars().count();
        if *width > cell_len && idx + 1 < widths.len() {
            line.push_str(&" ".repeat(*width - cell_len));
        }
    }
    line
}
