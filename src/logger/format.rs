//! Message formatting: banner framing and grid tables.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use super::level::LogLevel;
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Banner width used when none is configured.
pub const DEFAULT_SEPARATOR_WIDTH: usize = 196;

const SEPARATOR: char = '#';

/// Frame a multi-line message in `#` banners.
///
/// The leading banner is shortened by the level label plus `": "` so it
/// ends in the same column as the trailing one once the label is printed.
/// Single-line messages are returned untouched.
pub fn wrap_message<'a>(level: LogLevel, message: &'a str, width: usize) -> Cow<'a, str> {
    if !message.contains('\n') {
        return Cow::Borrowed(message);
    }

    let before = banner(width.saturating_sub(level.name().len() + 2));
    let after = banner(width);
    Cow::Owned(format!("{before}\n{message}\n{after}"))
}

fn banner(len: usize) -> String {
    std::iter::repeat(SEPARATOR).take(len).collect()
}

/// Render uniform records as a bordered grid.
///
/// Column order is taken from the first record. Every other record must
/// carry exactly the same columns.
pub fn render_table<T: Serialize>(rows: &[T]) -> Result<String> {
    let records = rows
        .iter()
        .enumerate()
        .map(|(index, row)| -> Result<Map<String, Value>> {
            match serde_json::to_value(row)? {
                Value::Object(map) => Ok(map),
                other => Err(Error::InvalidTableRow {
                    index,
                    found: other.to_string(),
                }),
            }
        })
        .collect::<Result<Vec<Map<String, Value>>>>()?;

    let first = records.first().ok_or(Error::EmptyTable)?;
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut builder = Builder::default();
    builder.push_record(headers.clone());

    for (index, record) in records.iter().enumerate() {
        let cells = headers
            .iter()
            .map(|header| record.get(header).map(render_cell))
            .collect::<Option<Vec<String>>>()
            .filter(|_| record.len() == headers.len())
            .ok_or_else(|| Error::InconsistentRow {
                index,
                expected: headers.join(", "),
                found: record.keys().cloned().collect::<Vec<_>>().join(", "),
            })?;
        builder.push_record(cells);
    }

    let mut table = builder.build();
    table.with(Style::ascii());
    Ok(table.to_string())
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
