//! Contains types used to make requests to MarkUs.

use crate::error::{MarkusClientError, MarkusClientResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Query parameters, in the order they are sent.
///
/// Built from any serializable value: `null`s are skipped, arrays of scalars are sent
/// as `key[]`, arrays of objects as `key[index][field]` and nested objects as `key[field]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens a value that serializes into a JSON object into query parameters.
    ///
    /// # Errors
    /// If the value fails to serialize or is not an object.
    pub fn from_serialize<T: Serialize>(value: &T) -> MarkusClientResult<Self> {
        let value = serde_json::to_value(value).map_err(MarkusClientError::SerializeParams)?;
        let mut params = Self::new();
        match value {
            Value::Object(map) => {
                for (key, value) in map {
                    params.flatten(key, value);
                }
            }
            Value::Null => {}
            _ => {
                return Err(MarkusClientError::SerializeParams(
                    serde::ser::Error::custom("query parameters must be an object"),
                ))
            }
        }
        Ok(params)
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.0.push((key.into(), value.to_string()));
        self
    }

    /// Returns the first value for the key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }

    fn flatten(&mut self, key: String, value: Value) {
        match value {
            Value::Null => {}
            Value::Bool(b) => {
                self.push(key, b);
            }
            Value::Number(n) => {
                self.push(key, n);
            }
            Value::String(s) => {
                self.push(key, s);
            }
            Value::Array(values) => {
                for (i, value) in values.into_iter().enumerate() {
                    // indexed so that objects with differing fields stay apart
                    let key = if value.is_object() || value.is_array() {
                        format!("{key}[{i}]")
                    } else {
                        format!("{key}[]")
                    };
                    self.flatten(key, value);
                }
            }
            Value::Object(map) => {
                for (field, value) in map {
                    self.flatten(format!("{key}[{field}]"), value);
                }
            }
        }
    }
}

/// post /api/users
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub user_name: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_credits: Option<i64>,
}

impl NewUser {
    pub fn new(
        user_name: impl Into<String>,
        user_type: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            user_type: user_type.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            section_name: None,
            grace_credits: None,
        }
    }
}

/// A column of a marks spreadsheet.
#[derive(Debug, Clone, Serialize)]
pub struct GradeEntryItem {
    pub name: String,
    pub out_of: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus: Option<bool>,
}

/// post /api/grade_entry_forms
#[derive(Debug, Clone, Serialize)]
pub struct NewMarksSpreadsheet {
    pub short_identifier: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
    pub is_hidden: bool,
    pub show_total: bool,
    pub grade_entry_items: Option<Vec<GradeEntryItem>>,
}

impl NewMarksSpreadsheet {
    /// A hidden spreadsheet with a total column, no description, date or columns.
    pub fn new(short_identifier: impl Into<String>) -> Self {
        Self {
            short_identifier: short_identifier.into(),
            description: String::new(),
            date: None,
            is_hidden: true,
            show_total: true,
            grade_entry_items: None,
        }
    }
}

/// put /api/grade_entry_forms/{grade_entry_form_id}
/// Only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarksSpreadsheetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_total: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_entry_items: Option<Vec<GradeEntryItem>>,
}

/// An annotation on a plain-text submission file.
#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_category_name: Option<String>,
    pub content: String,
    pub line_start: u32,
    pub line_end: u32,
    pub column_start: u32,
    pub column_end: u32,
}

/// put /api/assignments/{assignment_id}/starter_file_groups/{starter_file_group_id}
/// Only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StarterFileGroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_rename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_rename: Option<bool>,
}

/// Guesses the MIME type of a file from its extension.
///
/// # Errors
/// If the extension is missing or unknown.
pub fn guess_mime_type(filename: &str) -> MarkusClientResult<String> {
    mime_guess::from_path(filename)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .ok_or_else(|| MarkusClientError::UnknownMimeType(filename.to_string()))
}

// an explicit type wins over the guess
pub(crate) fn resolve_mime_type(
    mime_type: Option<&str>,
    filename: &str,
) -> MarkusClientResult<String> {
    match mime_type {
        Some(mime_type) => Ok(mime_type.to_string()),
        None => guess_mime_type(filename),
    }
}
