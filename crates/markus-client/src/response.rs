//! Normalizes HTTP responses and contains types which model the JSON responses from MarkUs.

use crate::error::{MarkusClientError, MarkusClientResult};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Declares how the body of a successful response is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Text,
    Content,
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Content(Bytes),
}

impl ResponseBody {
    fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "JSON",
            Self::Text(_) => "text",
            Self::Content(_) => "binary",
        }
    }
}

/// A response from the MarkUs API.
///
/// Failed requests (status 400 and above) always carry the server's error body as JSON,
/// whichever format the endpoint returns on success.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        !is_failure(self.status)
    }

    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(json) => Some(json),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn content(&self) -> Option<&Bytes> {
        match &self.body {
            ResponseBody::Content(content) => Some(content),
            _ => None,
        }
    }

    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    /// Deserializes a JSON body into `T`.
    ///
    /// # Errors
    /// If the body is not JSON or does not have the shape of `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> MarkusClientResult<T> {
        match &self.body {
            ResponseBody::Json(json) => {
                T::deserialize(json).map_err(MarkusClientError::JsonDeserialize)
            }
            other => Err(MarkusClientError::UnexpectedBody {
                expected: "JSON",
                actual: other.kind(),
            }),
        }
    }
}

fn is_failure(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

/// Decodes a raw response body.
///
/// Failed responses are always decoded as JSON. Successful ones are decoded according
/// to `format`. An empty body decodes to JSON `null`.
pub fn normalize(
    status: StatusCode,
    body: Bytes,
    format: ResponseFormat,
    url: &Url,
) -> MarkusClientResult<ApiResponse> {
    let format = if is_failure(status) {
        log::debug!("{url} responded with {status}");
        ResponseFormat::Json
    } else {
        format
    };

    let body = match format {
        ResponseFormat::Json => {
            if body.iter().all(u8::is_ascii_whitespace) {
                ResponseBody::Json(Value::Null)
            } else {
                let json = serde_json::from_slice(&body)
                    .map_err(|e| MarkusClientError::HttpJsonResponse(url.clone(), e))?;
                ResponseBody::Json(json)
            }
        }
        ResponseFormat::Text => ResponseBody::Text(String::from_utf8_lossy(&body).into_owned()),
        ResponseFormat::Content => ResponseBody::Content(body),
    };
    Ok(ApiResponse { status, body })
}

/// get /api/users
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: u64,
    pub user_name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, rename = "type")]
    pub user_type: Option<String>,
    #[serde(default)]
    pub grace_credits: Option<i64>,
    #[serde(default)]
    pub notes_count: Option<u64>,
    #[serde(default)]
    pub hidden: Option<bool>,
}

/// get /api/assignments
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Assignment {
    pub id: u64,
    pub short_identifier: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub is_hidden: Option<bool>,
}

/// get /api/assignments/{assignment_id}/groups
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Group {
    pub id: u64,
    pub group_name: String,
    #[serde(default)]
    pub members: Vec<Value>,
}

/// get /api/assignments/{assignment_id}/groups/{group_id}/feedback_files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedbackFile {
    pub id: u64,
    pub filename: String,
}

/// get /api/assignments/{assignment_id}/starter_file_groups
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StarterFileGroup {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub entry_rename: Option<String>,
    #[serde(default)]
    pub use_rename: Option<bool>,
}
