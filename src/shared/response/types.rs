use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

/// Body returned for a successful upload-and-scan. Column order follows
/// the result descriptor; row order follows the engine's output.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub columns: Vec<String>,
    pub data: Vec<Map<String, Value>>,
    pub row_count: usize,
}

impl UploadResponse {
    /// Re-keys each row tuple by column name, preserving both orders.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let data: Vec<Map<String, Value>> = rows
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .cloned()
                    .zip(row)
                    .collect::<Map<String, Value>>()
            })
            .collect();
        let row_count = data.len();
        Self {
            columns,
            data,
            row_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn json_reply<T: Serialize>(status: StatusCode, body: &T) -> Response<String> {
    let payload = serde_json::to_string(body)
        .unwrap_or_else(|_| r#"{"error":"response serialization failed"}"#.to_string());
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(payload)
        .unwrap()
}

pub fn error_reply(status: StatusCode, message: impl ToString) -> Response<String> {
    json_reply(
        status,
        &ErrorBody {
            error: message.to_string(),
        },
    )
}
