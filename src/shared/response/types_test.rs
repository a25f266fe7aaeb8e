use hyper::StatusCode;
use serde_json::{Value, json};

use super::types::{UploadResponse, error_reply, json_reply};

#[test]
fn from_rows_keys_each_row_by_column_in_order() {
    let columns = vec!["c1".to_string(), "c2".to_string(), "c3".to_string()];
    let rows = vec![
        vec![json!(1), json!("a"), json!(true)],
        vec![json!(2), json!("b"), json!(false)],
    ];

    let resp = UploadResponse::from_rows(columns, rows);

    assert_eq!(resp.row_count, 2);
    assert_eq!(resp.data.len(), 2);
    assert_eq!(resp.columns, vec!["c1", "c2", "c3"]);
    assert_eq!(resp.data[0]["c1"], json!(1));
    assert_eq!(resp.data[0]["c2"], json!("a"));
    assert_eq!(resp.data[1]["c3"], json!(false));

    // serde_json::Map preserves insertion order, so the serialized row
    // lists keys in descriptor order
    let keys: Vec<&String> = resp.data[0].keys().collect();
    assert_eq!(keys, vec!["c1", "c2", "c3"]);
}

#[test]
fn from_rows_empty_result_keeps_columns() {
    let resp = UploadResponse::from_rows(vec!["only".to_string()], vec![]);
    assert_eq!(resp.row_count, 0);
    assert!(resp.data.is_empty());
    assert_eq!(resp.columns, vec!["only"]);
}

#[test]
fn json_reply_sets_status_and_content_type() {
    let resp = json_reply(StatusCode::OK, &json!({"status": "ok"}));
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[hyper::header::CONTENT_TYPE],
        "application/json"
    );
    let parsed: Value = serde_json::from_str(resp.body()).unwrap();
    assert_eq!(parsed["status"], "ok");
}

#[test]
fn error_reply_wraps_message_in_error_field() {
    let resp = error_reply(StatusCode::BAD_REQUEST, "bad extension");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let parsed: Value = serde_json::from_str(resp.body()).unwrap();
    assert_eq!(parsed["error"], "bad extension");
}
