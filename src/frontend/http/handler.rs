use hyper::{Method, Request, Response, StatusCode, body::Incoming};
use serde_json::json;
use std::convert::Infallible;

use crate::shared::response::json_reply;

use super::upload::handle_upload;

pub async fn handle_request(req: Request<Incoming>) -> Result<Response<String>, Infallible> {
    match (req.method(), req.uri().path()) {
        (&Method::POST, "/upload-parquet") => handle_upload(req).await,
        (&Method::GET, "/health") => Ok(json_reply(StatusCode::OK, &json!({"status": "ok"}))),
        (_, "/upload-parquet") => Ok(method_not_allowed()),
        _ => Ok(not_found()),
    }
}

fn not_found() -> Response<String> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body("Not Found".to_string())
        .unwrap()
}

fn method_not_allowed() -> Response<String> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .body("Method Not Allowed".to_string())
        .unwrap()
}
