pub mod types;

pub use types::{ErrorBody, UploadResponse, error_reply, json_reply};

#[cfg(test)]
mod types_test;
