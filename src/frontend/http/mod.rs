pub mod error;
pub mod handler;
pub mod listener;
pub mod upload;
