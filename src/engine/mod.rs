pub mod duck;
pub mod errors;

pub use errors::*;

#[cfg(test)]
mod duck_test;
