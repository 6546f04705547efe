// ABOUTME: Digdag REST API module
// ABOUTME: Exports the blocking client, its errors and the response records

pub mod client;
pub mod error;
pub mod models;

pub use client::DigdagClient;
pub use error::{ApiError, Result};
