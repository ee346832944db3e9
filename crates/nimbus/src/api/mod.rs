//! API route handlers

pub mod endpoints;
pub mod error;
pub mod snapshots;
pub mod system;

pub use error::{ApiError, AppError};
