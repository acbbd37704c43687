//! Utilities
//!
//! - [`logger`] - tracing subscriber setup

pub mod logger;

pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
