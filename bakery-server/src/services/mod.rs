//! Services
//!
//! - [`HttpService`] - router holder and HTTP listener

pub mod http;

pub use self::http::{HttpService, OneshotResult, build_app};
