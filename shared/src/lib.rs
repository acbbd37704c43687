//! Shared types for the bakery access-control layer
//!
//! Module registry, access decision engine, error codes and response
//! envelope used by both `bakery-server` and `bakery-client`.

pub mod access;
pub mod error;
pub mod models;
pub mod registry;
pub mod response;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use access::{AccessContext, AllowList, BranchScope, GrantSet, RolePolicy, default_modules};
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use registry::{
    Module, ModuleInfo, ModuleRegistry, RegistryError, SYSTEM_MODULES, get_all_module_ids,
    get_modules_by_category, get_resource_module, get_route_module,
};
pub use response::ApiResponse;
