//! API Response types
//!
//! Every `/api/*` endpoint answers with the same envelope:
//!
//! ```json
//! { "success": true, "data": { "moduleIds": ["dashboard", "order_management"] } }
//! { "success": false, "error": "Unknown module: bakery_magic", "code": 3001 }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{AppError, ErrorCode};

/// Unified API response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Response payload (present on success)
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Numeric [`ErrorCode`] (present on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Additional error details (present on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            details: None,
        }
    }

    /// Create an error response from an [`AppError`]
    pub fn from_error(err: &AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.message.clone()),
            code: Some(err.code.code()),
            details: err.details.clone(),
        }
    }

    /// Typed error code, if the response carries a known one
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code.and_then(|c| ErrorCode::try_from(c).ok())
    }

    /// Unwrap the payload, turning a failure envelope back into an [`AppError`]
    pub fn into_result(self) -> Result<T, AppError> {
        if !self.success {
            let code = self.error_code().unwrap_or(ErrorCode::Unknown);
            let message = self.error.unwrap_or_else(|| code.message().to_string());
            return Err(AppError {
                code,
                message,
                details: self.details,
            });
        }
        self.data
            .ok_or_else(|| AppError::internal("Response is missing data"))
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self::from_error(&err)
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status = if self.success {
            http::StatusCode::OK
        } else {
            self.error_code()
                .map(|c| c.http_status())
                .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
        };

        (status, axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_serializes_without_error_fields() {
        let json = serde_json::to_string(&ApiResponse::ok(42)).unwrap();
        assert_eq!(json, r#"{"success":true,"data":42}"#);
    }

    #[test]
    fn test_error_response() {
        let err = AppError::module_not_found("bakery_magic");
        let response = ApiResponse::<()>::from_error(&err);
        assert!(!response.success);
        assert_eq!(response.code, Some(3001));
        assert_eq!(response.error.as_deref(), Some("Unknown module: bakery_magic"));
        assert!(response.details.is_some());
    }

    #[test]
    fn test_into_result_roundtrips_error() {
        let json = r#"{"success":false,"error":"Administrator role is required","code":2003}"#;
        let response: ApiResponse<Vec<String>> = serde_json::from_str(json).unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::AdminRequired);
        assert_eq!(err.message, "Administrator role is required");
    }

    #[test]
    fn test_into_result_requires_data() {
        let json = r#"{"success":true}"#;
        let response: ApiResponse<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.into_result().unwrap_err().code,
            ErrorCode::InternalError
        );
    }
}
