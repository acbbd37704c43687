//! Authentication middleware
//!
//! Axum middleware for JWT authentication and role/module authorization

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::access::AccessContext;
use shared::models::ModuleId;
use shared::{AppError, ErrorCode};

use crate::auth::{CurrentUser, JwtError, JwtService, session_grants};
use crate::core::ServerState;
use crate::security_log;

/// Paths under `/api/` reachable without a token
const PUBLIC_API_ROUTES: &[&str] = &["/api/health"];

/// Authentication middleware
///
/// Validates `Authorization: Bearer <token>` and inserts the [`CurrentUser`]
/// into request extensions.
///
/// Skipped for `OPTIONS` (CORS preflight), non-`/api/` paths and
/// [`PUBLIC_API_ROUTES`].
///
/// | Failure | Status |
/// |---------|--------|
/// | no header | 401 NotAuthenticated |
/// | expired | 401 TokenExpired |
/// | anything else | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") || PUBLIC_API_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// Admin middleware, lets `admin` and `super_admin` through
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id.clone(),
            username = user.username.clone(),
            user_role = user.role.as_str()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// Module gate middleware
///
/// Answers 403 `ModuleNotGranted` unless the caller's role holds `module_id`
/// in the grant store. Super admin always passes.
///
/// ```ignore
/// Router::new()
///     .route("/api/admin/role-modules", get(handler::list))
///     .layer(middleware::from_fn_with_state(
///         state.clone(),
///         require_module(ModuleId::SystemSettings),
///     ));
/// ```
pub fn require_module(
    module_id: ModuleId,
) -> impl Fn(State<ServerState>, Request, Next) -> MiddlewareFuture + Clone {
    move |State(state): State<ServerState>, req: Request, next: Next| {
        Box::pin(async move {
            let current = req
                .extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or(AppError::unauthorized())?;

            let grants = session_grants(&state, &current).await?;
            let user = current.to_user();
            if !AccessContext::new(Some(&user), &grants).can_access_module(module_id) {
                security_log!(
                    "WARN",
                    "module_denied",
                    user_id = current.id.clone(),
                    user_role = current.role.as_str(),
                    module = module_id.as_str()
                );
                return Err(AppError::with_message(
                    ErrorCode::ModuleNotGranted,
                    format!("Module not granted: {}", module_id),
                )
                .with_detail("module_id", module_id.as_str()));
            }

            Ok(next.run(req).await)
        })
    }
}
