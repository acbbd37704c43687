//! HTTP client for the bakery server API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::ApiResponse;
use shared::models::{
    ModuleId, Role, RoleModuleGrant, SaveRoleModulesRequest, SaveRoleModulesResponse,
    UserModulesResponse,
};
use shared::registry::ModuleInfo;

use crate::{ClientConfig, ClientError, ClientResult, ModuleSource};

/// HTTP client for making requests to the bakery server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// GET `path` and unwrap the response envelope
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut request = self.client.get(self.url(path));

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// POST a JSON body to `path` and unwrap the response envelope
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut request = self.client.post(self.url(path)).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if let Ok(envelope) = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text)
                && let Some(code) = envelope.error_code()
            {
                return Err(ClientError::Api {
                    code,
                    message: envelope
                        .error
                        .unwrap_or_else(|| code.message().to_string()),
                });
            }
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized(text)),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&text)?;
        Ok(envelope.into_result()?)
    }

    // ========== Module API ==========

    /// Module ids granted to the token's role
    pub async fn user_modules(&self) -> ClientResult<Vec<ModuleId>> {
        let resp: UserModulesResponse = self.get("/api/user/modules").await?;
        Ok(resp.module_ids)
    }

    /// Module catalog
    pub async fn modules(&self) -> ClientResult<Vec<ModuleInfo>> {
        self.get("/api/modules").await
    }

    // ========== Admin API ==========

    /// Every stored role-module grant
    pub async fn role_modules(&self) -> ClientResult<Vec<RoleModuleGrant>> {
        self.get("/api/admin/role-modules").await
    }

    pub async fn role_modules_for(&self, role: Role) -> ClientResult<Vec<RoleModuleGrant>> {
        self.get(&format!("/api/admin/role-modules/{}", role.as_str()))
            .await
    }

    /// Replace every grant of `role` with `module_ids`
    pub async fn save_role_modules(
        &self,
        role: Role,
        module_ids: &[ModuleId],
    ) -> ClientResult<Role> {
        let request = SaveRoleModulesRequest::new(role, module_ids.iter().copied());
        let resp: SaveRoleModulesResponse = self.post("/api/admin/role-modules", &request).await?;
        Ok(resp.role)
    }
}

#[async_trait]
impl ModuleSource for HttpClient {
    async fn user_modules(&self) -> ClientResult<Vec<ModuleId>> {
        HttpClient::user_modules(self).await
    }

    async fn role_modules_for(&self, role: Role) -> ClientResult<Vec<RoleModuleGrant>> {
        HttpClient::role_modules_for(self, role).await
    }

    async fn save_role_modules(&self, role: Role, module_ids: &[ModuleId]) -> ClientResult<()> {
        HttpClient::save_role_modules(self, role, module_ids).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_slashes() {
        let client = HttpClient::new(&ClientConfig::new("http://localhost:3000/")).unwrap();
        assert_eq!(
            client.url("/api/user/modules"),
            "http://localhost:3000/api/user/modules"
        );
        assert_eq!(client.url("api/modules"), "http://localhost:3000/api/modules");
    }

    #[test]
    fn test_token_from_config() {
        let config = ClientConfig::new("http://localhost:3000").with_token("abc");
        let client = HttpClient::new(&config).unwrap();
        assert_eq!(client.token(), Some("abc"));
        assert_eq!(client.auth_header().as_deref(), Some("Bearer abc"));
    }
}
