//! reqwest-backed [`RecipeService`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::{debug, warn};

use smoothie_shared::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use smoothie_shared::{Recipe, RecipeId, RecipePayload};

use crate::error::RemoteError;
use crate::messages::{ErrorResponse, ListResponse, RecipeResponse};
use crate::path::{recipe_path, recipes_path};
use crate::service::RecipeService;

/// Connection settings for [`HttpRecipeService`].
#[derive(Debug, Clone)]
pub struct HttpServiceConfig {
    /// Service root, e.g. `https://api.example.com/functions/v1`.
    pub base_url: String,
    /// Static bearer credential sent on every request.
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl HttpServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

pub struct HttpRecipeService {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpRecipeService {
    pub fn new(config: HttpServiceConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::Unreachable(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send, turning transport failures and non-2xx statuses into
    /// [`RemoteError`]s carrying the status code and body text.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| RemoteError::Unreachable(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %text, "recipe service error response");
        // Prefer the service's own message when the body is `{"error": ...}`.
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error)
            .unwrap_or(text);
        Err(RemoteError::from_status(status.as_u16(), message))
    }
}

#[async_trait]
impl RecipeService for HttpRecipeService {
    async fn list(&self) -> Result<Vec<Recipe>, RemoteError> {
        let resp = self.send(self.request(Method::GET, recipes_path())).await?;
        let listing: ListResponse = resp.json().await?;

        let mut recipes = Vec::with_capacity(listing.recipes.len());
        for row in listing.recipes {
            match serde_json::from_value::<Recipe>(row) {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => warn!(error = %e, "skipping malformed remote recipe"),
            }
        }

        debug!(count = recipes.len(), "listed remote recipes");
        Ok(recipes)
    }

    async fn create(&self, payload: &RecipePayload) -> Result<Recipe, RemoteError> {
        let resp = self
            .send(self.request(Method::POST, recipes_path()).json(payload))
            .await?;
        let body: RecipeResponse = resp.json().await?;

        debug!(id = %body.recipe.id, "created remote recipe");
        Ok(body.recipe)
    }

    async fn update(&self, id: &RecipeId, payload: &RecipePayload) -> Result<Recipe, RemoteError> {
        let resp = self
            .send(self.request(Method::PUT, &recipe_path(id)).json(payload))
            .await?;
        let body: RecipeResponse = resp.json().await?;

        debug!(id = %id, "updated remote recipe");
        Ok(body.recipe)
    }

    async fn delete(&self, id: &RecipeId) -> Result<(), RemoteError> {
        self.send(self.request(Method::DELETE, &recipe_path(id))).await?;
        debug!(id = %id, "deleted remote recipe");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let svc = HttpRecipeService::new(HttpServiceConfig::new("http://localhost:8080/")).unwrap();
        assert_eq!(svc.base_url(), "http://localhost:8080");
    }

    #[test]
    fn config_builder_sets_token() {
        let config = HttpServiceConfig::new("http://x").with_token("secret");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    }
}
