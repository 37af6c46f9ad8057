use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use smoothie_shared::{Recipe, RecipeId, RecipePayload};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::recipe_store::RecipeStore;

#[derive(Clone)]
pub struct AppState {
    pub store: RecipeStore,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            store: RecipeStore::new(),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let recipes = Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/:id", put(update_recipe).delete(delete_recipe))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(recipes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ListResponse {
    recipes: Vec<Recipe>,
}

#[derive(Serialize)]
struct RecipeResponse {
    success: bool,
    recipe: Recipe,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_recipes(State(state): State<AppState>) -> Json<ListResponse> {
    Json(ListResponse {
        recipes: state.store.list().await,
    })
}

async fn create_recipe(
    State(state): State<AppState>,
    Json(payload): Json<RecipePayload>,
) -> Result<Json<RecipeResponse>, ServerError> {
    let recipe = state.store.create(payload).await?;
    Ok(Json(RecipeResponse {
        success: true,
        recipe,
    }))
}

async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RecipePayload>,
) -> Result<Json<RecipeResponse>, ServerError> {
    let id = parse_id(&id)?;
    let recipe = state.store.update(&id, payload).await?;
    Ok(Json(RecipeResponse {
        success: true,
        recipe,
    }))
}

async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ServerError> {
    let id = parse_id(&id)?;
    state.store.delete(&id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

/// Only remote-namespace ids can exist here; anything else is unknown.
fn parse_id(raw: &str) -> Result<RecipeId, ServerError> {
    raw.parse::<RecipeId>()
        .ok()
        .filter(RecipeId::is_remote)
        .ok_or_else(|| ServerError::RecipeNotFound(raw.to_string()))
}

async fn require_bearer(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if let Some(ref expected) = state.config.api_token {
        verify_bearer(&headers, expected)?;
    }
    Ok(next.run(req).await)
}

fn verify_bearer(headers: &HeaderMap, expected: &str) -> Result<(), ServerError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");

    use subtle::ConstantTimeEq;
    let token_bytes = token.as_bytes();
    let expected_bytes = expected.as_bytes();
    if token_bytes.len() != expected_bytes.len()
        || token_bytes.ct_eq(expected_bytes).unwrap_u8() != 1
    {
        return Err(ServerError::Unauthorized);
    }

    Ok(())
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(state, listener).await
}

/// Serve on an already-bound listener (lets callers bind port 0).
pub async fn serve_on(state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %listener.local_addr()?, "Starting HTTP API server");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request as HttpRequest, StatusCode};
    use tower::ServiceExt;

    fn router(token: Option<&str>) -> Router {
        build_router(AppState::new(ServerConfig {
            api_token: token.map(String::from),
            ..ServerConfig::default()
        }))
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn valid_body() -> serde_json::Value {
        serde_json::json!({
            "name": "Mango Lassi",
            "contributor": "alice",
            "ingredients": ["mango", "yoghurt"],
            "instructions": "Blend.",
            "servings": 2
        })
    }

    #[tokio::test]
    async fn empty_listing_is_ok() {
        let resp = router(None)
            .oneshot(HttpRequest::get("/recipes").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({ "recipes": [] }));
    }

    #[tokio::test]
    async fn create_then_update_via_encoded_path() {
        let app = router(None);

        let resp = app
            .clone()
            .oneshot(json_request("POST", "/recipes", valid_body()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let created = body_json(resp).await;
        assert_eq!(created["success"], true);
        let id = created["recipe"]["id"].as_str().unwrap().to_string();

        let uri = format!("/recipes/{}", id.replace(':', "%3A"));
        let mut edit = valid_body();
        edit["name"] = "Mango Lassi Deluxe".into();
        let resp = app
            .clone()
            .oneshot(json_request("PUT", &uri, edit))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let updated = body_json(resp).await;
        assert_eq!(updated["recipe"]["name"], "Mango Lassi Deluxe");
        assert_eq!(updated["recipe"]["createdAt"], created["recipe"]["createdAt"]);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let resp = router(None)
            .oneshot(json_request(
                "POST",
                "/recipes",
                serde_json::json!({ "name": "No Contributor", "ingredients": ["a"], "instructions": "b" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let resp = router(None)
            .oneshot(
                HttpRequest::delete("/recipes/recipe%3A1%3Azzz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bearer_token_is_enforced() {
        let app = router(Some("s3cret"));

        let resp = app
            .clone()
            .oneshot(HttpRequest::get("/recipes").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = app
            .clone()
            .oneshot(
                HttpRequest::get("/recipes")
                    .header("authorization", "Bearer s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(HttpRequest::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
