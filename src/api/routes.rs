use crate::api::{articles, auth, generation, health, providers, scenarios, users, webhooks};
use crate::auth::JwtManager;
use crate::pipeline::simulator::ExecutionSimulator;
use crate::pipeline::synthesizer::ProviderClient;
use crate::pipeline::translator::Translator;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtManager>,
    pub provider_client: Arc<dyn ProviderClient>,
    pub simulator: Arc<dyn ExecutionSimulator>,
    pub translator: Arc<dyn Translator>,
    pub generation_timeout: Duration,
}

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes())
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Add state
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health::health))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/verify", get(auth::verify))
        .route("/auth/logout", post(auth::logout))
        // Users
        .route("/users", get(users::list))
        // Articles
        .route("/articles", get(articles::list).post(articles::create))
        .route("/articles/:id", get(articles::get_one).put(articles::update))
        // Scenarios
        .route("/scenarios", get(scenarios::list).post(scenarios::create))
        .route("/scenarios/:id", put(scenarios::update).delete(scenarios::remove))
        .route("/scenarios/:id/toggle", post(scenarios::toggle))
        .route("/scenarios/:id/execute", post(scenarios::execute))
        // AI providers
        .route("/ai-providers", get(providers::list))
        .route("/ai-providers/:id/api-key", put(providers::set_api_key))
        .route("/ai-providers/:id/test", post(providers::test_connection))
        // Content generation
        .route("/content-generation/generate", post(generation::generate))
        .route(
            "/content-generation/history",
            get(generation::history).delete(generation::clear_history),
        )
        .route(
            "/content-generation/history/:id",
            delete(generation::delete_history_entry),
        )
        // Webhooks
        .route("/webhooks/make", post(webhooks::make))
        .route("/webhooks/n8n", post(webhooks::n8n))
        .route("/webhooks/crypto/:source", post(webhooks::crypto))
        .route("/webhooks/telegram", post(webhooks::telegram))
        .route("/webhooks/ia-trigger", post(webhooks::ia_trigger))
        .route("/webhooks/logs", get(webhooks::logs))
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use crate::auth::password;
    use crate::config::AuthConfig;
    use crate::db::pool::test_pool;
    use crate::db::schema::UserRecord;
    use crate::db::users as user_queries;
    use crate::pipeline::simulator::FixedExecution;
    use crate::pipeline::synthesizer::TemplateProviderClient;
    use crate::pipeline::translator::KeywordTranslator;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use serde_json::Value;
    use tower::ServiceExt;

    /// State over an in-memory database with deterministic capability doubles
    pub async fn test_state() -> AppState {
        test_state_with_client(Arc::new(TemplateProviderClient::new(Duration::ZERO))).await
    }

    pub async fn test_state_with_client(provider_client: Arc<dyn ProviderClient>) -> AppState {
        AppState {
            pool: test_pool().await,
            jwt: Arc::new(JwtManager::new(&AuthConfig::default()).unwrap()),
            provider_client,
            simulator: Arc::new(FixedExecution {
                seconds: 2.0,
                success_delta: 0.5,
            }),
            translator: Arc::new(KeywordTranslator),
            generation_timeout: Duration::from_secs(5),
        }
    }

    /// Create a user with the given role and return a valid bearer token
    pub async fn token_for(state: &AppState, username: &str, role: &str) -> String {
        let user = UserRecord {
            id: format!("{}-id", username),
            username: username.to_string(),
            email: format!("{}@contentgen.local", username),
            name: username.to_string(),
            role: role.to_string(),
            password_hash: password::hash_password("test-password").unwrap(),
            avatar: None,
            status: "active".to_string(),
            created_at: Utc::now(),
            last_login: None,
        };
        user_queries::insert(&state.pool, &user).await.unwrap();
        state.jwt.generate(&user).unwrap()
    }

    /// Fire one request at the router and decode the JSON response
    pub async fn send(
        app: Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }
}
