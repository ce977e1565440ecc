use contentgen::{
    api::{create_router, AppState},
    auth::JwtManager,
    config::Config,
    db::{create_pool, init_schema, seed},
    observability::init_tracing,
    pipeline::{
        simulator::SimulatedExecution, synthesizer::TemplateProviderClient,
        translator::KeywordTranslator,
    },
    retention::RetentionJob,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    // Initialize tracing/logging
    init_tracing(&config.observability);

    tracing::info!("Starting ContentGen automation backend");

    // Create database connection pool and bootstrap the schema
    let db_pool = create_pool(&config.database).await?;
    init_schema(&db_pool).await?;
    tracing::info!("Database ready");

    // Seed the provider catalogue and bootstrap users
    seed::run(&db_pool, &config.seed).await?;

    // Schedule the daily retention pass
    RetentionJob::new(db_pool.clone(), config.retention.clone()).spawn();

    // Assemble application state
    let latency = Duration::from_millis(config.generation.simulated_latency_ms);
    let state = AppState {
        pool: db_pool,
        jwt: Arc::new(JwtManager::new(&config.auth)?),
        provider_client: Arc::new(TemplateProviderClient::new(latency)),
        simulator: Arc::new(SimulatedExecution::new(latency)),
        translator: Arc::new(KeywordTranslator),
        generation_timeout: Duration::from_secs(config.generation.timeout_seconds),
    };

    // Create router
    let app = create_router(state);

    // Bind server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("ContentGen backend is ready to accept requests");

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
