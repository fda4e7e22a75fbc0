use anyhow::Result;
use axum::{
    Router,
    routing::{get, post},
};
use linkbloom::{
    app_state::AppState,
    blog::handlers::{generate_blog, get_post, regenerate_blog_images},
    config::Config,
    health::health_check,
};
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Create database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(config.database_url())
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState::new(pool, &config);

    let app = Router::new()
        .route("/healthz", get(health_check))
        .route("/generate-blog", post(generate_blog))
        .route("/regenerate-blog-images", post(regenerate_blog_images))
        .route("/blog/{slug}", get(get_post))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("listening on {}", config.bind_addr());
    axum::serve(listener, app).await?;

    Ok(())
}
