use std::sync::Arc;

use anyhow::Context;
use auth::AuthOrchestrator;
use auth::RedisRevocationStore;
use identity_service::config::Config;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::directory::RepositoryUserDirectory;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    // Invalid token settings are fatal before anything is opened.
    let auth_settings = config
        .auth_settings()
        .context("Invalid token configuration")?;

    tracing::info!(
        http_port = config.server.http_port,
        access_token_ttl_secs = config.jwt.access_token_ttl_secs,
        refresh_token_ttl_secs = config.jwt.refresh_token_ttl_secs,
        revocation_timeout_ms = config.revocation.timeout_ms,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let revocation_store = Arc::new(
        RedisRevocationStore::connect(&config.revocation.redis_url)
            .await
            .context("Failed to connect to revocation store")?,
    );

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let user_directory = Arc::new(RepositoryUserDirectory::new(Arc::clone(&user_repository)));

    let user_service = Arc::new(UserService::new(user_repository));
    let auth_service = Arc::new(AuthOrchestrator::new(
        &auth_settings,
        user_directory,
        revocation_store,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, auth_service);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
