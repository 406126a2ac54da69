//! Storefront HTTP server

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use storefront::publisher::{EventPublisher, NatsPublisher, NoopPublisher};
use storefront::{api, telemetry, Config, Storefront};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();
    let config = Config::from_env()?;

    let db = PgPoolOptions::new().max_connections(config.max_connections).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let publisher: Arc<dyn EventPublisher> = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Arc::new(NatsPublisher::new(client)),
            Err(error) => {
                tracing::warn!(%error, "could not connect to NATS, events will not be published");
                Arc::new(NoopPublisher)
            }
        },
        None => Arc::new(NoopPublisher),
    };

    let storefront = Storefront::postgres(db, config.cart_backend, publisher);
    let app = api::router(storefront);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(cart_backend = ?config.cart_backend, "storefront listening on {addr}");
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
