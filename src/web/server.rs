//! Web server bootstrap.

use std::sync::Arc;

use tracing::info;

use super::handlers::AppState;
use super::router::create_router;
use crate::config::Config;
use crate::db::Database;
use crate::file::Bucket;
use crate::Result;

/// Bind the configured address and serve the API until shutdown.
pub async fn serve(config: Config, db: Database, bucket: Bucket) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(db, bucket, config));
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, router).await?;

    Ok(())
}
