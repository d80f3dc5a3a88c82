use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use groupbuy_api::mail::LogMailer;
use groupbuy_api::{AppState, AppStateInner, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groupbuy=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let token_secret =
        std::env::var("GROUPBUY_TOKEN_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("GROUPBUY_DB_PATH").unwrap_or_else(|_| "groupbuy.db".into());
    let host = std::env::var("GROUPBUY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("GROUPBUY_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let reset_url_base = std::env::var("GROUPBUY_RESET_URL")
        .unwrap_or_else(|_| format!("http://localhost:{}/reset_password", port));

    // Init database
    let db = groupbuy_db::Database::open(&PathBuf::from(&db_path))?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        token_secret,
        reset_url_base,
        mailer: Box::new(LogMailer),
    });

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("groupbuy server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
