use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use cork_api::auth::{self, AppState, AppStateInner};
use cork_api::middleware::require_auth;
use cork_api::{activity, boards, cards, comments, lists};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cork=debug,cork_api=debug,cork_db=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("CORK_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("CORK_DB_PATH").unwrap_or_else(|_| "cork.db".into());
    let host = std::env::var("CORK_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("CORK_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = cork_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner { db, jwt_secret });

    // Routes
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/boards", get(boards::find_all))
        .route("/api/boards", post(boards::create))
        .route("/api/boards/{board_id}", get(boards::find_by_id))
        .route("/api/boards/{board_id}", put(boards::update))
        .route("/api/boards/{board_id}", delete(boards::drop))
        .route("/api/boards/{board_id}/lists", post(boards::create_list))
        .route("/api/boards/{board_id}/archive", post(boards::archive))
        .route("/api/boards/{board_id}/star", post(boards::star))
        .route("/api/lists/{list_id}", put(lists::update))
        .route("/api/lists/{list_id}", delete(lists::drop))
        .route("/api/lists/{list_id}/cards", post(lists::create_card))
        .route("/api/cards/move", post(cards::move_card))
        .route("/api/cards/{card_id}", get(cards::find_by_id))
        .route("/api/cards/{card_id}", put(cards::update))
        .route("/api/cards/{card_id}", delete(cards::drop))
        .route("/api/cards/{card_id}/addColor", post(cards::add_color))
        .route("/api/cards/{card_id}/removeColor", post(cards::remove_color))
        .route("/api/cards/{card_id}/comments", post(comments::create))
        .route("/api/activity", get(activity::recent))
        .layer(middleware::from_fn(require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Cork server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
