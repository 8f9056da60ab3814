use crate::session::SessionManager;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;
use std::net::{Ipv4Addr, SocketAddrV4};
use tokio::net::TcpListener;

pub fn make_router(manager: &'static SessionManager) -> Router {
    Router::new()
        .route("/sessions", get(get_sessions))
        .route("/pastgames", get(get_past_games))
        .with_state(manager)
}

/// Serves the HTTP API until the listener fails.
pub async fn serve(manager: &'static SessionManager, port: u16) -> std::io::Result<()> {
    let addr = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), port);
    let listener = TcpListener::bind(addr).await?;
    log::info!("HTTP API listening on: {:?}", addr);
    axum::serve(listener, make_router(manager)).await
}

async fn get_sessions(State(manager): State<&'static SessionManager>) -> Result<Json<impl Serialize>, StatusCode> {
    Ok(Json(json!({
        "num_sessions": manager.num_games()
    })))
}

async fn get_past_games(State(manager): State<&'static SessionManager>) -> Result<Json<impl Serialize>, StatusCode> {
    let games = manager.past_games().await.map_err(|err| {
        log::error!("Could not read past games: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(json!({
        "games": games
    })))
}
