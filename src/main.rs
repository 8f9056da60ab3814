use crate::config::Config;
use crate::hub::Hub;
use crate::identity::ProfileDirectory;
use crate::session::SessionManager;
use crate::store::{GameStore, SledStore};
use crate::ws::{accept_connection, Context};
use anyhow::Context as _;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use tokio::net::TcpListener;

mod api;
mod client;
mod config;
mod error;
mod game;
mod hub;
mod identity;
mod pg;
mod session;
mod store;
mod ws;

// FIXME: Implement TLS support

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::try_init().ok();

    let config = Config::from_env()?;

    let db = sled::open(&config.db_path).with_context(|| format!("could not open {:?}", config.db_path))?;
    let store = SledStore::open(db)?;
    log::info!("Loaded {} stored games", store.count());

    if let Some(pg) = config.postgres.clone() {
        tokio::spawn(pg::sync_game_summaries(pg, store.archive_tree()));
    }

    let hub = Arc::new(Hub::default());
    let profiles = Arc::new(ProfileDirectory::default());
    let ctx: &'static Context = Box::leak(Box::new(Context {
        sessions: SessionManager::new(Arc::new(store), profiles.clone(), hub.clone()),
        hub,
        profiles,
    }));

    if let Some(port) = config.api_port {
        tokio::spawn(async move {
            if let Err(err) = api::serve(&ctx.sessions, port).await {
                log::error!("HTTP API stopped: {}", err);
            }
        });
    }

    let addr = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), config.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind to address: {:?}", addr))?;
    log::info!("Listening on: {:?}", addr);

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(accept_connection(stream, ctx));
    }
    Ok(())
}
