use crate::config::PgConfig;
use crate::store::GameSummary;
use sled::IVec;
use std::{error::Error, time::Duration};
use tokio_postgres::{types::ToSql, Client, NoTls, Statement};

/// Copies archived game summaries into PostgreSQL, following the archive as it grows.
///
/// Rows are keyed by their archive id, so restarting from the beginning is harmless.
pub async fn sync_game_summaries(config: PgConfig, archive: sled::Tree) {
    let client = match connect_pg(&config).await {
        Ok(client) => client,
        Err(err) => return log::error!("Could not connect to PostgreSQL: {:?}", err),
    };

    let sql = "INSERT INTO game (id, channel, code, started, finished, players, outcome)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT DO NOTHING;";
    let Ok(insert) = client.prepare(sql).await else {
        return log::error!("Could not create prepared statement");
    };

    log::info!("Writing game summaries to PostgreSQL.");
    let mut next_key = 0u64;
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;

        if client.is_closed() {
            log::error!("Connection to PostgreSQL closed.");
            return;
        }

        let Some((key, summary)) = archive
            .range(next_key.to_be_bytes()..)
            .flat_map(|e| e.ok().and_then(read_row))
            .next()
        else {
            continue;
        };

        if let Err(err) = write_row(&client, &insert, key, &summary).await {
            log::error!("Could not write row: {:?}", err);
            continue;
        }

        log::info!("Exported game {} to PostgreSQL", summary.game_id);
        next_key = key + 1;
    }
}

async fn connect_pg(config: &PgConfig) -> Result<Client, Box<dyn Error>> {
    let (client, connection) = tokio_postgres::Config::new()
        .host(&config.host)
        .user(&config.user)
        .password(&config.password)
        .dbname(&config.dbname)
        .connect(NoTls)
        .await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("PostgreSQL connection error: {}", e);
        }
    });

    Ok(client)
}

fn read_row(entry: (IVec, IVec)) -> Option<(u64, GameSummary)> {
    let key = u64::from_be_bytes(entry.0.as_ref().try_into().ok()?);
    let summary = serde_json::from_slice::<GameSummary>(&entry.1).ok()?;
    Some((key, summary))
}

async fn write_row(client: &Client, stmt: &Statement, key: u64, summary: &GameSummary) -> Result<(), Box<dyn Error>> {
    let id = key as i64;
    let outcome = summary.outcome.to_string();
    let args: [&(dyn ToSql + Sync); 7] = [
        &id,
        &summary.channel.as_str(),
        &summary.game_id.as_str(),
        &summary.started,
        &summary.finished,
        &summary.players,
        &outcome,
    ];
    client.execute(stmt, &args).await?;
    Ok(())
}
