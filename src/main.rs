//! Keeps score of the coffee game: who played, who paid and who fetched the coffee.
#![warn(missing_debug_implementations, rust_2018_idioms)]

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate log;

#[macro_use]
extern crate serde_derive;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;

use anyhow::{Context, Error};
use dotenv::dotenv;

#[macro_use]
mod macros;

mod config;
mod db;
mod draw;
mod errors;
mod games;
mod metrics;
mod players;
mod server;
mod stats;
mod validator;

use config::Config;

#[actix_web::main]
async fn main() -> anyhow::Result<(), Error> {
    init().await?;

    Ok(())
}

async fn init() -> anyhow::Result<(), Error> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .context("unable to initialize the tracing subscriber")?;

    Config::init();

    debug!("connecting to the database");
    let pool = db::build_connection_pool(Config::database_url(), Config::database_max_connections())
        .await
        .context("unable to connect to the database")?;

    db::migrate(&pool)
        .await
        .context("unable to run the database migrations")?;

    let mut conn = pool.acquire().await?;
    let seeded = players::seed::roster(&mut conn)
        .await
        .context("unable to seed the players")?;
    let player_count = players::Player::count(&mut conn).await?;
    let game_count = games::Game::count(&mut conn).await?;
    drop(conn);
    info!(
        "seeded {} new players, {} players and {} games on record",
        seeded, player_count, game_count
    );

    debug!("launching the actix webserver");
    server::launch(pool).await?;

    Ok(())
}
