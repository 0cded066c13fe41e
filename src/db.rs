use sqlx::postgres::PgPoolOptions;

pub type Pool = sqlx::PgPool;

/// Open the connection pool, connections are handed out per request
pub async fn build_connection_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<Pool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Create the tables when they don't exist yet
pub async fn migrate(pool: &Pool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
lazy_static! {
    static ref MIGRATED: futures::lock::Mutex<bool> = futures::lock::Mutex::new(false);
}

/// Connect to the database pointed at by `DATABASE_URL` for tests that need a store.
///
/// Those tests are `#[ignore]`d, run them with `cargo test -- --ignored` against a
/// scratch database.
#[cfg(test)]
pub async fn test_pool() -> Pool {
    dotenv::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set to run the store tests");
    let pool = build_connection_pool(&database_url, 2)
        .await
        .expect("unable to connect to the test database");

    let mut migrated = MIGRATED.lock().await;
    if !*migrated {
        migrate(&pool).await.expect("unable to migrate the test database");
        *migrated = true;
    }

    pool
}
