use sqlx::{Done, PgConnection};

/// players known before the first game was ever logged
pub const ROSTER: [&str; 11] = [
    "Olivier",
    "Rainier",
    "Sabine",
    "Thibault",
    "Abas",
    "Nicolas",
    "Andrés",
    "Sandrine",
    "Michelle",
    "Philippe",
    "Jeff",
];

/// Insert every roster name that isn't registered yet.
///
/// Returns how many players were added, running it twice adds nothing the second time.
#[tracing::instrument(name = "seed::roster", skip(conn))]
pub async fn roster(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;

    for name in ROSTER.iter() {
        inserted += sqlx::query("INSERT INTO players (name) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(*name)
            .execute(&mut *conn)
            .await?
            .rows_affected();
    }

    Ok(inserted)
}
