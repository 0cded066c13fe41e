use std::collections::BTreeSet;

use sqlx::PgConnection;

use crate::errors::ServiceError;
use crate::validator::Validate;

/// maximum length of a player name, counted in characters
const MAX_NAME_LENGTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub id: i64,
    pub name: String,
}

/// **POST /api/players?name=Olivier**
///
/// Registers a new player. The name is trimmed before it is stored and has to
/// be unique, ignoring case.
#[derive(Debug, Deserialize)]
pub struct NewPlayer {
    pub name: String,
}

impl Player {
    /// Insert a player without any checks, callers validate the name first
    #[tracing::instrument(name = "Player::create", skip(conn))]
    pub async fn create(name: &str, conn: &mut PgConnection) -> Result<Player, sqlx::Error> {
        sqlx::query_as::<_, Player>("INSERT INTO players (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&mut *conn)
            .await
    }

    /// sorted by the bytes of the name, `Zed` comes before `amy`
    #[tracing::instrument(name = "Player::find_all", skip(conn))]
    pub async fn find_all(conn: &mut PgConnection) -> Result<Vec<Player>, sqlx::Error> {
        sqlx::query_as::<_, Player>(r#"SELECT id, name FROM players ORDER BY name COLLATE "C", id"#)
            .fetch_all(&mut *conn)
            .await
    }

    /// case insensitive lookup
    #[tracing::instrument(name = "Player::find_by_name", skip(conn))]
    pub async fn find_by_name(
        name: &str,
        conn: &mut PgConnection,
    ) -> Result<Option<Player>, sqlx::Error> {
        sqlx::query_as::<_, Player>("SELECT id, name FROM players WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
    }

    #[tracing::instrument(name = "Player::find_by_ids", skip(conn))]
    pub async fn find_by_ids(
        ids: &[i64],
        conn: &mut PgConnection,
    ) -> Result<Vec<Player>, sqlx::Error> {
        sqlx::query_as::<_, Player>("SELECT id, name FROM players WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&mut *conn)
            .await
    }

    /// Returns the ids, sorted and without duplicates, that don't belong to a player
    pub async fn missing(ids: &[i64], conn: &mut PgConnection) -> Result<Vec<i64>, sqlx::Error> {
        let wanted: BTreeSet<i64> = ids.iter().copied().collect();
        let wanted: Vec<i64> = wanted.into_iter().collect();

        let found: BTreeSet<i64> = Player::find_by_ids(&wanted, conn)
            .await?
            .into_iter()
            .map(|player| player.id)
            .collect();

        Ok(wanted
            .into_iter()
            .filter(|id| !found.contains(id))
            .collect())
    }

    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM players")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}

impl NewPlayer {
    /// Stores the player unless the name is already taken
    pub async fn save(&self, conn: &mut PgConnection) -> Result<Player, ServiceError> {
        if Player::find_by_name(&self.name, conn).await?.is_some() {
            conflict!(format!("player {} already exists", self.name));
        }

        let player = Player::create(&self.name, conn).await?;
        info!("registered player {}", player.name);

        Ok(player)
    }
}

impl Validate for NewPlayer {
    type Output = NewPlayer;

    fn validate(self) -> Result<NewPlayer, ServiceError> {
        let name = self.name.trim();

        if name.is_empty() {
            bad_request!("player name cannot be empty");
        }

        if name.chars().count() > MAX_NAME_LENGTH {
            bad_request!("player name is too long, maximum 40 characters");
        }

        Ok(NewPlayer {
            name: name.to_string(),
        })
    }
}
