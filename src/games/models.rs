use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use sqlx::{Connection, PgConnection};

use crate::errors::ServiceError;
use crate::players::Player;
use crate::validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Game {
    pub id: i64,
    pub date: NaiveDate,
    pub payer_id: Option<i64>,
    pub fetcher_id: Option<i64>,
}

impl Game {
    /// the same player paid and fetched the coffee
    pub fn is_doublette(&self) -> bool {
        self.payer_id.is_some() && self.payer_id == self.fetcher_id
    }
}

/// A Participation links a player to a game they took part in
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct Participation {
    pub game_id: i64,
    pub player_id: i64,
}

/// **GET /api/games**
///
/// A game with the names of its payer and fetcher and the ids of everyone who played.
#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub id: i64,
    pub date: NaiveDate,
    pub payer_id: Option<i64>,
    pub fetcher_id: Option<i64>,
    pub payer_name: Option<String>,
    pub fetcher_name: Option<String>,
    pub participants: Vec<i64>,
}

#[derive(sqlx::FromRow)]
struct GameRow {
    id: i64,
    date: NaiveDate,
    payer_id: Option<i64>,
    fetcher_id: Option<i64>,
    payer_name: Option<String>,
    fetcher_name: Option<String>,
}

///
/// **POST /api/games**
///
/// Logs a game. `players` are the ids of everyone who played, `payer` and
/// `fetcher` are optional.
///
/// ``` shell
/// curl --location --request POST 'localhost:8080/api/games' \
///     --header 'Content-Type: application/json' \
///     --data-raw '{
///         "date": "2024-03-01",
///         "players": [1, 2, 3],
///         "payer": 1,
///         "fetcher": 2
///     }'
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGame {
    pub date: String,
    #[serde(default)]
    pub players: Vec<i64>,
    pub payer: Option<i64>,
    pub fetcher: Option<i64>,
}

/// A validated CreateGame, ready to be stored
#[derive(Debug, PartialEq)]
pub struct NewGame {
    pub date: NaiveDate,
    /// sorted and without duplicates
    pub players: Vec<i64>,
    pub payer: Option<i64>,
    pub fetcher: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct GameCreated {
    pub ok: bool,
    pub game_id: i64,
}

impl Game {
    #[tracing::instrument(name = "Game::find_all", skip(conn))]
    pub async fn find_all(conn: &mut PgConnection) -> Result<Vec<GameResponse>, sqlx::Error> {
        let rows = sqlx::query_as::<_, GameRow>(
            "SELECT g.id, g.date, g.payer_id, g.fetcher_id,
                    payer.name AS payer_name, fetcher.name AS fetcher_name
             FROM games g
             LEFT JOIN players payer ON payer.id = g.payer_id
             LEFT JOIN players fetcher ON fetcher.id = g.fetcher_id
             ORDER BY g.date DESC, g.id DESC",
        )
        .fetch_all(&mut *conn)
        .await?;

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut participants = Participation::group_by_game(
            Participation::find_by_games(&ids, conn).await?,
        );

        let games = rows
            .into_iter()
            .map(|row| GameResponse {
                participants: participants.remove(&row.id).unwrap_or_default(),
                id: row.id,
                date: row.date,
                payer_id: row.payer_id,
                fetcher_id: row.fetcher_id,
                payer_name: row.payer_name,
                fetcher_name: row.fetcher_name,
            })
            .collect();

        Ok(games)
    }

    /// every game without names, used to compute statistics
    pub async fn load(conn: &mut PgConnection) -> Result<Vec<Game>, sqlx::Error> {
        sqlx::query_as::<_, Game>("SELECT id, date, payer_id, fetcher_id FROM games ORDER BY id")
            .fetch_all(&mut *conn)
            .await
    }

    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM games")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}

impl Participation {
    pub async fn find_all(conn: &mut PgConnection) -> Result<Vec<Participation>, sqlx::Error> {
        sqlx::query_as::<_, Participation>(
            "SELECT game_id, player_id FROM game_players ORDER BY game_id, player_id",
        )
        .fetch_all(&mut *conn)
        .await
    }

    pub async fn find_by_games(
        game_ids: &[i64],
        conn: &mut PgConnection,
    ) -> Result<Vec<Participation>, sqlx::Error> {
        sqlx::query_as::<_, Participation>(
            "SELECT game_id, player_id FROM game_players
             WHERE game_id = ANY($1)
             ORDER BY game_id, player_id",
        )
        .bind(game_ids)
        .fetch_all(&mut *conn)
        .await
    }

    /// player ids per game, keeping the order of the input
    pub fn group_by_game(participations: Vec<Participation>) -> HashMap<i64, Vec<i64>> {
        let mut grouped: HashMap<i64, Vec<i64>> = HashMap::new();
        for participation in participations {
            grouped
                .entry(participation.game_id)
                .or_default()
                .push(participation.player_id);
        }
        grouped
    }
}

impl NewGame {
    /// every player id this game points to, participants, payer and fetcher
    pub fn referenced_players(&self) -> Vec<i64> {
        let mut ids = self.players.clone();
        ids.extend(self.payer);
        ids.extend(self.fetcher);
        ids
    }

    /// Saves the game and its participations in a single transaction.
    ///
    /// When one of the referenced players doesn't exist nothing is written.
    pub async fn save(&self, conn: &mut PgConnection) -> Result<Game, ServiceError> {
        let missing = Player::missing(&self.referenced_players(), conn).await?;
        if !missing.is_empty() {
            let ids: Vec<String> = missing.iter().map(|id| id.to_string()).collect();
            bad_request!(format!("unknown player ids: {}", ids.join(", ")));
        }

        let game = self.insert(conn).await?;
        info!(
            "logged game {} on {} with {} players",
            game.id,
            game.date,
            self.players.len()
        );

        Ok(game)
    }

    /// the game row and every participation, or nothing at all
    async fn insert(&self, conn: &mut PgConnection) -> Result<Game, sqlx::Error> {
        let mut tx = conn.begin().await?;

        let game = sqlx::query_as::<_, Game>(
            "INSERT INTO games (date, payer_id, fetcher_id) VALUES ($1, $2, $3)
             RETURNING id, date, payer_id, fetcher_id",
        )
        .bind(self.date)
        .bind(self.payer)
        .bind(self.fetcher)
        .fetch_one(&mut tx)
        .await?;

        for player_id in &self.players {
            sqlx::query("INSERT INTO game_players (game_id, player_id) VALUES ($1, $2)")
                .bind(game.id)
                .bind(*player_id)
                .execute(&mut tx)
                .await?;
        }

        tx.commit().await?;

        Ok(game)
    }
}

/// Only `YYYY-MM-DD` is accepted, chrono alone would also take `2024-3-1` or `+2024-03-01`
fn parse_date(date: &str) -> Result<NaiveDate, ServiceError> {
    let invalid = || ServiceError::BadRequest("invalid date, expected YYYY-MM-DD".to_string());

    let bytes = date.as_bytes();
    if bytes.len() != 10 {
        return Err(invalid());
    }
    let well_formed = bytes.iter().enumerate().all(|(i, byte)| match i {
        4 | 7 => *byte == b'-',
        _ => byte.is_ascii_digit(),
    });
    if !well_formed {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())
}

impl Validate for CreateGame {
    type Output = NewGame;

    fn validate(self) -> Result<NewGame, ServiceError> {
        let date = parse_date(self.date.trim())?;

        if self.players.is_empty() {
            bad_request!("no players selected");
        }

        let players: BTreeSet<i64> = self.players.into_iter().collect();

        Ok(NewGame {
            date,
            players: players.into_iter().collect(),
            payer: self.payer,
            fetcher: self.fetcher,
        })
    }
}
