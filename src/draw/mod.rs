pub mod routes;

use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::PgConnection;

use crate::errors::ServiceError;
use crate::players::Player;
use crate::validator::Validate;

/// **POST /api/draw**
///
/// Picks who has to pay or fetch among the players of the current game.
///
/// ``` shell
/// curl --location --request POST 'localhost:8080/api/draw' \
///     --header 'Content-Type: application/json' \
///     --data-raw '{ "players": [1, 4, 7] }'
/// ```
#[derive(Debug, Deserialize)]
pub struct DrawRequest {
    #[serde(default)]
    pub players: Vec<i64>,
}

/// A validated DrawRequest
#[derive(Debug, PartialEq)]
pub struct Draw {
    players: Vec<i64>,
}

impl Validate for DrawRequest {
    type Output = Draw;

    fn validate(self) -> Result<Draw, ServiceError> {
        if self.players.is_empty() {
            bad_request!("no players selected");
        }

        let mut players = self.players;
        players.sort_unstable();
        players.dedup();

        Ok(Draw { players })
    }
}

impl Draw {
    /// Draw one of the players, every player has the same odds
    #[tracing::instrument(name = "Draw::run", skip(conn, rng))]
    pub async fn run<R: Rng>(
        &self,
        conn: &mut PgConnection,
        rng: &mut R,
    ) -> Result<Player, ServiceError> {
        let candidates = Player::find_by_ids(&self.players, conn).await?;

        if candidates.len() != self.players.len() {
            let missing: Vec<String> = self
                .players
                .iter()
                .filter(|id| !candidates.iter().any(|player| player.id == **id))
                .map(|id| id.to_string())
                .collect();
            bad_request!(format!("unknown player ids: {}", missing.join(", ")));
        }

        let winner = Draw::pick(&candidates, rng)?;
        debug!("drew {} out of {} players", winner.name, candidates.len());

        Ok(winner)
    }

    fn pick<R: Rng>(candidates: &[Player], rng: &mut R) -> Result<Player, ServiceError> {
        candidates
            .choose(rng)
            .cloned()
            .ok_or_else(|| ServiceError::BadRequest("no players selected".to_string()))
    }
}
