use std::collections::{BTreeMap, HashMap};

use sqlx::PgConnection;

use crate::games::{Game, Participation};
use crate::players::Player;

/// **GET /api/stats**
///
/// Every list holds `[name, count]` pairs, most frequent first and ties sorted
/// by name. Players who never did something don't appear in that list.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct StatsReport {
    pub total_games: i64,
    pub total_doublettes: i64,
    pub payers: Vec<(String, i64)>,
    pub fetchers: Vec<(String, i64)>,
    pub participations: Vec<(String, i64)>,
    pub doublettes_by_player: Vec<(String, i64)>,
}

/// A line on the scoreboard, everyone who played, paid or fetched at least once
#[derive(Debug, PartialEq, Serialize)]
pub struct Score {
    pub name: String,
    pub paid: i64,
    pub fetched: i64,
    pub score: i64,
}

#[derive(Default)]
struct Tally(HashMap<i64, i64>);

impl Tally {
    fn add(&mut self, player_id: i64) {
        *self.0.entry(player_id).or_insert(0) += 1;
    }

    /// resolve the ids to names, unknown ids are skipped
    fn named(self, names: &HashMap<i64, &str>) -> Vec<(String, i64)> {
        let mut counts: Vec<(String, i64)> = self
            .0
            .into_iter()
            .filter_map(|(id, count)| names.get(&id).map(|name| (name.to_string(), count)))
            .collect();

        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

impl StatsReport {
    /// Compute the statistics over the whole history
    pub fn compute(
        players: &[Player],
        games: &[Game],
        participations: &[Participation],
    ) -> StatsReport {
        let names: HashMap<i64, &str> = players
            .iter()
            .map(|player| (player.id, player.name.as_str()))
            .collect();

        let mut payers = Tally::default();
        let mut fetchers = Tally::default();
        let mut doublettes = Tally::default();
        let mut played = Tally::default();

        for game in games {
            if let Some(payer) = game.payer_id {
                payers.add(payer);
                if game.is_doublette() {
                    doublettes.add(payer);
                }
            }
            if let Some(fetcher) = game.fetcher_id {
                fetchers.add(fetcher);
            }
        }

        for participation in participations {
            played.add(participation.player_id);
        }

        StatsReport {
            total_games: games.len() as i64,
            total_doublettes: games.iter().filter(|game| game.is_doublette()).count() as i64,
            payers: payers.named(&names),
            fetchers: fetchers.named(&names),
            participations: played.named(&names),
            doublettes_by_player: doublettes.named(&names),
        }
    }

    #[tracing::instrument(name = "StatsReport::load", skip(conn))]
    pub async fn load(conn: &mut PgConnection) -> Result<StatsReport, sqlx::Error> {
        let players = Player::find_all(conn).await?;
        let games = Game::load(conn).await?;
        let participations = Participation::find_all(conn).await?;

        Ok(StatsReport::compute(&players, &games, &participations))
    }

    /// paid + fetched per player, highest score first. Players who only took
    /// part score 0.
    pub fn scores(&self) -> Vec<Score> {
        let mut totals: BTreeMap<&str, (i64, i64)> = BTreeMap::new();

        for (name, _) in &self.participations {
            totals.entry(name.as_str()).or_default();
        }

        for (name, count) in &self.payers {
            totals.entry(name.as_str()).or_default().0 += count;
        }
        for (name, count) in &self.fetchers {
            totals.entry(name.as_str()).or_default().1 += count;
        }

        let mut scores: Vec<Score> = totals
            .into_iter()
            .map(|(name, (paid, fetched))| Score {
                name: name.to_string(),
                paid,
                fetched,
                score: paid + fetched,
            })
            .collect();

        // the BTreeMap already sorted by name, a stable sort keeps that for ties
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::games::CreateGame;
    use crate::validator::Validator;
    use chrono::NaiveDate;

    fn player(id: i64, name: &str) -> Player {
        Player {
            id,
            name: name.to_string(),
        }
    }

    fn game(id: i64, payer_id: Option<i64>, fetcher_id: Option<i64>) -> Game {
        Game {
            id,
            date: NaiveDate::from_ymd(2024, 3, id as u32),
            payer_id,
            fetcher_id,
        }
    }

    fn played(game_id: i64, players: &[i64]) -> Vec<Participation> {
        players
            .iter()
            .map(|&player_id| Participation { game_id, player_id })
            .collect()
    }

    fn history() -> (Vec<Player>, Vec<Game>, Vec<Participation>) {
        let players = vec![
            player(1, "Olivier"),
            player(2, "Sabine"),
            player(3, "Abas"),
            player(4, "Jeff"),
        ];

        let games = vec![
            game(1, Some(1), Some(1)),
            game(2, Some(2), Some(3)),
            game(3, None, None),
            game(4, Some(1), Some(2)),
            game(5, Some(3), Some(3)),
        ];

        let mut participations = played(1, &[1, 2]);
        participations.extend(played(2, &[1, 2, 3]));
        participations.extend(played(3, &[2]));
        participations.extend(played(4, &[1, 2, 3]));
        participations.extend(played(5, &[3]));

        (players, games, participations)
    }

    #[test]
    fn empty_history() {
        assert_eq!(StatsReport::compute(&[], &[], &[]), StatsReport::default());
    }

    #[test]
    fn totals() {
        let (players, games, participations) = history();

        let report = StatsReport::compute(&players, &games, &participations);

        assert_eq!(report.total_games, 5);
        assert_eq!(report.total_doublettes, 2);
    }

    #[test]
    fn counts_per_player() {
        let (players, games, participations) = history();

        let report = StatsReport::compute(&players, &games, &participations);

        assert_eq!(
            report.payers,
            vec![
                ("Olivier".to_string(), 2),
                ("Abas".to_string(), 1),
                ("Sabine".to_string(), 1),
            ]
        );
        assert_eq!(
            report.fetchers,
            vec![
                ("Abas".to_string(), 2),
                ("Olivier".to_string(), 1),
                ("Sabine".to_string(), 1),
            ]
        );
        assert_eq!(
            report.participations,
            vec![
                ("Sabine".to_string(), 4),
                ("Abas".to_string(), 3),
                ("Olivier".to_string(), 3),
            ]
        );
        assert_eq!(
            report.doublettes_by_player,
            vec![("Abas".to_string(), 1), ("Olivier".to_string(), 1)]
        );
    }

    #[test]
    fn players_without_games_are_omitted() {
        let (players, games, participations) = history();

        let report = StatsReport::compute(&players, &games, &participations);

        let lists = vec![
            &report.payers,
            &report.fetchers,
            &report.participations,
            &report.doublettes_by_player,
        ];
        for list in lists {
            assert!(list.iter().all(|(name, count)| name != "Jeff" && *count > 0));
        }
    }

    #[test]
    fn participations_add_up() {
        let (players, games, participations) = history();

        let report = StatsReport::compute(&players, &games, &participations);

        let counted: i64 = report.participations.iter().map(|(_, count)| count).sum();
        let grouped = Participation::group_by_game(participations);
        let listed: usize = grouped.values().map(|players| players.len()).sum();

        assert_eq!(counted, listed as i64);
    }

    #[test]
    fn scoreboard() {
        let (players, games, participations) = history();

        let scores = StatsReport::compute(&players, &games, &participations).scores();

        assert_eq!(
            scores,
            vec![
                Score {
                    name: "Abas".to_string(),
                    paid: 1,
                    fetched: 2,
                    score: 3,
                },
                Score {
                    name: "Olivier".to_string(),
                    paid: 2,
                    fetched: 1,
                    score: 3,
                },
                Score {
                    name: "Sabine".to_string(),
                    paid: 1,
                    fetched: 1,
                    score: 2,
                },
            ]
        );
    }

    #[test]
    fn participants_score_zero() {
        let players = vec![player(1, "Olivier"), player(2, "Jeff"), player(3, "Abas")];
        let games = vec![game(1, Some(1), Some(1))];
        let participations = played(1, &[1, 2]);

        let scores = StatsReport::compute(&players, &games, &participations).scores();

        assert_eq!(
            scores,
            vec![
                Score {
                    name: "Olivier".to_string(),
                    paid: 1,
                    fetched: 1,
                    score: 2,
                },
                Score {
                    name: "Jeff".to_string(),
                    paid: 0,
                    fetched: 0,
                    score: 0,
                },
            ]
        );
    }

    #[test]
    fn report_json() {
        let report = StatsReport {
            total_games: 1,
            total_doublettes: 1,
            payers: vec![("Olivier".to_string(), 1)],
            ..StatsReport::default()
        };

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["payers"], serde_json::json!([["Olivier", 1]]));
        assert_eq!(json["doublettes_by_player"], serde_json::json!([]));
    }

    #[actix_rt::test]
    #[ignore]
    async fn doublette_is_counted_once() {
        let pool = db::test_pool().await;
        let mut tx = pool.begin().await.unwrap();

        let payer = Player::create("Doublette Payer Test", &mut tx).await.unwrap();
        let other = Player::create("Doublette Other Test", &mut tx).await.unwrap();

        let before = StatsReport::load(&mut tx).await.unwrap();

        Validator::new(CreateGame {
            date: "2024-03-01".to_string(),
            players: vec![payer.id, other.id],
            payer: Some(payer.id),
            fetcher: Some(payer.id),
        })
        .validate()
        .unwrap()
        .save(&mut tx)
        .await
        .unwrap();

        let after = StatsReport::load(&mut tx).await.unwrap();

        assert_eq!(after.total_games, before.total_games + 1);
        assert_eq!(after.total_doublettes, before.total_doublettes + 1);
        assert!(before
            .doublettes_by_player
            .iter()
            .all(|(name, _)| name != &payer.name));
        assert!(after
            .doublettes_by_player
            .contains(&(payer.name.clone(), 1)));

        let counted: i64 = after.participations.iter().map(|(_, count)| count).sum();
        let listed: usize = Game::find_all(&mut tx)
            .await
            .unwrap()
            .iter()
            .map(|game| game.participants.len())
            .sum();
        assert_eq!(counted, listed as i64);

        tx.rollback().await.unwrap();
    }
}
