use actix_web::get;
use actix_web::web;
use actix_web::web::{Data, Query};

use crate::server::{Response, State};
use crate::stats::StatsReport;

/// ScoreFilter lets the client only fetch the top of the scoreboard
#[derive(Debug, Deserialize)]
pub struct ScoreFilter {
    /// `?limit=3` returns the podium
    pub limit: Option<usize>,
}

#[get("/stats")]
async fn find(state: Data<State>) -> Response {
    let mut conn = state.db.acquire().await?;

    let report = StatsReport::load(&mut conn).await?;

    http_ok_json!(report);
}

#[get("/stats/scores")]
async fn scores(filter: Query<ScoreFilter>, state: Data<State>) -> Response {
    let mut conn = state.db.acquire().await?;

    let mut scores = StatsReport::load(&mut conn).await?.scores();

    if let Some(limit) = filter.limit {
        scores.truncate(limit);
    }

    http_ok_json!(scores);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find);
    cfg.service(scores);
}
