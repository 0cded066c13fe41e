use actix_web::web;
use actix_web::web::{Data, Json};
use actix_web::{get, post};

use crate::games::{CreateGame, Game, GameCreated};
use crate::server::{Response, State};
use crate::validator::Validator;

#[get("/games")]
async fn find_all(state: Data<State>) -> Response {
    let mut conn = state.db.acquire().await?;

    let games = Game::find_all(&mut conn).await?;

    http_ok_json!(games);
}

#[post("/games")]
async fn create(game: Json<Validator<CreateGame>>, state: Data<State>) -> Response {
    let game = game.into_inner().validate()?;

    let mut conn = state.db.acquire().await?;

    let game = game.save(&mut conn).await?;

    http_ok_json!(GameCreated {
        ok: true,
        game_id: game.id,
    });
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    cfg.service(create);
}
