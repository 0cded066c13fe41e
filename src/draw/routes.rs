use actix_web::post;
use actix_web::web;
use actix_web::web::{Data, Json};

use crate::draw::DrawRequest;
use crate::server::{Response, State};
use crate::validator::Validator;

#[post("/draw")]
async fn draw(request: Json<Validator<DrawRequest>>, state: Data<State>) -> Response {
    let draw = request.into_inner().validate()?;

    let mut conn = state.db.acquire().await?;

    let mut rng = rand::thread_rng();
    let winner = draw.run(&mut conn, &mut rng).await?;

    http_ok_json!(winner);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(draw);
}
