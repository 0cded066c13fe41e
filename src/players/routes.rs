use actix_web::web;
use actix_web::web::{Data, Query};
use actix_web::{get, post};

use crate::players::{NewPlayer, Player};
use crate::server::{Response, State};
use crate::validator::Validator;

#[get("/players")]
async fn find_all(state: Data<State>) -> Response {
    let mut conn = state.db.acquire().await?;

    let players = Player::find_all(&mut conn).await?;

    http_ok_json!(players);
}

#[post("/players")]
async fn create(player: Query<Validator<NewPlayer>>, state: Data<State>) -> Response {
    let player = player.into_inner().validate()?;

    let mut conn = state.db.acquire().await?;

    let player = player.save(&mut conn).await?;

    http_created_json!(player);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    cfg.service(create);
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};

    use crate::db;
    use crate::players::Player;
    use crate::server::{self, State};

    #[actix_rt::test]
    #[ignore]
    async fn create_over_http() {
        let pool = db::test_pool().await;
        let mut app = test::init_service(
            App::new()
                .app_data(web::Data::new(State { db: pool.clone() }))
                .app_data(server::query_config())
                .configure(server::register),
        )
        .await;

        let name = format!("HttpPlayer{}", chrono::Utc::now().timestamp_nanos());

        let req = test::TestRequest::post()
            .uri(&format!("/api/players?name={}", name))
            .to_request();
        let res = test::call_service(&mut app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let player: Player = test::read_body_json(res).await;
        assert_eq!(player.name, name);

        let req = test::TestRequest::post()
            .uri(&format!("/api/players?name={}", name.to_uppercase()))
            .to_request();
        let res = test::call_service(&mut app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let mut conn = pool.acquire().await.unwrap();
        sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(player.id)
            .execute(&mut *conn)
            .await
            .unwrap();
    }
}
