use std::path::PathBuf;

use actix_cors::Cors;
use actix_files as fs;
use actix_web::middleware::normalize::TrailingSlash;
use actix_web::{get, middleware, web, App, HttpRequest, HttpResponse, HttpServer};

use crate::config::Config;
use crate::db;
use crate::draw;
use crate::errors::ServiceError;
use crate::games;
use crate::metrics;
use crate::players;
use crate::stats;

pub type Response = Result<HttpResponse, ServiceError>;

/// shared by every worker, each request acquires its own connection from `db`
#[derive(Debug)]
pub struct State {
    pub db: db::Pool,
}

#[get("/health")]
async fn health(_: HttpRequest) -> &'static str {
    "ok"
}

/// answers `/` when the frontend bundle hasn't been built
async fn placeholder() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Frontend not built yet" }))
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(players::routes::register)
            .configure(games::routes::register)
            .configure(stats::routes::register)
            .configure(draw::routes::register)
            .service(metrics::route)
            .service(health),
    );
}

pub(crate) fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(262_144)
        .error_handler(|err, _| ServiceError::BadRequest(err.to_string()).into())
}

pub(crate) fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _| ServiceError::BadRequest(err.to_string()).into())
}

pub async fn launch(db: db::Pool) -> std::io::Result<()> {
    let state = web::Data::new(State { db });
    let metrics = web::Data::new(metrics::Metrics::new());

    let frontend = PathBuf::from(Config::frontend_dir());
    let serve_frontend = frontend.is_dir();
    if !serve_frontend {
        warn!("frontend directory {} not found", frontend.display());
    }

    let address = format!("{}:{}", Config::api_host(), Config::api_port());
    info!("listening on {}", address);

    HttpServer::new(move || {
        let app = App::new()
            .app_data(state.clone())
            .app_data(metrics.clone())
            .app_data(json_config())
            .app_data(query_config())
            .wrap(middleware::DefaultHeaders::new().header("X-Version", env!("CARGO_PKG_VERSION")))
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::new(TrailingSlash::Trim))
            .wrap(metrics::Middleware::default())
            .wrap(Cors::permissive())
            .configure(register);

        if serve_frontend {
            app.service(fs::Files::new("/", frontend.clone()).index_file("index.html"))
        } else {
            app.route("/", web::get().to(placeholder))
        }
    })
    .bind(address)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn health_with_trailing_slash() {
        let mut app = test::init_service(
            App::new()
                .wrap(middleware::NormalizePath::new(TrailingSlash::Trim))
                .configure(register),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health/").to_request();
        let body = test::read_response(&mut app, req).await;

        assert_eq!(body, web::Bytes::from_static(b"ok"));
    }

    #[actix_rt::test]
    async fn placeholder_without_frontend() {
        let mut app =
            test::init_service(App::new().route("/", web::get().to(placeholder))).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let res = test::call_service(&mut app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn player_name_is_required() {
        let mut app = test::init_service(
            App::new()
                .app_data(query_config())
                .configure(register),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/players").to_request();
        let res = test::call_service(&mut app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
