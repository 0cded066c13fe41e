use actix_web::{error::ResponseError, HttpResponse};
use derive_more::Display;
use std::convert::From;

/// postgres error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Display, PartialEq)]
pub enum ServiceError {
    #[display(fmt = "Internal Server Error")]
    InternalServerError,

    #[display(fmt = "BadRequest: {}", _0)]
    BadRequest(String),

    #[display(fmt = "Conflict: {}", _0)]
    Conflict(String),

    #[display(fmt = "Not Found")]
    NotFound,
}

// impl ResponseError trait allows to convert our errors into http responses with appropriate data
impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::InternalServerError => {
                HttpResponse::InternalServerError().json("Internal Server Error, Please try later")
            }
            ServiceError::BadRequest(ref message) => HttpResponse::BadRequest().json(message),
            ServiceError::NotFound => HttpResponse::NotFound().json("Not Found"),
            ServiceError::Conflict(ref message) => HttpResponse::Conflict().json(message),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(error: sqlx::Error) -> ServiceError {
        match error {
            sqlx::Error::RowNotFound => {
                debug!("db error: row not found");
                ServiceError::NotFound
            }
            sqlx::Error::Database(err) => {
                if err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                    debug!("db error: {}", err);
                    return ServiceError::Conflict(err.message().to_string());
                }
                error!("db error: {}", err);
                ServiceError::InternalServerError
            }
            error => {
                error!("db error: {}", error);
                ServiceError::InternalServerError
            }
        }
    }
}
