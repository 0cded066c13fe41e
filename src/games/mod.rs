mod models;
pub mod routes;

pub use models::{CreateGame, Game, GameCreated, Participation};
