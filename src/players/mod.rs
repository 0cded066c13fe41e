mod models;
pub mod routes;
pub mod seed;

pub use models::{NewPlayer, Player};
