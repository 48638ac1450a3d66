mod auth;
pub mod dto;
mod people;
mod permissions;
pub mod response;
mod router;
mod schedule;
mod shifts;
mod teams;

pub use router::{AppState, create_router};
