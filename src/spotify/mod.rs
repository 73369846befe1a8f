//! Spotify Web API client module for playback and personalization

pub mod api;
mod auth;
pub mod catalog;
pub mod models;

pub use api::*;
pub use auth::*;
pub use catalog::*;
pub use models::*;
