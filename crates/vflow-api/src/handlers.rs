//! Request handlers.

pub mod engagement;
pub mod health;
pub mod upload;
pub mod videos;
