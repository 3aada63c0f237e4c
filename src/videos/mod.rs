//! # Videos Module
//!
//! Sermon and worship recordings hosted on YouTube.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;
pub mod youtube;

#[cfg(test)]
mod tests;

pub use routes::video_routes;
