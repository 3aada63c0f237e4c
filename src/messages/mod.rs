//! # Messages Module
//!
//! Contact form submissions and the admin inbox that reviews them.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::message_routes;
