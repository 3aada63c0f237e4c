//! # Church Module
//!
//! Church details shown across the site and the weekly service schedule.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::church_routes;
