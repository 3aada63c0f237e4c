//! # Events Module
//!
//! Church calendar: public listing of active events and admin CRUD.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::event_routes;
