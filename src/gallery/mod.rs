//! # Gallery Module
//!
//! Photo albums. Uploads are sniffed, shrunk and re-encoded before they
//! are written under the uploads directory; deleting an album removes its
//! images with it.

pub mod compression;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::gallery_routes;
