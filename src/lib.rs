//! Content-based movie recommendation service.
//!
//! The ranking core lives in [`services::recommender`] and is plain synchronous
//! code over an in-memory [`services::Catalog`]. Everything else (HTTP routes,
//! accounts, caching, metadata lookups) is built around it.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
