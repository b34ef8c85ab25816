//! # Boost Market server
//! This crate hosts the HTTP front end of the Boost Market. It is responsible for:
//! * Authenticating callers with the HS256 access tokens issued by the identity provider.
//! * Translating requests into calls on the `boost_engine` APIs.
//! * Mapping engine errors onto HTTP status codes.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/games/...`, `/api/ranks/...`, `/api/service_types`: the public catalog.
//! * `/api/orders/...`: pricing, placing and tracking orders.
//! * `/api/boosters/...`: booster discovery and profile management.
//! * `/api/profile`, `/api/dashboard`: the caller's own account.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
