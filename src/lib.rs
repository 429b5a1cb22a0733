// Library exports for feedboard
// This allows integration tests and external code to use feedboard modules

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod feedback;
pub mod graphql;
pub mod routes;
pub mod state;
