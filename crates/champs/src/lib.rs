pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod routes;
pub mod standings;
