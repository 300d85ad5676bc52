pub mod aggregate;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod geocode;
pub mod handlers;
pub mod middleware;
pub mod query;
