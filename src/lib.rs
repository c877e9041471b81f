pub mod auth;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod gateway;
pub mod guard;
pub mod models;
pub mod session;
