pub mod auth;
pub mod cards;
pub mod config;
pub mod record;
