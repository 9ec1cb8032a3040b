pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod favorites;
pub mod genres;
pub mod movies;
pub mod state;
