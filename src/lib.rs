pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod quiz;
pub mod services;
pub mod state;
