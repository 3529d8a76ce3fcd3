pub mod arena;
pub mod config;
pub mod models;
pub mod stats;
pub mod turn_engine;
