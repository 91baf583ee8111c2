pub mod config;
pub mod errors;
pub mod market;
pub mod models;
pub mod quoter;
