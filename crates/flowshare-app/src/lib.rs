//! Application service layer - use cases, config, session, export

pub mod app;
pub mod config;
pub mod export;
pub mod logging;
pub mod repository;
pub mod session;
