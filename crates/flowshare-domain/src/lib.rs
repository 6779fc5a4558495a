//! Domain layer for flowshare
//!
//! Models, pure calculations and repository traits. Nothing here touches the
//! filesystem.

pub mod model;
pub mod repository;
pub mod service;
