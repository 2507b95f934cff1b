// Library for tests to access modules

pub mod aggregator;
pub mod config;
pub mod models;
pub mod render;
pub mod routes;
pub mod scheduler;
pub mod status_repo;
pub mod version;
