//! Loading of the `application.toml` settings

pub mod config;
