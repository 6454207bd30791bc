//! Persistence of scans, files and probe results

pub mod connection;
pub mod models;
pub mod service;
pub mod service_trait;
pub mod unit_of_work;
