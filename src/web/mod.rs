//! HTTP surface: routing, handlers and the response envelope

pub mod response;
pub mod routes;
pub mod scan_api;
pub mod search_api;
pub mod state;
