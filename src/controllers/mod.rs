pub mod formatter;
pub mod scan_controller;
pub mod search_controller;
