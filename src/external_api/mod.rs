pub mod scan_control;
pub mod task_service;
