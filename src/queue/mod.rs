pub mod queue_service;
