//! Wrapper for the models

pub use super::file::Entity as File;
pub use super::file_web::Entity as FileWeb;
pub use super::probe_result::Entity as ProbeResult;
pub use super::probe_result_file_web::Entity as ProbeResultFileWeb;
pub use super::scan::Entity as Scan;
