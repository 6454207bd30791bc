//! Contains the models that represent the database entries
//!
//! Also contains the [sea_orm] implementation and intrinsic models
//!
//! [sea_orm]: https://www.sea-ql.org/SeaORM/docs/introduction/orm/

pub mod prelude;

pub mod file;
pub mod file_web;
pub mod probe_result;
pub mod probe_result_file_web;
pub mod scan;
