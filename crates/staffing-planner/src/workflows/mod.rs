pub mod import;
pub mod staffing;
