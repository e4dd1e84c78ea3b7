//! Utility functions shared across the crate

pub mod logging;
pub mod strings;

pub use logging::init_logging;
pub use strings::camel_case;
