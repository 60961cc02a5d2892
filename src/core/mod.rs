//! Core utilities: configuration, errors, logging, formatting helpers.

pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

pub use error::{AppError, AppResult};
pub use logging::init_logger;
