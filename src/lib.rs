pub mod calendar;
pub mod config;
pub mod error;
pub mod fetch;
pub mod process;
pub mod server;

pub use error::{HolidayError, Result};
