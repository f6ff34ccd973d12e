pub mod cli;
pub mod commands;
pub mod error;
pub mod platform;
pub mod recommend;
pub mod scan;
pub mod stress;

pub use error::{Error, Result};
