pub mod config;
pub mod error;
pub mod types;

pub use config::SeoforgeConfig;
pub use error::{Result, SeoforgeError};
pub use types::*;
