pub mod config;
pub mod error;
pub mod types;

pub use config::{DeployConfig, parse_deploy_toml};
pub use error::{Error, Result};
pub use types::*;
