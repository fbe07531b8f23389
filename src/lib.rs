pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::Settings;

pub use adapters::{LocalStorage, OmniPathClient, ResolweClient};
pub use crate::core::{
    engine::{run, ScoringEngine},
    pipeline::ProgenyPipeline,
};
pub use utils::error::{ProgenyError, Result};
