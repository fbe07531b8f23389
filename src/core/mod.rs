pub mod engine;
pub mod normalise;
pub mod pipeline;
pub mod scoring;

pub use crate::domain::model::{Dataset, PathwayModel, Report, ScoreMatrix, Species};
pub use crate::domain::ports::{
    ConfigProvider, ExpressionSource, PathwayModelSource, Pipeline, Storage,
};
pub use crate::utils::error::Result;
