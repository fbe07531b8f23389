use crate::domain::model::{Dataset, PathwayModel, Report, ScoreMatrix, Species};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Where `path` ends up once written, for display.
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn collection_name(&self) -> &str;
    fn write_output(&self) -> bool;
    fn top_genes(&self) -> usize;
}

/// Remote repository holding expression collections.
#[async_trait]
pub trait ExpressionSource: Send + Sync {
    async fn fetch_dataset(&self, collection: &str) -> Result<Dataset>;
}

/// Provider of PROGENy gene weights.
#[async_trait]
pub trait PathwayModelSource: Send + Sync {
    async fn fetch_model(&self, species: &Species, top: usize) -> Result<PathwayModel>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, dataset: Dataset) -> Result<ScoreMatrix>;
    fn render(&self, scores: ScoreMatrix) -> Report;
    /// Persists a rendered report; `None` when no output was requested.
    async fn load(&self, report: &Report) -> Result<Option<String>>;
}
