use crate::core::scoring::progeny_scores;
use crate::core::{
    ConfigProvider, Dataset, ExpressionSource, PathwayModelSource, Pipeline, Report, ScoreMatrix,
    Species, Storage,
};
use crate::report::{output_file_name, render_markdown};
use crate::utils::error::Result;

pub struct ProgenyPipeline<E, M, S, C>
where
    E: ExpressionSource,
    M: PathwayModelSource,
    S: Storage,
    C: ConfigProvider,
{
    expression_source: E,
    model_source: M,
    storage: S,
    config: C,
}

impl<E, M, S, C> ProgenyPipeline<E, M, S, C>
where
    E: ExpressionSource,
    M: PathwayModelSource,
    S: Storage,
    C: ConfigProvider,
{
    pub fn new(expression_source: E, model_source: M, storage: S, config: C) -> Self {
        Self {
            expression_source,
            model_source,
            storage,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<E, M, S, C> Pipeline for ProgenyPipeline<E, M, S, C>
where
    E: ExpressionSource,
    M: PathwayModelSource,
    S: Storage,
    C: ConfigProvider,
{
    async fn extract(&self) -> Result<Dataset> {
        let name = self.config.collection_name();
        tracing::debug!("Fetching collection '{}'", name);
        self.expression_source.fetch_dataset(name).await
    }

    async fn transform(&self, dataset: Dataset) -> Result<ScoreMatrix> {
        let species = Species::from_annotation(&dataset.species);
        let model = self
            .model_source
            .fetch_model(&species, self.config.top_genes())
            .await?;
        progeny_scores(&dataset.expression, &model)
    }

    fn render(&self, scores: ScoreMatrix) -> Report {
        let table = render_markdown(&scores);
        Report {
            collection: self.config.collection_name().to_string(),
            scores,
            table,
            output_path: None,
        }
    }

    async fn load(&self, report: &Report) -> Result<Option<String>> {
        if !self.config.write_output() {
            return Ok(None);
        }
        let file_name = output_file_name(&report.collection);
        self.storage
            .write_file(&file_name, report.table.as_bytes())
            .await?;
        Ok(Some(self.storage.location(&file_name)))
    }
}
