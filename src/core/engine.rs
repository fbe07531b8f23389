use crate::adapters::{LocalStorage, OmniPathClient, ResolweClient};
use crate::config::Settings;
use crate::core::pipeline::ProgenyPipeline;
use crate::core::{Pipeline, Report};
use crate::utils::error::{ProgenyError, Result};
use std::time::Duration;

pub struct ScoringEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ScoringEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<Report> {
        tracing::info!("Extracting dataset...");
        let dataset = self.pipeline.extract().await?;
        println!(
            "\nSuccessfully retrieved dataset '{}' with {} samples and {} genes from '{}'.",
            dataset.collection,
            dataset.expression.n_samples(),
            dataset.expression.n_genes(),
            dataset.species
        );

        tracing::info!("Scoring pathways...");
        let scores = self.pipeline.transform(dataset).await?;
        tracing::info!(
            "Scored {} samples on {} pathways",
            scores.samples.len(),
            scores.pathways.len()
        );

        let mut report = self.pipeline.render(scores);
        println!(
            "\nNormalized PROGENy scores for samples in collection '{}':\n",
            report.collection
        );
        println!("{}", report.table);

        // The table is already on screen; a failed write only loses the file.
        match self.pipeline.load(&report).await {
            Ok(Some(path)) => {
                tracing::info!("📁 Output saved to: {}", path);
                println!("Output saved to: {}", path);
                report.output_path = Some(path);
            }
            Ok(None) => {}
            Err(e) => report_error(&e),
        }
        Ok(report)
    }

    /// Runs to completion, turning any failure into a printed diagnostic.
    pub async fn run_and_report(&self) -> Option<Report> {
        match self.run().await {
            Ok(report) => Some(report),
            Err(e) => {
                report_error(&e);
                None
            }
        }
    }
}

pub fn report_error(e: &ProgenyError) {
    tracing::error!("❌ PROGENy run failed: {} (Category: {:?})", e, e.category());
    tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    println!("{}", e.user_friendly_message());
}

/// Builds the Resolwe and OmniPath clients from `settings` and runs once.
/// Errors never propagate; `None` means a diagnostic was printed.
pub async fn run(settings: Settings) -> Option<Report> {
    let timeout = Duration::from_secs(settings.timeout_seconds);
    let clients = ResolweClient::new(&settings.resolwe_url, timeout).and_then(|resolwe| {
        OmniPathClient::new(&settings.omnipath_url, timeout).map(|omnipath| (resolwe, omnipath))
    });
    let (resolwe, omnipath) = match clients {
        Ok(clients) => clients,
        Err(e) => {
            report_error(&e);
            return None;
        }
    };

    let storage = LocalStorage::new(settings.output_dir.clone());
    let pipeline = ProgenyPipeline::new(resolwe, omnipath, storage, settings);
    ScoringEngine::new(pipeline).run_and_report().await
}
