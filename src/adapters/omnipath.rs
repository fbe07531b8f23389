//! PROGENy weights from the OmniPath annotations service.

use crate::domain::model::{PathwayModel, PathwayWeight, Species};
use crate::domain::ports::PathwayModelSource;
use crate::utils::error::{ProgenyError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_OMNIPATH_URL: &str = "https://omnipathdb.org";
pub const DEFAULT_TOP_GENES: usize = 100;
const SERVICE_NAME: &str = "OmniPath web service";

/// One row of the long annotation table; each PROGENy record spans three rows
/// (`pathway`, `weight`, `p_value`) sharing a `record_id`.
#[derive(Debug, Deserialize)]
struct AnnotationRow {
    genesymbol: String,
    #[serde(default)]
    entity_type: Option<String>,
    label: String,
    value: String,
    record_id: u64,
}

#[derive(Debug, Default)]
struct PartialRecord {
    gene: String,
    pathway: Option<String>,
    weight: Option<f64>,
    p_value: Option<f64>,
}

fn parse_number(label: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ProgenyError::ProcessingError {
            message: format!("invalid PROGENy {} '{}'", label, value),
        })
}

/// Parses the OmniPath PROGENy annotation TSV into long-format weights, in
/// record order. Complexes and incomplete records are dropped.
pub fn parse_progeny_annotations(tsv: &str) -> Result<Vec<PathwayWeight>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(tsv.as_bytes());

    let mut records: Vec<PartialRecord> = Vec::new();
    let mut by_id: HashMap<u64, usize> = HashMap::new();

    for row in reader.deserialize::<AnnotationRow>() {
        let row = row?;
        if row.entity_type.as_deref() == Some("complex") {
            continue;
        }
        let idx = *by_id.entry(row.record_id).or_insert_with(|| {
            records.push(PartialRecord {
                gene: row.genesymbol.clone(),
                ..Default::default()
            });
            records.len() - 1
        });
        let record = &mut records[idx];
        match row.label.as_str() {
            "pathway" => record.pathway = Some(row.value),
            "weight" => record.weight = Some(parse_number("weight", &row.value)?),
            "p_value" => record.p_value = Some(parse_number("p_value", &row.value)?),
            other => tracing::trace!("Ignoring PROGENy label '{}'", other),
        }
    }

    let total = records.len();
    let weights: Vec<PathwayWeight> = records
        .into_iter()
        .filter_map(|r| {
            Some(PathwayWeight {
                pathway: r.pathway?,
                gene: r.gene,
                weight: r.weight?,
                p_value: r.p_value?,
            })
        })
        .collect();
    if weights.len() < total {
        tracing::debug!(
            "Dropped {} incomplete PROGENy records",
            total - weights.len()
        );
    }
    Ok(weights)
}

/// Keeps, for every pathway, the `top` genes with the smallest p-value.
/// Ties keep their input order.
pub fn select_top_genes(weights: Vec<PathwayWeight>, top: usize) -> Vec<PathwayWeight> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<PathwayWeight>> = HashMap::new();
    for weight in weights {
        if !groups.contains_key(&weight.pathway) {
            order.push(weight.pathway.clone());
        }
        groups.entry(weight.pathway.clone()).or_default().push(weight);
    }

    order
        .into_iter()
        .flat_map(|pathway| {
            let mut group = groups.remove(&pathway).unwrap_or_default();
            group.sort_by(|a, b| a.p_value.total_cmp(&b.p_value));
            group.truncate(top);
            group
        })
        .collect()
}

pub struct OmniPathClient {
    client: Client,
    base_url: String,
}

impl OmniPathClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("progeny/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn progeny_annotations(&self) -> Result<String> {
        let url = format!("{}/annotations", self.base_url);
        tracing::debug!("📡 GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("resources", "PROGENy"),
                ("license", "academic"),
                ("format", "tsv"),
            ])
            .send()
            .await
            .map_err(|e| ProgenyError::from_transport(SERVICE_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProgenyError::HttpStatusError {
                endpoint: url,
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PathwayModelSource for OmniPathClient {
    async fn fetch_model(&self, species: &Species, top: usize) -> Result<PathwayModel> {
        if let Species::Other(name) = species {
            return Err(ProgenyError::UnsupportedSpecies {
                species: name.clone(),
            });
        }

        let unavailable = |reason: String| ProgenyError::PathwayModelUnavailable {
            species: species.name().to_string(),
            reason,
        };
        let tsv = self
            .progeny_annotations()
            .await
            .map_err(|e| unavailable(e.user_friendly_message()))?;
        let weights = parse_progeny_annotations(&tsv).map_err(|e| unavailable(e.to_string()))?;
        let weights = select_top_genes(weights, top);
        if weights.is_empty() {
            return Err(unavailable("OmniPath returned no PROGENy weights".to_string()));
        }

        let model = PathwayModel::from_weights(&weights);
        tracing::info!(
            "🧬 PROGENy model: {} pathways, {} genes (top {} per pathway)",
            model.pathways().len(),
            model.genes().len(),
            top
        );
        Ok(model)
    }
}
