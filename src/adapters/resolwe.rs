//! Client for the Resolwe REST API serving the Genialis Expressions repository.

use crate::domain::model::{Dataset, ExpressionMatrix};
use crate::domain::ports::ExpressionSource;
use crate::utils::error::{ProgenyError, Result};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::time::Duration;

pub const DEFAULT_RESOLWE_URL: &str = "https://app.genialis.com";
const SERVICE_NAME: &str = "Genialis Expressions data repository";
const EXPRESSION_TYPE: &str = "TPM";
const FEATURE_CHUNK_SIZE: usize = 200;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// List endpoints answer with a bare array, or a page when `limit` is used.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Page { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Page { results } => results,
            Listing::Plain(items) => items,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Collection {
    pub id: u64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sample {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl Sample {
    fn label(&self) -> String {
        if !self.name.is_empty() {
            self.name.clone()
        } else if !self.slug.is_empty() {
            self.slug.clone()
        } else {
            self.id.to_string()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    Id(u64),
    Object {
        id: u64,
        #[serde(default)]
        name: Option<String>,
    },
}

impl EntityRef {
    pub fn id(&self) -> u64 {
        match self {
            EntityRef::Id(id) | EntityRef::Object { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileField {
    pub file: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpressionOutput {
    #[serde(default)]
    pub exp: Option<FileField>,
    #[serde(default)]
    pub exp_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataObject {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entity: Option<EntityRef>,
    #[serde(default)]
    pub output: ExpressionOutput,
}

#[derive(Debug, Deserialize)]
struct AnnotationValue {
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Feature {
    feature_id: String,
    name: String,
}

pub struct ResolweClient {
    client: Client,
    base_url: String,
}

impl ResolweClient {
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

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("📡 GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
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
        Ok(response)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let listing: Listing<T> = self.get(path, query).await?.json().await?;
        Ok(listing.into_vec())
    }

    /// Looks a collection up by slug, then by name.
    pub async fn find_collection(&self, name: &str) -> Result<Collection> {
        for field in ["slug", "name"] {
            let found: Vec<Collection> = self
                .get_list("/api/collection", &[(field, name.to_string())])
                .await?;
            if let Some(collection) = found.into_iter().next() {
                tracing::debug!(
                    "Found collection {} (slug '{}', name '{}') by {}",
                    collection.id,
                    collection.slug,
                    collection.name,
                    field
                );
                return Ok(collection);
            }
        }
        Err(ProgenyError::CollectionNotFound {
            name: name.to_string(),
        })
    }

    pub async fn samples(&self, collection_id: u64) -> Result<Vec<Sample>> {
        self.get_list("/api/sample", &[("collections", collection_id.to_string())])
            .await
    }

    pub async fn expression_data(&self, collection_id: u64) -> Result<Vec<DataObject>> {
        self.get_list(
            "/api/data",
            &[
                ("collection", collection_id.to_string()),
                ("type", "data:expression:".to_string()),
                ("status", "OK".to_string()),
                ("ordering", "id".to_string()),
            ],
        )
        .await
    }

    /// Value of the `general.species` annotation of a sample, if set.
    pub async fn species_annotation(&self, sample_id: u64) -> Result<Option<String>> {
        let values: Vec<AnnotationValue> = self
            .get_list(
                "/api/annotation_value",
                &[
                    ("entity", sample_id.to_string()),
                    ("field__group__name", "general".to_string()),
                    ("field__name", "species".to_string()),
                ],
            )
            .await?;
        Ok(values
            .into_iter()
            .find_map(|v| v.value.as_str().map(str::to_string)))
    }

    pub async fn download(&self, data_id: u64, file: &str) -> Result<Vec<u8>> {
        let response = self.get(&format!("/data/{}/{}", data_id, file), &[]).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Gene symbols for feature ids from the knowledge base.
    pub async fn feature_names(
        &self,
        source: &str,
        species: &str,
        feature_ids: &[String],
    ) -> Result<HashMap<String, String>> {
        let mut names = HashMap::with_capacity(feature_ids.len());
        for chunk in feature_ids.chunks(FEATURE_CHUNK_SIZE) {
            let features: Vec<Feature> = self
                .get_list(
                    "/api/kb/feature",
                    &[
                        ("source", source.to_string()),
                        ("species", species.to_string()),
                        ("feature_id__in", chunk.join(",")),
                    ],
                )
                .await?;
            names.extend(features.into_iter().map(|f| (f.feature_id, f.name)));
        }
        tracing::debug!(
            "Mapped {} of {} feature ids to gene names",
            names.len(),
            feature_ids.len()
        );
        Ok(names)
    }
}

#[async_trait]
impl ExpressionSource for ResolweClient {
    async fn fetch_dataset(&self, collection_name: &str) -> Result<Dataset> {
        let collection = self.find_collection(collection_name).await?;

        let samples = self.samples(collection.id).await?;
        if samples.is_empty() {
            return Err(ProgenyError::EmptyCollection {
                name: collection_name.to_string(),
                missing: "samples".to_string(),
            });
        }

        let data = self.expression_data(collection.id).await?;
        if data.is_empty() {
            return Err(ProgenyError::EmptyCollection {
                name: collection_name.to_string(),
                missing: "expression data".to_string(),
            });
        }
        tracing::info!(
            "📂 Collection '{}' has {} samples and {} expression objects",
            collection_name,
            samples.len(),
            data.len()
        );

        if data
            .iter()
            .any(|d| d.output.exp_type.as_deref() != Some(EXPRESSION_TYPE))
        {
            tracing::warn!("Dataset '{}' is not in TPM format", collection_name);
            println!("Selected dataset is not in 'TPM' format. Please select another dataset.");
        }

        let sample_names: HashMap<u64, String> =
            samples.iter().map(|s| (s.id, s.label())).collect();

        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(data.len());
        for object in &data {
            let Some(exp) = &object.output.exp else {
                tracing::warn!("Data object {} has no expression file, skipping", object.id);
                continue;
            };
            let label = sample_label(object, &sample_names);
            if !seen.insert(sample_key(object)) {
                tracing::warn!(
                    "Sample '{}' has more than one expression object, keeping the first",
                    label
                );
                continue;
            }
            let bytes = self.download(object.id, &exp.file).await?;
            let values = parse_expression_file(&bytes)?;
            tracing::debug!("Sample '{}': {} features", label, values.len());
            rows.push((label, values));
        }
        if rows.is_empty() {
            return Err(ProgenyError::EmptyCollection {
                name: collection_name.to_string(),
                missing: "expression files".to_string(),
            });
        }

        let names = match data
            .iter()
            .find_map(|d| Some((d.output.source.as_deref()?, d.output.species.as_deref()?)))
        {
            Some((source, species)) => {
                let ids = feature_ids(&rows);
                self.feature_names(source, species, &ids).await?
            }
            None => HashMap::new(),
        };
        let expression = assemble_matrix(rows, &names)?;

        let species = match self.species_annotation(samples[0].id).await? {
            Some(species) => species,
            None => data
                .iter()
                .find_map(|d| d.output.species.clone())
                .ok_or_else(|| ProgenyError::MissingSpecies {
                    name: collection_name.to_string(),
                })?,
        };

        Ok(Dataset {
            collection: collection_name.to_string(),
            species,
            expression_type: data[0].output.exp_type.clone(),
            expression,
        })
    }
}

fn sample_label(object: &DataObject, sample_names: &HashMap<u64, String>) -> String {
    match &object.entity {
        Some(entity) => match sample_names.get(&entity.id()) {
            Some(name) => name.clone(),
            None => match entity {
                EntityRef::Object {
                    name: Some(name), ..
                } => name.clone(),
                _ => entity.id().to_string(),
            },
        },
        None if !object.name.is_empty() => object.name.clone(),
        None => object.id.to_string(),
    }
}

/// Identity of the sample a data object belongs to. Labels may repeat
/// across samples, ids do not.
fn sample_key(object: &DataObject) -> u64 {
    object
        .entity
        .as_ref()
        .map(EntityRef::id)
        .unwrap_or(object.id)
}

fn feature_ids(rows: &[(String, Vec<(String, f64)>)]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .flat_map(|(_, values)| values.iter().map(|(id, _)| id))
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Parses a two-column tab-separated expression file (feature id, value),
/// gzip-compressed or plain, with a header line.
pub fn parse_expression_file(bytes: &[u8]) -> Result<Vec<(String, f64)>> {
    let decoded;
    let raw = if bytes.starts_with(&GZIP_MAGIC) {
        let mut buffer = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut buffer)
            .map_err(|e| ProgenyError::ProcessingError {
                message: format!("corrupt gzip expression file: {}", e),
            })?;
        decoded = buffer;
        decoded.as_slice()
    } else {
        bytes
    };
    let text = String::from_utf8_lossy(raw);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        let (Some(id), Some(raw)) = (record.get(0), record.get(1)) else {
            continue;
        };
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ProgenyError::ProcessingError {
                message: format!("invalid expression value '{}' for '{}'", raw, id),
            })?;
        values.push((id.trim().to_string(), value));
    }
    Ok(values)
}

/// Builds the samples x genes matrix. Columns follow first appearance, are
/// renamed through `names` where a mapping exists, and genes a sample lacks
/// are filled with 0.
pub fn assemble_matrix(
    rows: Vec<(String, Vec<(String, f64)>)>,
    names: &HashMap<String, String>,
) -> Result<ExpressionMatrix> {
    let mut ids: Vec<String> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    for (_, values) in &rows {
        for (id, _) in values {
            if !position.contains_key(id) {
                position.insert(id.clone(), ids.len());
                ids.push(id.clone());
            }
        }
    }

    let mut samples = Vec::with_capacity(rows.len());
    let mut matrix = Vec::with_capacity(rows.len() * ids.len());
    let mut filled = 0usize;
    for (sample, values) in rows {
        let mut row: Vec<Option<f64>> = vec![None; ids.len()];
        for (id, value) in values {
            let slot = &mut row[position[&id]];
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        filled += row.iter().filter(|v| v.is_none()).count();
        matrix.extend(row.into_iter().map(|v| v.unwrap_or(0.0)));
        samples.push(sample);
    }
    if filled > 0 {
        tracing::debug!("Filled {} missing expression values with 0", filled);
    }

    let genes = ids
        .into_iter()
        .map(|id| names.get(&id).cloned().unwrap_or(id))
        .collect();
    ExpressionMatrix::new(samples, genes, matrix)
}
