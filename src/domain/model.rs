use crate::utils::error::{ProgenyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Gene expression values, samples as rows and genes as columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionMatrix {
    samples: Vec<String>,
    genes: Vec<String>,
    values: Vec<f64>,
}

impl ExpressionMatrix {
    /// `values` is row-major, one row per sample.
    pub fn new(samples: Vec<String>, genes: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if values.len() != samples.len() * genes.len() {
            return Err(ProgenyError::ShapeError {
                message: format!(
                    "expected {} x {} expression values, got {}",
                    samples.len(),
                    genes.len(),
                    values.len()
                ),
            });
        }
        Ok(Self {
            samples,
            genes,
            values,
        })
    }

    pub fn from_rows(samples: Vec<String>, genes: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.len() != samples.len() || rows.iter().any(|row| row.len() != genes.len()) {
            return Err(ProgenyError::ShapeError {
                message: format!(
                    "expression rows do not match {} samples x {} genes",
                    samples.len(),
                    genes.len()
                ),
            });
        }
        Self::new(samples, genes, rows.into_iter().flatten().collect())
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn row(&self, sample: usize) -> &[f64] {
        let start = sample * self.genes.len();
        &self.values[start..start + self.genes.len()]
    }

    /// Column position of each gene; the first column wins for repeated names.
    pub fn gene_index(&self) -> HashMap<&str, usize> {
        let mut index = HashMap::with_capacity(self.genes.len());
        for (i, gene) in self.genes.iter().enumerate() {
            index.entry(gene.as_str()).or_insert(i);
        }
        index
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Species {
    Human,
    Other(String),
}

impl Species {
    pub fn from_annotation(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "homo sapiens" | "human" | "hsapiens" => Species::Human,
            _ => Species::Other(value.trim().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Species::Human => "Homo sapiens",
            Species::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub collection: String,
    pub species: String,
    pub expression_type: Option<String>,
    pub expression: ExpressionMatrix,
}

/// One gene-pathway entry of the long-format PROGENy model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayWeight {
    pub pathway: String,
    pub gene: String,
    pub weight: f64,
    pub p_value: f64,
}

/// Genes x pathways weight matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct PathwayModel {
    pathways: Vec<String>,
    genes: Vec<String>,
    weights: Vec<f64>,
}

impl PathwayModel {
    /// Pivots long-format weights. Genes and pathways come out sorted, absent
    /// pairs are 0 and repeated (pathway, gene) pairs keep the first weight.
    pub fn from_weights(entries: &[PathwayWeight]) -> Self {
        let pathways: Vec<String> = entries
            .iter()
            .map(|e| e.pathway.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let genes: Vec<String> = entries
            .iter()
            .map(|e| e.gene.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let pathway_pos: HashMap<&str, usize> = pathways
            .iter()
            .enumerate()
            .map(|(i, p)| (p.as_str(), i))
            .collect();
        let gene_pos: HashMap<&str, usize> = genes
            .iter()
            .enumerate()
            .map(|(i, g)| (g.as_str(), i))
            .collect();

        let mut weights = vec![0.0; genes.len() * pathways.len()];
        let mut seen = HashSet::new();
        for entry in entries {
            if !seen.insert((entry.pathway.as_str(), entry.gene.as_str())) {
                continue;
            }
            let row = gene_pos[entry.gene.as_str()];
            let col = pathway_pos[entry.pathway.as_str()];
            weights[row * pathways.len() + col] = entry.weight;
        }

        Self {
            pathways,
            genes,
            weights,
        }
    }

    pub fn pathways(&self) -> &[String] {
        &self.pathways
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn row(&self, gene: usize) -> &[f64] {
        let start = gene * self.pathways.len();
        &self.weights[start..start + self.pathways.len()]
    }

    #[cfg(test)]
    pub fn weight(&self, gene: &str, pathway: &str) -> Option<f64> {
        let row = self.genes.iter().position(|g| g == gene)?;
        let col = self.pathways.iter().position(|p| p == pathway)?;
        Some(self.row(row)[col])
    }
}

/// Pathway activity, samples as rows and pathways as columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    pub samples: Vec<String>,
    pub pathways: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

#[cfg(test)]
impl ScoreMatrix {
    pub fn score(&self, sample: &str, pathway: &str) -> Option<f64> {
        let row = self.samples.iter().position(|s| s == sample)?;
        let col = self.pathways.iter().position(|p| p == pathway)?;
        Some(self.values[row][col])
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub collection: String,
    pub scores: ScoreMatrix,
    pub table: String,
    pub output_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(pathway: &str, gene: &str, weight: f64) -> PathwayWeight {
        PathwayWeight {
            pathway: pathway.to_string(),
            gene: gene.to_string(),
            weight,
            p_value: 0.01,
        }
    }

    #[test]
    fn test_expression_shape_checked() {
        let result = ExpressionMatrix::new(
            vec!["s1".to_string()],
            vec!["A".to_string(), "B".to_string()],
            vec![1.0],
        );
        assert!(matches!(result, Err(ProgenyError::ShapeError { .. })));
    }

    #[test]
    fn test_gene_index_keeps_first_duplicate() {
        let matrix = ExpressionMatrix::new(
            vec!["s1".to_string()],
            vec!["A".to_string(), "B".to_string(), "A".to_string()],
            vec![1.0, 2.0, 3.0],
        )
        .unwrap();
        assert_eq!(matrix.gene_index()["A"], 0);
        assert_eq!(matrix.row(0), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_species_parsing() {
        assert_eq!(Species::from_annotation("Homo sapiens"), Species::Human);
        assert_eq!(Species::from_annotation(" human "), Species::Human);
        assert_eq!(
            Species::from_annotation("Mus musculus"),
            Species::Other("Mus musculus".to_string())
        );
    }

    #[test]
    fn test_pathway_model_pivot() {
        let model = PathwayModel::from_weights(&[
            weight("p53", "TP53I3", 2.5),
            weight("EGFR", "DUSP6", 1.5),
            weight("EGFR", "TP53I3", -0.5),
            weight("EGFR", "DUSP6", 9.0),
        ]);

        assert_eq!(model.pathways(), &["EGFR".to_string(), "p53".to_string()]);
        assert_eq!(model.genes(), &["DUSP6".to_string(), "TP53I3".to_string()]);
        assert_eq!(model.weight("DUSP6", "EGFR"), Some(1.5));
        assert_eq!(model.weight("DUSP6", "p53"), Some(0.0));
        assert_eq!(model.weight("TP53I3", "p53"), Some(2.5));
    }
}
