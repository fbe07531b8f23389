//! PROGENy pathway scoring (Schubert et al. 2018).
//!
//! Scores are the product of the expression matrix restricted to the genes
//! shared with the model and the model's weights, z-scored per sample.

use crate::core::normalise::zscore;
use crate::domain::model::{ExpressionMatrix, PathwayModel, ScoreMatrix};
use crate::utils::error::{ProgenyError, Result};

/// Genes present in both inputs, in model order, as
/// `(model_row, expression_column)` pairs.
pub fn matching_genes(expression: &ExpressionMatrix, model: &PathwayModel) -> Vec<(usize, usize)> {
    let columns = expression.gene_index();
    model
        .genes()
        .iter()
        .enumerate()
        .filter_map(|(row, gene)| columns.get(gene.as_str()).map(|&col| (row, col)))
        .collect()
}

/// Raw pathway activity `G[:, matching] . W[matching, :]`.
pub fn raw_scores(expression: &ExpressionMatrix, model: &PathwayModel) -> Result<ScoreMatrix> {
    let matching = matching_genes(expression, model);
    if matching.is_empty() {
        return Err(ProgenyError::NoMatchingGenes);
    }
    tracing::debug!(
        "Matched {} of {} PROGENy genes against {} dataset genes",
        matching.len(),
        model.genes().len(),
        expression.n_genes()
    );

    let n_pathways = model.pathways().len();
    let values = (0..expression.n_samples())
        .map(|sample| {
            let expr = expression.row(sample);
            let mut scores = vec![0.0; n_pathways];
            for &(model_row, col) in &matching {
                let g = expr[col];
                for (score, w) in scores.iter_mut().zip(model.row(model_row)) {
                    *score += g * w;
                }
            }
            scores
        })
        .collect();

    Ok(ScoreMatrix {
        samples: expression.samples().to_vec(),
        pathways: model.pathways().to_vec(),
        values,
    })
}

/// Normalised PROGENy scores: every sample row has mean 0 and std 1.
pub fn progeny_scores(expression: &ExpressionMatrix, model: &PathwayModel) -> Result<ScoreMatrix> {
    let mut scores = raw_scores(expression, model)?;
    for row in scores.values.iter_mut() {
        *row = zscore(row);
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalise::{mean, sample_std};
    use crate::domain::model::PathwayWeight;

    fn model() -> PathwayModel {
        let entries = [
            ("EGFR", "DUSP6", 2.0),
            ("EGFR", "SPRY2", 1.0),
            ("Hypoxia", "VEGFA", 3.0),
            ("Hypoxia", "DUSP6", -0.5),
            ("p53", "CDKN1A", 2.5),
            ("p53", "MDM2", 1.5),
        ];
        let weights: Vec<PathwayWeight> = entries
            .iter()
            .map(|(pathway, gene, weight)| PathwayWeight {
                pathway: pathway.to_string(),
                gene: gene.to_string(),
                weight: *weight,
                p_value: 0.001,
            })
            .collect();
        PathwayModel::from_weights(&weights)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn expression() -> ExpressionMatrix {
        ExpressionMatrix::from_rows(
            strings(&["sample-1", "sample-2", "sample-3"]),
            strings(&["MDM2", "DUSP6", "ACTB", "VEGFA", "CDKN1A"]),
            vec![
                vec![5.0, 1.0, 100.0, 2.0, 0.5],
                vec![0.2, 8.0, 90.0, 1.0, 3.0],
                vec![1.0, 2.0, 80.0, 9.0, 1.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_matching_is_intersection() {
        let model = model();
        let matched: Vec<&str> = matching_genes(&expression(), &model)
            .into_iter()
            .map(|(row, _)| model.genes()[row].as_str())
            .collect();
        // SPRY2 is model-only, ACTB is dataset-only
        assert_eq!(matched, vec!["CDKN1A", "DUSP6", "MDM2", "VEGFA"]);
    }

    #[test]
    fn test_raw_scores_are_matrix_product() {
        let scores = raw_scores(&expression(), &model()).unwrap();
        assert_eq!(scores.pathways, strings(&["EGFR", "Hypoxia", "p53"]));
        // sample-1: EGFR = 2*1, Hypoxia = 3*2 - 0.5*1, p53 = 2.5*0.5 + 1.5*5
        assert!((scores.score("sample-1", "EGFR").unwrap() - 2.0).abs() < 1e-12);
        assert!((scores.score("sample-1", "Hypoxia").unwrap() - 5.5).abs() < 1e-12);
        assert!((scores.score("sample-1", "p53").unwrap() - 8.75).abs() < 1e-12);
    }

    #[test]
    fn test_normalised_rows_have_zero_mean_unit_std() {
        let scores = progeny_scores(&expression(), &model()).unwrap();
        for row in &scores.values {
            assert!(mean(row).abs() < 1e-9);
            assert!((sample_std(row) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scores_invariant_to_gene_order() {
        let original = expression();
        let genes = original.genes().to_vec();
        let order = [4, 2, 0, 3, 1];
        let shuffled_genes: Vec<String> = order.iter().map(|&i| genes[i].clone()).collect();
        let shuffled_rows: Vec<Vec<f64>> = (0..original.n_samples())
            .map(|s| order.iter().map(|&i| original.row(s)[i]).collect())
            .collect();
        let shuffled =
            ExpressionMatrix::from_rows(original.samples().to_vec(), shuffled_genes, shuffled_rows)
                .unwrap();

        let a = progeny_scores(&original, &model()).unwrap();
        let b = progeny_scores(&shuffled, &model()).unwrap();
        for (row_a, row_b) in a.values.iter().zip(&b.values) {
            for (x, y) in row_a.iter().zip(row_b) {
                assert!((x - y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_no_shared_genes() {
        let expression = ExpressionMatrix::from_rows(
            strings(&["sample-1"]),
            strings(&["ACTB", "GAPDH"]),
            vec![vec![1.0, 2.0]],
        )
        .unwrap();
        assert!(matches!(
            progeny_scores(&expression, &model()),
            Err(ProgenyError::NoMatchingGenes)
        ));
    }
}
