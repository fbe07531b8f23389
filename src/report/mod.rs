//! Markdown rendering of pathway scores.
//!
//! Produces a pipe table: sample names left-aligned under a blank header,
//! score columns right-aligned with decimal points lined up, numbers printed
//! with six significant digits.

use crate::domain::model::ScoreMatrix;

const MIN_HEADER_PADDING: usize = 2;

/// Formats like Python's `format(v, "g")`.
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to six significant digits first decides the exponent.
    let scientific = format!("{:.5e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => (scientific.clone(), 0),
    };

    if (-4..6).contains(&exponent) {
        let decimals = (5 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(&mantissa), sign, exponent.abs())
    }
}

fn trim_fraction(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Characters after the decimal point (or exponent marker); -1 for integers
/// and non-finite values.
fn after_point(s: &str) -> isize {
    let pos = s.rfind('.').or_else(|| s.to_ascii_lowercase().rfind('e'));
    match pos {
        Some(p) => (s.len() - p - 1) as isize,
        None => -1,
    }
}

fn decimal_align(cells: Vec<String>) -> Vec<String> {
    let decimals: Vec<isize> = cells.iter().map(|c| after_point(c)).collect();
    let max = decimals.iter().copied().max().unwrap_or(-1);
    cells
        .into_iter()
        .zip(decimals)
        .map(|(cell, d)| format!("{}{}", cell, " ".repeat((max - d) as usize)))
        .collect()
}

struct Column {
    header: String,
    cells: Vec<String>,
    right: bool,
}

impl Column {
    fn width(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.chars().count())
            .chain(std::iter::once(self.header.chars().count() + MIN_HEADER_PADDING))
            .max()
            .unwrap_or(0)
    }
}

fn pad(text: &str, width: usize, right: bool) -> String {
    if right {
        format!("{:>width$}", text, width = width)
    } else {
        format!("{:<width$}", text, width = width)
    }
}

/// Renders the scores as a Markdown pipe table, without a trailing newline.
pub fn render_markdown(scores: &ScoreMatrix) -> String {
    let mut columns = vec![Column {
        header: String::new(),
        cells: scores.samples.clone(),
        right: false,
    }];
    for (col, pathway) in scores.pathways.iter().enumerate() {
        let cells = scores
            .values
            .iter()
            .map(|row| format_general(row[col]))
            .collect();
        columns.push(Column {
            header: pathway.clone(),
            cells: decimal_align(cells),
            right: true,
        });
    }

    let widths: Vec<usize> = columns.iter().map(Column::width).collect();
    let mut lines = Vec::with_capacity(scores.samples.len() + 2);

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| pad(&c.header, w, c.right))
        .collect();
    lines.push(format!("| {} |", header.join(" | ")));

    let rule: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| {
            if c.right {
                format!("{}:", "-".repeat(w + 1))
            } else {
                format!(":{}", "-".repeat(w + 1))
            }
        })
        .collect();
    lines.push(format!("|{}|", rule.join("|")));

    for row in 0..scores.samples.len() {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(c, &w)| pad(&c.cells[row], w, c.right))
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}

pub fn output_file_name(collection: &str) -> String {
    format!("{}_progeny.md", collection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_general() {
        assert_eq!(format_general(1.0), "1");
        assert_eq!(format_general(-0.5), "-0.5");
        assert_eq!(format_general(1.2345678), "1.23457");
        assert_eq!(format_general(-1.0000001), "-1");
        assert_eq!(format_general(123456.7), "123457");
        assert_eq!(format_general(1234567.0), "1.23457e+06");
        assert_eq!(format_general(0.0001), "0.0001");
        assert_eq!(format_general(0.00001234), "1.234e-05");
        assert_eq!(format_general(f64::NAN), "nan");
        assert_eq!(format_general(0.0), "0");
    }

    #[test]
    fn test_render_markdown_layout() {
        let scores = ScoreMatrix {
            samples: vec!["S1".to_string(), "Sample 2".to_string()],
            pathways: vec!["EGFR".to_string(), "p53".to_string()],
            values: vec![vec![1.5, -0.25], vec![-1.0, 2.0]],
        };
        let expected = [
            "|          |   EGFR |   p53 |",
            "|:---------|-------:|------:|",
            "| S1       |    1.5 | -0.25 |",
            "| Sample 2 |   -1   |  2    |",
        ]
        .join("\n");
        assert_eq!(render_markdown(&scores), expected);
    }

    #[test]
    fn test_render_nan_cells() {
        let scores = ScoreMatrix {
            samples: vec!["S1".to_string()],
            pathways: vec!["WNT".to_string()],
            values: vec![vec![f64::NAN]],
        };
        assert_eq!(render_markdown(&scores), "|    |   WNT |\n|:---|------:|\n| S1 |   nan |");
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("tcga-brca"), "tcga-brca_progeny.md");
    }
}
