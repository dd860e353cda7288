//! Classification metrics and the per-experiment leaderboard.

use crate::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Label treated as positive when scoring a two-class problem.
pub const POSITIVE_LABEL: usize = 1;

/// How per-class scores were combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Averaging {
    /// Scores of the positive label only.
    Binary,
    /// Per-class scores weighted by their support in `y_true`.
    Weighted,
}

/// Scores of one model on the test partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub averaging: Averaging,
    /// Rows are true labels, columns predicted, both over `labels`.
    pub confusion_matrix: Vec<Vec<usize>>,
    pub labels: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
struct ClassScore {
    precision: f64,
    recall: f64,
    f1: f64,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn class_score(confusion: &[Vec<usize>], idx: usize) -> ClassScore {
    let tp = confusion[idx][idx];
    let predicted: usize = confusion.iter().map(|row| row[idx]).sum();
    let actual: usize = confusion[idx].iter().sum();

    let precision = ratio(tp, predicted);
    let recall = ratio(tp, actual);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    ClassScore {
        precision,
        recall,
        f1,
    }
}

/// Score predictions against true label codes.
///
/// Two distinct labels in `y_true` selects binary averaging on
/// [`POSITIVE_LABEL`]; anything else is support-weighted. Undefined ratios
/// count as 0.
pub fn evaluate(y_true: &[usize], y_pred: &[usize]) -> Result<ModelMetrics> {
    if y_true.len() != y_pred.len() {
        return Err(ForgeError::DimensionMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(ForgeError::EmptyData("no predictions to score".to_string()));
    }

    let labels: Vec<usize> = y_true
        .iter()
        .chain(y_pred)
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index = |label: usize| labels.binary_search(&label).unwrap_or_default();

    let mut confusion = vec![vec![0usize; labels.len()]; labels.len()];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        confusion[index(t)][index(p)] += 1;
    }

    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    let accuracy = ratio(correct, y_true.len());

    let true_labels: BTreeSet<usize> = y_true.iter().copied().collect();
    let (averaging, score) = if true_labels.len() == 2 {
        let score = match labels.binary_search(&POSITIVE_LABEL) {
            Ok(idx) => class_score(&confusion, idx),
            Err(_) => ClassScore::default(),
        };
        (Averaging::Binary, score)
    } else {
        let total = y_true.len() as f64;
        let mut weighted = ClassScore::default();
        for (idx, row) in confusion.iter().enumerate() {
            let support = row.iter().sum::<usize>() as f64;
            if support == 0.0 {
                continue;
            }
            let s = class_score(&confusion, idx);
            weighted.precision += s.precision * support / total;
            weighted.recall += s.recall * support / total;
            weighted.f1 += s.f1 * support / total;
        }
        (Averaging::Weighted, weighted)
    };

    Ok(ModelMetrics {
        accuracy,
        precision: score.precision,
        recall: score.recall,
        f1: score.f1,
        averaging,
        confusion_matrix: confusion,
        labels,
    })
}

/// Outcome of training one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResult {
    pub model_name: String,
    pub metrics: ModelMetrics,
    #[serde(default)]
    pub training_time_seconds: Option<f64>,
}

impl ModelResult {
    pub fn new(model_name: &str, metrics: ModelMetrics) -> Self {
        Self {
            model_name: model_name.to_string(),
            metrics,
            training_time_seconds: None,
        }
    }

    pub fn with_training_time(mut self, seconds: f64) -> Self {
        self.training_time_seconds = Some(seconds);
        self
    }
}

/// Model results ranked best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<ModelResult>,
}

impl Leaderboard {
    /// Rank results by f1, highest first. Ties keep their input order.
    pub fn from_results(mut results: Vec<ModelResult>) -> Self {
        results.sort_by(|a, b| b.metrics.f1.total_cmp(&a.metrics.f1));
        Self { entries: results }
    }

    pub fn best(&self) -> Option<&ModelResult> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:<4} {:<22} {:>8} {:>9} {:>8} {:>8}",
            "rank", "model", "accuracy", "precision", "recall", "f1"
        )?;
        for (rank, entry) in self.entries.iter().enumerate() {
            let m = &entry.metrics;
            writeln!(
                f,
                "{:<4} {:<22} {:>8.4} {:>9.4} {:>8.4} {:>8.4}",
                rank + 1,
                entry.model_name,
                m.accuracy,
                m.precision,
                m.recall,
                m.f1
            )?;
        }
        Ok(())
    }
}
