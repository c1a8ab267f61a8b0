//! Evaluation metrics
//!
//! Regression: MSE, RMSE, MAE, R². Classification: per-class
//! precision/recall/F1/support plus accuracy, macro and weighted averages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics calculator
pub struct Metrics;

impl Metrics {
    /// Mean Squared Error
    pub fn mse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "arrays must have same length");
        if y_true.is_empty() {
            return 0.0;
        }
        y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum::<f64>()
            / y_true.len() as f64
    }

    /// Root Mean Squared Error
    pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        Self::mse(y_true, y_pred).sqrt()
    }

    /// Mean Absolute Error
    pub fn mae(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "arrays must have same length");
        if y_true.is_empty() {
            return 0.0;
        }
        y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).abs())
            .sum::<f64>()
            / y_true.len() as f64
    }

    /// R² (coefficient of determination); 0.0 when the target has no variance
    pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "arrays must have same length");
        if y_true.is_empty() {
            return 0.0;
        }

        let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum();
        let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

        if ss_tot == 0.0 {
            0.0
        } else {
            1.0 - ss_res / ss_tot
        }
    }

    /// Fraction of exact matches between class-index vectors
    pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "arrays must have same length");
        if y_true.is_empty() {
            return 0.0;
        }
        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| t == p)
            .count();
        correct as f64 / y_true.len() as f64
    }

    /// precision = TP / (TP + FP)
    pub fn precision(y_true: &[usize], y_pred: &[usize], class: usize) -> f64 {
        let (tp, fp, _) = Self::class_counts(y_true, y_pred, class);
        if tp + fp == 0 {
            0.0
        } else {
            tp as f64 / (tp + fp) as f64
        }
    }

    /// recall = TP / (TP + FN)
    pub fn recall(y_true: &[usize], y_pred: &[usize], class: usize) -> f64 {
        let (tp, _, fn_) = Self::class_counts(y_true, y_pred, class);
        if tp + fn_ == 0 {
            0.0
        } else {
            tp as f64 / (tp + fn_) as f64
        }
    }

    /// F1 = harmonic mean of precision and recall
    pub fn f1_score(y_true: &[usize], y_pred: &[usize], class: usize) -> f64 {
        let precision = Self::precision(y_true, y_pred, class);
        let recall = Self::recall(y_true, y_pred, class);
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }

    fn class_counts(y_true: &[usize], y_pred: &[usize], class: usize) -> (usize, usize, usize) {
        let mut tp = 0;
        let mut fp = 0;
        let mut fn_ = 0;
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t == class, p == class) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }
        (tp, fp, fn_)
    }
}

/// Per-class row of a classification report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRow {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Precision/recall/F1 averages over classes
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Averages {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Classification report covering every label in the dataset's label table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub rows: Vec<ClassRow>,
    pub accuracy: f64,
    pub macro_avg: Averages,
    pub weighted_avg: Averages,
    pub total_support: usize,
}

/// Build a classification report. `labels[k]` names class index `k`; the
/// report always lists every label so small evaluation sets stay stable.
pub fn classification_report(
    y_true: &[usize],
    y_pred: &[usize],
    labels: &[String],
) -> ClassificationReport {
    assert_eq!(y_true.len(), y_pred.len(), "arrays must have same length");

    let rows: Vec<ClassRow> = labels
        .iter()
        .enumerate()
        .map(|(class, label)| ClassRow {
            label: label.clone(),
            precision: Metrics::precision(y_true, y_pred, class),
            recall: Metrics::recall(y_true, y_pred, class),
            f1: Metrics::f1_score(y_true, y_pred, class),
            support: y_true.iter().filter(|&&t| t == class).count(),
        })
        .collect();

    let n_classes = rows.len().max(1) as f64;
    let total_support: usize = rows.iter().map(|r| r.support).sum();
    let weight = |support: usize| support as f64 / total_support.max(1) as f64;

    let macro_avg = Averages {
        precision: rows.iter().map(|r| r.precision).sum::<f64>() / n_classes,
        recall: rows.iter().map(|r| r.recall).sum::<f64>() / n_classes,
        f1: rows.iter().map(|r| r.f1).sum::<f64>() / n_classes,
    };
    let weighted_avg = Averages {
        precision: rows.iter().map(|r| r.precision * weight(r.support)).sum(),
        recall: rows.iter().map(|r| r.recall * weight(r.support)).sum(),
        f1: rows.iter().map(|r| r.f1 * weight(r.support)).sum(),
    };

    ClassificationReport {
        rows,
        accuracy: Metrics::accuracy(y_true, y_pred),
        macro_avg,
        weighted_avg,
        total_support,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .rows
            .iter()
            .map(|r| r.label.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>w$} {:>10} {:>10} {:>10} {:>10}",
            "",
            "precision",
            "recall",
            "f1-score",
            "support",
            w = label_width
        )?;
        writeln!(f)?;

        for row in &self.rows {
            writeln!(
                f,
                "{:>w$} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                row.label,
                row.precision,
                row.recall,
                row.f1,
                row.support,
                w = label_width
            )?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "{:>w$} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.total_support,
            w = label_width
        )?;
        writeln!(
            f,
            "{:>w$} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            "macro avg",
            self.macro_avg.precision,
            self.macro_avg.recall,
            self.macro_avg.f1,
            self.total_support,
            w = label_width
        )?;
        writeln!(
            f,
            "{:>w$} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            "weighted avg",
            self.weighted_avg.precision,
            self.weighted_avg.recall,
            self.weighted_avg.f1,
            self.total_support,
            w = label_width
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mse_and_rmse() {
        let y_true = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(Metrics::mse(&y_true, &y_true) < 1e-12);

        let off_by_one = [2.0, 3.0, 4.0, 5.0, 6.0];
        assert!((Metrics::mse(&y_true, &off_by_one) - 1.0).abs() < 1e-12);
        assert!((Metrics::rmse(&y_true, &off_by_one) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_r2_perfect_and_baseline() {
        let y_true = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((Metrics::r2_score(&y_true, &y_true) - 1.0).abs() < 1e-12);

        // Predicting the mean everywhere gives exactly 0
        let mean_pred = [3.0; 5];
        assert!(Metrics::r2_score(&y_true, &mean_pred).abs() < 1e-12);
    }

    #[test]
    fn test_precision_recall_known_values() {
        let y_true = [1, 1, 1, 0, 0];
        let y_pred = [1, 1, 0, 1, 0];

        // TP=2, FP=1, FN=1 for class 1
        assert!((Metrics::precision(&y_true, &y_pred, 1) - 2.0 / 3.0).abs() < 1e-12);
        assert!((Metrics::recall(&y_true, &y_pred, 1) - 2.0 / 3.0).abs() < 1e-12);
        assert!((Metrics::f1_score(&y_true, &y_pred, 1) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_precision_zero_when_class_never_predicted() {
        let y_true = [0, 1, 1];
        let y_pred = [0, 0, 0];
        assert_eq!(Metrics::precision(&y_true, &y_pred, 1), 0.0);
        assert_eq!(Metrics::recall(&y_true, &y_pred, 1), 0.0);
    }

    #[test]
    fn test_classification_report_arithmetic() {
        let labels = vec!["bad_deal".to_string(), "good_deal".to_string()];
        let y_true = [0, 0, 0, 1, 1, 1];
        let y_pred = [0, 0, 1, 1, 1, 0];

        let report = classification_report(&y_true, &y_pred, &labels);

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.total_support, 6);
        assert!((report.accuracy - 4.0 / 6.0).abs() < 1e-12);

        // Symmetric confusion: both classes have P = R = 2/3
        for row in &report.rows {
            assert!((row.precision - 2.0 / 3.0).abs() < 1e-12);
            assert!((row.recall - 2.0 / 3.0).abs() < 1e-12);
            assert_eq!(row.support, 3);
        }
        assert!((report.macro_avg.f1 - report.weighted_avg.f1).abs() < 1e-12);
    }

    #[test]
    fn test_report_lists_every_label() {
        let labels = vec!["bad_deal".to_string(), "good_deal".to_string()];
        // Tiny evaluation set where only one class appears
        let report = classification_report(&[0, 0], &[0, 0], &labels);

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[1].support, 0);

        let text = report.to_string();
        assert!(text.contains("bad_deal"));
        assert!(text.contains("good_deal"));
        assert!(text.contains("macro avg"));
        assert!(text.contains("weighted avg"));
    }
}
