use std::fmt;

use fraudml_core::MlResult;
use serde::{Deserialize, Serialize};

use crate::classification::{accuracy, f1_score_class, precision_class, recall_class};

/// Per-class precision, recall, F1 and support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: u8,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Text classification report for binary labels, with macro and
/// support-weighted averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn new(y_true: &[u8], y_pred: &[u8]) -> MlResult<Self> {
        let accuracy = accuracy(y_true, y_pred)?;
        let mut classes = Vec::with_capacity(2);
        for label in [0u8, 1u8] {
            classes.push(ClassMetrics {
                label,
                precision: precision_class(y_true, y_pred, label)?,
                recall: recall_class(y_true, y_pred, label)?,
                f1: f1_score_class(y_true, y_pred, label)?,
                support: y_true.iter().filter(|&&t| t == label).count(),
            });
        }

        let total = y_true.len();
        let n = classes.len() as f64;
        let avg = |f: fn(&ClassMetrics) -> f64| classes.iter().map(f).sum::<f64>() / n;
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            classes
                .iter()
                .map(|c| f(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        };
        let macro_avg = ClassMetrics {
            label: 0,
            precision: avg(|c| c.precision),
            recall: avg(|c| c.recall),
            f1: avg(|c| c.f1),
            support: total,
        };
        let weighted_avg = ClassMetrics {
            label: 0,
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1: weighted(|c| c.f1),
            support: total,
        };

        Ok(ClassificationReport { classes, accuracy, macro_avg, weighted_avg })
    }

    pub fn class(&self, label: u8) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.label == label)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14}{:>11}{:>10}{:>10}{:>10}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>14}{:>11.2}{:>10.2}{:>10.2}{:>10}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        let total = self.macro_avg.support;
        writeln!(f, "{:>14}{:>11}{:>10}{:>10.2}{:>10}", "accuracy", "", "", self.accuracy, total)?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14}{:>11.2}{:>10.2}{:>10.2}{:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_report_values() {
        let y_true = [0, 0, 0, 0, 1, 1];
        let y_pred = [0, 0, 0, 1, 1, 0];
        let report = ClassificationReport::new(&y_true, &y_pred).unwrap();

        let neg = report.class(0).unwrap();
        assert_abs_diff_eq!(neg.precision, 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(neg.recall, 0.75, epsilon = 1e-12);
        assert_eq!(neg.support, 4);

        let pos = report.class(1).unwrap();
        assert_abs_diff_eq!(pos.precision, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(pos.recall, 0.5, epsilon = 1e-12);
        assert_eq!(pos.support, 2);

        assert_abs_diff_eq!(report.accuracy, 4.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.macro_avg.f1, 0.625, epsilon = 1e-12);
        // (0.75 * 4 + 0.5 * 2) / 6
        assert_abs_diff_eq!(report.weighted_avg.f1, 4.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_report_renders_all_rows() {
        let report = ClassificationReport::new(&[0, 1, 1], &[0, 1, 0]).unwrap();
        let text = report.to_string();
        for needle in ["precision", "accuracy", "macro avg", "weighted avg"] {
            assert!(text.contains(needle), "missing {needle}");
        }
        assert_eq!(text.lines().count(), 8);
    }
}
