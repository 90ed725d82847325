use fraudml_core::{MlError, MlResult};

fn check_lengths(y_true: &[u8], other: usize) -> MlResult<()> {
    if y_true.len() != other {
        return Err(MlError::ShapeMismatch {
            expected: vec![y_true.len()],
            got: vec![other],
        });
    }
    if y_true.is_empty() {
        return Err(MlError::EmptyMatrix);
    }
    Ok(())
}

/// Fraction of correct predictions.
pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> MlResult<f64> {
    check_lengths(y_true, y_pred.len())?;
    let correct = y_true.iter().zip(y_pred).filter(|(a, b)| a == b).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Confusion matrix for classes `0..n_classes`: rows are actual, columns predicted.
pub fn confusion_matrix(y_true: &[u8], y_pred: &[u8], n_classes: usize) -> MlResult<Vec<Vec<usize>>> {
    check_lengths(y_true, y_pred.len())?;
    let mut matrix = vec![vec![0usize; n_classes]; n_classes];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        let (t, p) = (usize::from(t), usize::from(p));
        if t >= n_classes || p >= n_classes {
            return Err(MlError::IndexOutOfBounds { index: t.max(p), axis: 0, size: n_classes });
        }
        matrix[t][p] += 1;
    }
    Ok(matrix)
}

/// Precision for a specific class; 0 when the class is never predicted.
pub fn precision_class(y_true: &[u8], y_pred: &[u8], class: u8) -> MlResult<f64> {
    check_lengths(y_true, y_pred.len())?;
    let mut tp = 0usize;
    let mut fp = 0usize;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        if p == class {
            if t == class {
                tp += 1;
            } else {
                fp += 1;
            }
        }
    }
    Ok(if tp + fp == 0 { 0.0 } else { tp as f64 / (tp + fp) as f64 })
}

/// Recall for a specific class; 0 when the class never occurs.
pub fn recall_class(y_true: &[u8], y_pred: &[u8], class: u8) -> MlResult<f64> {
    check_lengths(y_true, y_pred.len())?;
    let mut tp = 0usize;
    let mut fn_ = 0usize;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        if t == class {
            if p == class {
                tp += 1;
            } else {
                fn_ += 1;
            }
        }
    }
    Ok(if tp + fn_ == 0 { 0.0 } else { tp as f64 / (tp + fn_) as f64 })
}

/// F1 score for a specific class.
pub fn f1_score_class(y_true: &[u8], y_pred: &[u8], class: u8) -> MlResult<f64> {
    let p = precision_class(y_true, y_pred, class)?;
    let r = recall_class(y_true, y_pred, class)?;
    Ok(if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) })
}

/// ROC-AUC for binary classification.
///
/// Computes the area under the ROC curve with the trapezoidal rule, grouping
/// tied scores into a single threshold so ties count half. Errors when only
/// one class is present, where the curve is undefined.
pub fn roc_auc(y_true: &[u8], y_scores: &[f64]) -> MlResult<f64> {
    check_lengths(y_true, y_scores.len())?;
    let mut pairs: Vec<(f64, bool)> = y_scores
        .iter()
        .zip(y_true)
        .map(|(&s, &t)| (s, t == 1))
        .collect();
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

    let total_pos = pairs.iter().filter(|(_, pos)| *pos).count() as f64;
    let total_neg = pairs.len() as f64 - total_pos;
    if total_pos == 0.0 || total_neg == 0.0 {
        return Err(MlError::InvalidOperation(
            "ROC AUC is undefined when only one class is present".into(),
        ));
    }

    let mut auc = 0.0;
    let (mut tp, mut fp) = (0.0, 0.0);
    let (mut prev_tpr, mut prev_fpr) = (0.0, 0.0);
    let mut i = 0;
    while i < pairs.len() {
        let score = pairs[i].0;
        while i < pairs.len() && pairs[i].0 == score {
            if pairs[i].1 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            i += 1;
        }
        let tpr = tp / total_pos;
        let fpr = fp / total_neg;
        auc += (fpr - prev_fpr) * (tpr + prev_tpr) / 2.0;
        prev_tpr = tpr;
        prev_fpr = fpr;
    }
    Ok(auc)
}
