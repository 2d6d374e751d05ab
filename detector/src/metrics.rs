// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Evaluation metrics
//!
//! FAKE is the positive class throughout:
//! - Confusion matrix, accuracy, precision, recall, F1, specificity, MCC
//! - AUC-ROC and Brier score over P(fake)
//! - Counterfactual statistics over FLIP searches

use crate::counterfactual::CounterfactualResult;
use crate::predictor::Label;
use serde::{Deserialize, Serialize};

/// Confusion matrix for FAKE vs REAL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// FAKE predicted as FAKE
    pub tp: usize,
    /// REAL predicted as REAL
    pub tn: usize,
    /// REAL predicted as FAKE
    pub fp: usize,
    /// FAKE predicted as REAL
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Pairs of `(predicted, actual)`
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Label, Label)>) -> Self {
        let mut matrix = Self::default();
        for pair in pairs {
            matrix.record(pair.0, pair.1);
        }
        matrix
    }

    pub fn record(&mut self, predicted: Label, actual: Label) {
        match (predicted, actual) {
            (Label::Fake, Label::Fake) => self.tp += 1,
            (Label::Real, Label::Real) => self.tn += 1,
            (Label::Fake, Label::Real) => self.fp += 1,
            (Label::Real, Label::Fake) => self.fn_ += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// (TP + TN) / Total
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }

    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        let denom = precision + recall;
        if denom == 0.0 {
            return 0.0;
        }
        2.0 * precision * recall / denom
    }

    /// Matthews Correlation Coefficient, in [-1, 1]
    pub fn mcc(&self) -> f64 {
        let tp = self.tp as f64;
        let tn = self.tn as f64;
        let fp = self.fp as f64;
        let fn_ = self.fn_ as f64;

        let numerator = tp * tn - fp * fn_;
        let denominator = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();

        if denominator == 0.0 {
            return 0.0;
        }
        numerator / denominator
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        return 0.0;
    }
    num as f64 / denom as f64
}

/// Full classification report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub confusion_matrix: ConfusionMatrix,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub specificity: f64,
    pub mcc: f64,
    /// AUC-ROC over P(fake), when probabilities were supplied
    pub auc_roc: Option<f64>,
    /// Mean squared error of P(fake), lower is better
    pub brier_score: Option<f64>,
    pub support: usize,
}

impl ClassificationReport {
    pub fn from_confusion_matrix(cm: ConfusionMatrix) -> Self {
        Self {
            accuracy: cm.accuracy(),
            precision: cm.precision(),
            recall: cm.recall(),
            f1_score: cm.f1_score(),
            specificity: cm.specificity(),
            mcc: cm.mcc(),
            auc_roc: None,
            brier_score: None,
            support: cm.total(),
            confusion_matrix: cm,
        }
    }

    /// Report from `(actual, P(fake))` pairs, thresholded like the predictor
    pub fn from_scores(scored: &[(Label, f64)]) -> Self {
        let cm = ConfusionMatrix::from_pairs(
            scored
                .iter()
                .map(|&(actual, p)| (Label::from_fake_probability(p), actual)),
        );
        let mut report = Self::from_confusion_matrix(cm);
        if !scored.is_empty() {
            report.auc_roc = Some(auc_roc(scored));
            report.brier_score = Some(brier_score(scored));
        }
        report
    }

    /// Human-readable summary
    pub fn format(&self) -> String {
        let mut output = format!(
            r#"Classification Report
=====================
Accuracy:          {:.4} ({:.2}%)
Precision:         {:.4}
Recall:            {:.4}
F1 Score:          {:.4}
Specificity:       {:.4}
MCC:               {:.4}
Support:           {}
"#,
            self.accuracy,
            self.accuracy * 100.0,
            self.precision,
            self.recall,
            self.f1_score,
            self.specificity,
            self.mcc,
            self.support,
        );

        if let Some(auc) = self.auc_roc {
            output.push_str(&format!("AUC-ROC:           {:.4}\n", auc));
        }
        if let Some(brier) = self.brier_score {
            output.push_str(&format!("Brier Score:       {:.4}\n", brier));
        }

        output.push_str(&format!(
            r#"
Confusion Matrix:
                  Predicted
                  FAKE      REAL
Actual FAKE      {:>6}    {:>6}
       REAL      {:>6}    {:>6}
"#,
            self.confusion_matrix.tp,
            self.confusion_matrix.fn_,
            self.confusion_matrix.fp,
            self.confusion_matrix.tn,
        ));

        output
    }
}

/// Area under the ROC curve by the trapezoidal rule
///
/// 0.5 when only one class is present.
fn auc_roc(scored: &[(Label, f64)]) -> f64 {
    let mut pairs = scored.to_vec();
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));

    let n_pos = pairs.iter().filter(|(l, _)| l.is_fake()).count() as f64;
    let n_neg = pairs.len() as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return 0.5;
    }

    let (mut tp, mut fp) = (0.0, 0.0);
    let (mut tpr_prev, mut fpr_prev) = (0.0, 0.0);
    let mut auc = 0.0;

    for (label, _) in &pairs {
        if label.is_fake() {
            tp += 1.0;
        } else {
            fp += 1.0;
        }
        let tpr = tp / n_pos;
        let fpr = fp / n_neg;
        auc += (fpr - fpr_prev) * (tpr + tpr_prev) / 2.0;
        tpr_prev = tpr;
        fpr_prev = fpr;
    }

    auc
}

fn brier_score(scored: &[(Label, f64)]) -> f64 {
    let sum: f64 = scored
        .iter()
        .map(|(label, p)| {
            let target = if label.is_fake() { 1.0 } else { 0.0 };
            (p - target).powi(2)
        })
        .sum();
    sum / scored.len() as f64
}

/// Aggregate outcome of counterfactual searches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualStats {
    /// Searches run
    pub attempted: usize,
    /// Searches that reached the target label
    pub succeeded: usize,
    /// Searches whose text came back unmodified
    pub unchanged: usize,
    total_modifications: usize,
}

impl CounterfactualStats {
    pub fn record(&mut self, result: &CounterfactualResult) {
        self.attempted += 1;
        if result.success() {
            self.succeeded += 1;
        }
        if result.modifications().is_empty() {
            self.unchanged += 1;
        }
        self.total_modifications += result.modifications().len();
    }

    pub fn success_rate(&self) -> f64 {
        ratio(self.succeeded, self.attempted)
    }

    /// Mean modifications per search
    pub fn avg_modifications(&self) -> f64 {
        ratio(self.total_modifications, self.attempted)
    }

    pub fn format(&self) -> String {
        format!(
            "Counterfactuals: {} attempted, {} succeeded ({:.2}%), {} unchanged, {:.2} modifications on average\n",
            self.attempted,
            self.succeeded,
            self.success_rate() * 100.0,
            self.unchanged,
            self.avg_modifications(),
        )
    }
}
