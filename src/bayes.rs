//! Categorical Naive Bayes over a [`Table`].
//!
//! ```text
//!   P(class | x1..xn)  ∝  P(class) · Π P(xi | class)
//! ```
//!
//! Every probability is a frequency ratio counted by filtering the table.
//! With `alpha > 0` the likelihoods get additive (Laplace) smoothing.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

use crate::data::filter::{count_matching, equals};
use crate::data::model::{Table, Value};

#[derive(Debug, Error, PartialEq)]
pub enum BayesError {
    #[error("cannot fit a model on an empty table")]
    EmptyTable,
    #[error("column '{0}' not found")]
    UnknownColumn(String),
    #[error("feature '{0}' was not part of the fitted model")]
    UnknownFeature(String),
    #[error("smoothing alpha must be finite and non-negative, got {0}")]
    InvalidAlpha(f64),
    #[error("every class has zero probability for this query")]
    ZeroEvidence,
}

/// Per-feature counts: feature value → class → rows.
type FeatureCounts = BTreeMap<Value, BTreeMap<Value, usize>>;

#[derive(Debug, Clone)]
pub struct NaiveBayes {
    /// Class labels in order of first appearance.
    classes: Vec<Value>,
    class_counts: BTreeMap<Value, usize>,
    total: usize,
    counts: BTreeMap<String, FeatureCounts>,
    /// Distinct values seen per feature, for smoothing.
    cardinality: BTreeMap<String, usize>,
    alpha: f64,
}

/// Normalized probability of one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Posterior {
    pub class: Value,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub posteriors: Vec<Posterior>,
}

impl Prediction {
    /// The class with the highest posterior; the first one wins a tie.
    pub fn most_likely(&self) -> Option<&Posterior> {
        self.posteriors.iter().reduce(|best, p| {
            if p.probability > best.probability {
                p
            } else {
                best
            }
        })
    }
}

impl NaiveBayes {
    /// Count class and (feature, value, class) frequencies in `table`.
    pub fn fit(
        table: &Table,
        target: &str,
        features: &[&str],
        alpha: f64,
    ) -> Result<Self, BayesError> {
        if !(alpha.is_finite() && alpha >= 0.0) {
            return Err(BayesError::InvalidAlpha(alpha));
        }
        if table.is_empty() {
            return Err(BayesError::EmptyTable);
        }
        for col in std::iter::once(&target).chain(features) {
            if !table.has_column(col) {
                return Err(BayesError::UnknownColumn(col.to_string()));
            }
        }

        let mut classes: Vec<Value> = Vec::new();
        for i in 0..table.len() {
            let label = table.value(i, target);
            if !classes.contains(label) {
                classes.push(label.clone());
            }
        }

        let class_counts: BTreeMap<Value, usize> = classes
            .iter()
            .map(|class| (class.clone(), count_matching(table, &equals([(target, class)]))))
            .collect();

        let mut counts = BTreeMap::new();
        let mut cardinality = BTreeMap::new();
        for &feature in features {
            let values: &BTreeSet<Value> = &table.unique_values[feature];
            let per_value: FeatureCounts = values
                .iter()
                .map(|value| {
                    let per_class = classes
                        .iter()
                        .map(|class| {
                            let n = count_matching(
                                table,
                                &equals([(feature, value), (target, class)]),
                            );
                            (class.clone(), n)
                        })
                        .collect();
                    (value.clone(), per_class)
                })
                .collect();
            cardinality.insert(feature.to_string(), values.len());
            counts.insert(feature.to_string(), per_value);
        }

        log::debug!(
            "fitted naive bayes on {} rows: target '{target}', {} classes, features {features:?}",
            table.len(),
            classes.len()
        );

        Ok(NaiveBayes {
            classes,
            class_counts,
            total: table.len(),
            counts,
            cardinality,
            alpha,
        })
    }

    pub fn classes(&self) -> &[Value] {
        &self.classes
    }

    /// `P(class)`.
    pub fn prior(&self, class: &Value) -> f64 {
        self.class_counts.get(class).copied().unwrap_or(0) as f64 / self.total as f64
    }

    /// `P(feature = value | class)`, smoothed by `alpha`.
    pub fn likelihood(
        &self,
        feature: &str,
        value: &Value,
        class: &Value,
    ) -> Result<f64, BayesError> {
        let per_value = self
            .counts
            .get(feature)
            .ok_or_else(|| BayesError::UnknownFeature(feature.to_string()))?;
        let joint = per_value
            .get(value)
            .and_then(|per_class| per_class.get(class))
            .copied()
            .unwrap_or(0) as f64;
        let class_total = self.class_counts.get(class).copied().unwrap_or(0) as f64;
        let k = self.cardinality.get(feature).copied().unwrap_or(0) as f64;

        let denominator = class_total + self.alpha * k;
        if denominator == 0.0 {
            return Ok(0.0);
        }
        Ok((joint + self.alpha) / denominator)
    }

    /// Unnormalized score per class: prior times one likelihood per feature.
    pub fn joint_scores(&self, query: &[(&str, Value)]) -> Result<Vec<(Value, f64)>, BayesError> {
        self.classes
            .iter()
            .map(|class| {
                let mut score = self.prior(class);
                for (feature, value) in query {
                    score *= self.likelihood(feature, value, class)?;
                }
                Ok((class.clone(), score))
            })
            .collect()
    }

    /// Posterior probability of every class for `query`, summing to 1.
    pub fn predict(&self, query: &[(&str, Value)]) -> Result<Prediction, BayesError> {
        let scores = self.joint_scores(query)?;
        let evidence: f64 = scores.iter().map(|(_, s)| s).sum();
        if evidence <= 0.0 {
            return Err(BayesError::ZeroEvidence);
        }

        let posteriors = scores
            .into_iter()
            .map(|(class, score)| Posterior {
                class,
                probability: score / evidence,
            })
            .collect();
        Ok(Prediction { posteriors })
    }
}
