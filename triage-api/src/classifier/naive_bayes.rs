//! Multinomial naive Bayes over TF-IDF features, loaded from a JSON artifact
//!
//! The artifact is produced offline by the training pipeline; this module only
//! performs inference. Layout:
//!
//! ```json
//! {
//!   "model_type": "MultinomialNB",
//!   "version": "1.0.0",
//!   "classes": ["Account", "Billing"],
//!   "class_log_prior": [-0.69, -0.69],
//!   "feature_log_prob": [[...], [...]],
//!   "vectorizer": { "vocabulary": {"refund": 0}, "idf": [1.0], "min_token_len": 2 }
//! }
//! ```

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::debug;
use triage_common::{Error, Result};

use super::{Classifier, Prediction};

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    model_type: String,
    #[serde(default)]
    version: Option<String>,
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
    vectorizer: VectorizerArtifact,
}

#[derive(Debug, Deserialize)]
struct VectorizerArtifact {
    vocabulary: HashMap<String, usize>,
    #[serde(default)]
    idf: Option<Vec<f64>>,
    #[serde(default = "default_min_token_len")]
    min_token_len: usize,
}

fn default_min_token_len() -> usize {
    2
}

/// TF-IDF vectorizer + multinomial naive Bayes classifier
#[derive(Debug, Clone)]
pub struct NaiveBayesClassifier {
    model_type: String,
    version: String,
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f64>>,
    min_token_len: usize,
}

impl NaiveBayesClassifier {
    /// Load and validate a model artifact from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Model(format!("Failed to read model {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a model artifact
    pub fn from_json_str(content: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(content)?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        let n_classes = artifact.classes.len();
        let n_features = artifact.vectorizer.vocabulary.len();

        if n_classes == 0 {
            return Err(Error::Model("Model has no classes".to_string()));
        }

        let unique: HashSet<&str> = artifact.classes.iter().map(String::as_str).collect();
        if unique.len() != n_classes {
            return Err(Error::Model("Model has duplicate class labels".to_string()));
        }

        if artifact.class_log_prior.len() != n_classes {
            return Err(Error::Model(format!(
                "class_log_prior has {} entries, expected {}",
                artifact.class_log_prior.len(),
                n_classes
            )));
        }

        if artifact.feature_log_prob.len() != n_classes {
            return Err(Error::Model(format!(
                "feature_log_prob has {} rows, expected {}",
                artifact.feature_log_prob.len(),
                n_classes
            )));
        }

        for (class, row) in artifact.classes.iter().zip(&artifact.feature_log_prob) {
            if row.len() != n_features {
                return Err(Error::Model(format!(
                    "feature_log_prob row for {} has {} entries, expected {}",
                    class,
                    row.len(),
                    n_features
                )));
            }
        }

        if let Some((token, index)) = artifact
            .vectorizer
            .vocabulary
            .iter()
            .find(|(_, index)| **index >= n_features)
        {
            return Err(Error::Model(format!(
                "Vocabulary index {} for '{}' out of range ({} features)",
                index, token, n_features
            )));
        }

        if let Some(idf) = &artifact.vectorizer.idf {
            if idf.len() != n_features {
                return Err(Error::Model(format!(
                    "idf has {} entries, expected {}",
                    idf.len(),
                    n_features
                )));
            }
        }

        if artifact.vectorizer.min_token_len == 0 {
            return Err(Error::Model("min_token_len must be at least 1".to_string()));
        }

        Ok(Self {
            model_type: artifact.model_type,
            version: artifact.version.unwrap_or_else(|| "unknown".to_string()),
            classes: artifact.classes,
            class_log_prior: artifact.class_log_prior,
            feature_log_prob: artifact.feature_log_prob,
            vocabulary: artifact.vectorizer.vocabulary,
            idf: artifact.vectorizer.idf,
            min_token_len: artifact.vectorizer.min_token_len,
        })
    }

    /// Number of vocabulary features
    pub fn feature_count(&self) -> usize {
        self.vocabulary.len()
    }

    /// Sparse, L2-normalized TF-IDF vector for normalized text
    fn transform(&self, text: &str) -> Vec<(usize, f64)> {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in text
            .split_whitespace()
            .filter(|t| t.chars().count() >= self.min_token_len)
        {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        if let Some(idf) = &self.idf {
            for (index, value) in counts.iter_mut() {
                *value *= idf[*index];
            }
        }

        let norm = counts.values().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in counts.values_mut() {
                *value /= norm;
            }
        }

        counts.into_iter().collect()
    }

    /// Class probabilities via softmax over joint log likelihoods
    fn predict_proba(&self, features: &[(usize, f64)]) -> Result<Vec<f64>> {
        let jll: Vec<f64> = self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, row)| {
                prior + features.iter().map(|(i, x)| x * row[*i]).sum::<f64>()
            })
            .collect();

        if jll.iter().any(|v| !v.is_finite()) {
            return Err(Error::Model("Non-finite log likelihood".to_string()));
        }

        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = jll.iter().map(|v| (v - max).exp()).collect();
        let total: f64 = exp.iter().sum();

        Ok(exp.into_iter().map(|v| v / total).collect())
    }
}

impl Classifier for NaiveBayesClassifier {
    fn classify(&self, text: &str) -> Result<Prediction> {
        let features = self.transform(text);
        let probabilities = self.predict_proba(&features)?;

        // First class wins ties
        let mut best = 0;
        for (index, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = index;
            }
        }

        debug!(
            features = features.len(),
            category = %self.classes[best],
            confidence = probabilities[best],
            "Naive Bayes prediction"
        );

        let distribution = self
            .classes
            .iter()
            .cloned()
            .zip(probabilities)
            .collect();

        Ok(Prediction::new(self.classes[best].clone(), distribution))
    }

    fn name(&self) -> &str {
        &self.model_type
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn categories(&self) -> Vec<String> {
        self.classes.clone()
    }
}
