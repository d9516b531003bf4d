//! Model artifacts — the pre-fitted vectorizer, classifier, and label encoder.
//!
//! Loaded once at startup from `MODEL_DIR` and shared read-only across every
//! request as `Arc<ModelArtifacts>`.

pub mod classifier;
pub mod label_encoder;
pub mod vectorizer;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::info;

use crate::artifacts::classifier::{Classifier, ClassifierArtifact};
use crate::artifacts::label_encoder::LabelEncoder;
use crate::artifacts::vectorizer::{TfidfArtifact, TfidfVectorizer, Vectorizer};

pub const VECTORIZER_FILE: &str = "tfidf.json";
pub const CLASSIFIER_FILE: &str = "clf.json";
pub const ENCODER_FILE: &str = "encoder.json";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("classifier produced label index {index}, but only {n_classes} labels are known")]
    UnknownLabel { index: usize, n_classes: usize },
}

/// Immutable handle over the three fitted artifacts.
pub struct ModelArtifacts {
    vectorizer: Box<dyn Vectorizer>,
    classifier: Box<dyn Classifier>,
    labels: LabelEncoder,
}

impl ModelArtifacts {
    /// Assembles artifacts and checks they agree on feature dimension and class count.
    pub fn new(
        vectorizer: Box<dyn Vectorizer>,
        classifier: Box<dyn Classifier>,
        labels: LabelEncoder,
    ) -> Result<Self, ModelError> {
        if classifier.dim() != vectorizer.dim() {
            return Err(ModelError::Invalid(format!(
                "classifier expects {} features, vectorizer produces {}",
                classifier.dim(),
                vectorizer.dim()
            )));
        }
        if classifier.n_classes() != labels.classes().len() {
            return Err(ModelError::Invalid(format!(
                "classifier has {} classes, label encoder has {}",
                classifier.n_classes(),
                labels.classes().len()
            )));
        }
        Ok(Self {
            vectorizer,
            classifier,
            labels,
        })
    }

    /// Loads `tfidf.json`, `clf.json`, and `encoder.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, ModelError> {
        info!("Loading model artifacts from {}", dir.display());

        let tfidf: TfidfArtifact = read_json(&dir.join(VECTORIZER_FILE))?;
        let vectorizer = TfidfVectorizer::from_artifact(tfidf)?;
        info!(
            dim = vectorizer.dim(),
            vocabulary = vectorizer.vocabulary_size(),
            "Vectorizer loaded"
        );

        let clf: ClassifierArtifact = read_json(&dir.join(CLASSIFIER_FILE))?;
        let classifier = clf.build()?;
        info!(classes = classifier.n_classes(), "Classifier loaded");

        let encoder: EncoderFile = read_json(&dir.join(ENCODER_FILE))?;
        let labels = LabelEncoder::new(encoder.classes)?;

        Self::new(Box::new(vectorizer), classifier, labels)
    }

    pub fn vectorizer(&self) -> &dyn Vectorizer {
        self.vectorizer.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn labels(&self) -> &LabelEncoder {
        &self.labels
    }
}

#[derive(Deserialize)]
struct EncoderFile {
    classes: Vec<String>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let raw = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ModelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Small in-memory artifacts for unit tests.
#[cfg(test)]
pub mod fixtures {
    use std::sync::Arc;

    use super::*;
    use crate::artifacts::classifier::LinearClassifier;

    pub const TERMS: &[&str] = &["java", "backend", "developer", "python", "data", "science"];

    pub fn tfidf_artifact() -> TfidfArtifact {
        TfidfArtifact {
            vocabulary: TERMS
                .iter()
                .enumerate()
                .map(|(i, t)| (t.to_string(), i))
                .collect(),
            idf: vec![1.0, 1.2, 1.1, 1.0, 1.3, 1.4],
            ngram_range: [1, 1],
            sublinear_tf: false,
            norm: Default::default(),
            lowercase: true,
            stop_words: vec![],
        }
    }

    /// Class 0 = "Java Developer" (java/backend/developer),
    /// class 1 = "Data Science" (python/data/science).
    pub fn classifier_artifact() -> ClassifierArtifact {
        ClassifierArtifact::Linear {
            coef: vec![
                vec![1.0, 1.0, 1.0, -1.0, -1.0, -1.0],
                vec![-1.0, -1.0, -1.0, 1.0, 1.0, 1.0],
            ],
            intercept: vec![0.0, 0.0],
        }
    }

    pub fn labels() -> Vec<String> {
        vec!["Java Developer".to_string(), "Data Science".to_string()]
    }

    pub fn artifacts() -> Arc<ModelArtifacts> {
        let vectorizer = TfidfVectorizer::from_artifact(tfidf_artifact()).unwrap();
        let ClassifierArtifact::Linear { coef, intercept } = classifier_artifact() else {
            unreachable!()
        };
        let classifier = LinearClassifier::new(coef, intercept).unwrap();
        let labels = LabelEncoder::new(labels()).unwrap();
        Arc::new(ModelArtifacts::new(Box::new(vectorizer), Box::new(classifier), labels).unwrap())
    }
}
