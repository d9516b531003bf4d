//! TF-IDF vectorizer — the transform half of a bag-of-words model fitted offline.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::artifacts::ModelError;

/// Tokens are runs of two or more word characters.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Sparse feature vector with a fixed dimension. Entries are sorted by column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Builds a vector from `(column, weight)` pairs. Zero weights are dropped
    /// and entries are sorted by column.
    pub fn from_entries(dim: usize, mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|&(_, w)| w != 0.0);
        entries.sort_by_key(|&(col, _)| col);
        Self { dim, entries }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Sparse · sparse dot product (merge over sorted columns).
    pub fn dot(&self, other: &FeatureVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (ci, wi) = self.entries[i];
            let (cj, wj) = other.entries[j];
            match ci.cmp(&cj) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wi * wj;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Sparse · dense dot product. Columns past the end of `dense` count as zero.
    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|&(col, w)| dense.get(col).map(|d| w * d))
            .sum()
    }
}

/// Anything that turns normalized text into a fixed-dimension feature vector.
pub trait Vectorizer: Send + Sync {
    fn vectorize(&self, text: &str) -> FeatureVector;

    /// Dimension of every vector this vectorizer produces.
    fn dim(&self) -> usize;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Norm {
    #[default]
    L2,
    L1,
    None,
}

fn default_ngram_range() -> [usize; 2] {
    [1, 1]
}

fn default_true() -> bool {
    true
}

/// On-disk form of `tfidf.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfArtifact {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: [usize; 2],
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: Norm,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default)]
    pub stop_words: Vec<String>,
}

/// Fitted TF-IDF transform.
///
/// Tokenizes with `\b\w\w+\b`, drops stop words, expands word n-grams, keeps
/// in-vocabulary terms, weights `tf * idf`, then normalizes.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    min_n: usize,
    max_n: usize,
    sublinear_tf: bool,
    norm: Norm,
    lowercase: bool,
    stop_words: HashSet<String>,
}

impl TfidfVectorizer {
    pub fn from_artifact(artifact: TfidfArtifact) -> Result<Self, ModelError> {
        let dim = artifact.idf.len();
        if let Some((term, &idx)) = artifact.vocabulary.iter().find(|(_, &idx)| idx >= dim) {
            return Err(ModelError::Invalid(format!(
                "vocabulary term '{term}' maps to column {idx}, but idf has {dim} entries"
            )));
        }
        let [min_n, max_n] = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelError::Invalid(format!(
                "invalid ngram_range [{min_n}, {max_n}]"
            )));
        }

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            min_n,
            max_n,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
            lowercase: artifact.lowercase,
            stop_words: artifact.stop_words.into_iter().collect(),
        })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        TOKEN_RE
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|tok| !self.stop_words.contains(*tok))
            .collect()
    }

    /// Counts in-vocabulary n-grams per column, in column order.
    fn term_counts(&self, tokens: &[&str]) -> BTreeMap<usize, u32> {
        let mut counts = BTreeMap::new();
        for n in self.min_n..=self.max_n {
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&col) = self.vocabulary.get(&term) {
                    *counts.entry(col).or_insert(0) += 1;
                }
            }
        }
        counts
    }
}

impl Vectorizer for TfidfVectorizer {
    fn vectorize(&self, text: &str) -> FeatureVector {
        let folded;
        let text = if self.lowercase {
            folded = text.to_lowercase();
            folded.as_str()
        } else {
            text
        };

        let tokens = self.tokenize(text);
        let mut entries: Vec<(usize, f64)> = self
            .term_counts(&tokens)
            .into_iter()
            .map(|(col, count)| {
                let tf = if self.sublinear_tf {
                    1.0 + f64::from(count).ln()
                } else {
                    f64::from(count)
                };
                (col, tf * self.idf[col])
            })
            .collect();

        let scale = match self.norm {
            Norm::L2 => entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt(),
            Norm::L1 => entries.iter().map(|(_, w)| w.abs()).sum::<f64>(),
            Norm::None => 1.0,
        };
        if scale > 0.0 {
            for (_, w) in entries.iter_mut() {
                *w /= scale;
            }
        }

        FeatureVector::from_entries(self.idf.len(), entries)
    }

    fn dim(&self) -> usize {
        self.idf.len()
    }
}
