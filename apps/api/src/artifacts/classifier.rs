//! Pre-trained category classifiers.
//!
//! Two backends share the `Classifier` trait:
//! - `LinearClassifier`: one weight row per class (or a single row for binary
//!   models), prediction is the argmax of `w·x + b`.
//! - `SvcClassifier`: libsvm-style support-vector model with one-vs-one voting.
//!
//! Both return a class *index*; `LabelEncoder` turns it into a name.

use serde::{Deserialize, Serialize};

use crate::artifacts::vectorizer::FeatureVector;
use crate::artifacts::ModelError;

pub trait Classifier: Send + Sync {
    /// Predicts the class index for a feature vector.
    fn predict(&self, features: &FeatureVector) -> Result<usize, ModelError>;

    /// Number of distinct classes the model can output.
    fn n_classes(&self) -> usize;

    /// Expected feature dimension.
    fn dim(&self) -> usize;
}

// ────────────────────────────────────────────────────────────────────────────
// On-disk form of clf.json
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    Linear {
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    Svc {
        kernel: Kernel,
        #[serde(default)]
        gamma: f64,
        #[serde(default)]
        coef0: f64,
        #[serde(default = "default_degree")]
        degree: i32,
        support_vectors: Vec<Vec<f64>>,
        n_support: Vec<usize>,
        dual_coef: Vec<Vec<f64>>,
        rho: Vec<f64>,
    },
}

fn default_degree() -> i32 {
    3
}

impl ClassifierArtifact {
    pub fn build(self) -> Result<Box<dyn Classifier>, ModelError> {
        match self {
            ClassifierArtifact::Linear { coef, intercept } => {
                Ok(Box::new(LinearClassifier::new(coef, intercept)?))
            }
            ClassifierArtifact::Svc {
                kernel,
                gamma,
                coef0,
                degree,
                support_vectors,
                n_support,
                dual_coef,
                rho,
            } => Ok(Box::new(SvcClassifier::new(
                KernelParams {
                    kernel,
                    gamma,
                    coef0,
                    degree,
                },
                support_vectors,
                n_support,
                dual_coef,
                rho,
            )?)),
        }
    }
}

fn check_feature_dim(features: &FeatureVector, expected: usize) -> Result<(), ModelError> {
    if features.dim() != expected {
        return Err(ModelError::DimensionMismatch {
            expected,
            actual: features.dim(),
        });
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// LinearClassifier
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LinearClassifier {
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    dim: usize,
}

impl LinearClassifier {
    pub fn new(coef: Vec<Vec<f64>>, intercept: Vec<f64>) -> Result<Self, ModelError> {
        if coef.is_empty() {
            return Err(ModelError::Invalid("linear model has no weight rows".into()));
        }
        if coef.len() != intercept.len() {
            return Err(ModelError::Invalid(format!(
                "linear model has {} weight rows but {} intercepts",
                coef.len(),
                intercept.len()
            )));
        }
        let dim = coef[0].len();
        if coef.iter().any(|row| row.len() != dim) {
            return Err(ModelError::Invalid(
                "linear model weight rows differ in length".into(),
            ));
        }
        Ok(Self {
            coef,
            intercept,
            dim,
        })
    }

    fn decision(&self, row: usize, features: &FeatureVector) -> f64 {
        features.dot_dense(&self.coef[row]) + self.intercept[row]
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<usize, ModelError> {
        check_feature_dim(features, self.dim)?;

        // Binary models store one row: positive decision means class 1.
        if self.coef.len() == 1 {
            return Ok(usize::from(self.decision(0, features) > 0.0));
        }

        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for row in 0..self.coef.len() {
            let score = self.decision(row, features);
            if score > best_score {
                best = row;
                best_score = score;
            }
        }
        Ok(best)
    }

    fn n_classes(&self) -> usize {
        if self.coef.len() == 1 {
            2
        } else {
            self.coef.len()
        }
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SvcClassifier
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    Linear,
    Rbf,
    Poly,
    Sigmoid,
}

#[derive(Debug, Clone, Copy)]
pub struct KernelParams {
    pub kernel: Kernel,
    pub gamma: f64,
    pub coef0: f64,
    pub degree: i32,
}

impl KernelParams {
    fn eval(&self, sv: &[f64], sv_norm_sq: f64, x: &FeatureVector, x_norm_sq: f64) -> f64 {
        let dot = x.dot_dense(sv);
        match self.kernel {
            Kernel::Linear => dot,
            Kernel::Rbf => {
                let dist_sq = (x_norm_sq + sv_norm_sq - 2.0 * dot).max(0.0);
                (-self.gamma * dist_sq).exp()
            }
            Kernel::Poly => (self.gamma * dot + self.coef0).powi(self.degree),
            Kernel::Sigmoid => (self.gamma * dot + self.coef0).tanh(),
        }
    }
}

/// Support-vector classifier evaluated with one-vs-one voting.
///
/// Support vectors are grouped by class (`n_support[c]` consecutive rows per
/// class). `dual_coef` has `n_classes - 1` rows and `rho` one entry per class
/// pair in `(0,1), (0,2), …, (1,2), …` order.
#[derive(Debug, Clone)]
pub struct SvcClassifier {
    params: KernelParams,
    support_vectors: Vec<Vec<f64>>,
    sv_norms_sq: Vec<f64>,
    /// First support-vector row of each class.
    starts: Vec<usize>,
    n_support: Vec<usize>,
    dual_coef: Vec<Vec<f64>>,
    rho: Vec<f64>,
    dim: usize,
}

impl SvcClassifier {
    pub fn new(
        params: KernelParams,
        support_vectors: Vec<Vec<f64>>,
        n_support: Vec<usize>,
        dual_coef: Vec<Vec<f64>>,
        rho: Vec<f64>,
    ) -> Result<Self, ModelError> {
        let n_classes = n_support.len();
        if n_classes < 2 {
            return Err(ModelError::Invalid(format!(
                "svc model needs at least 2 classes, got {n_classes}"
            )));
        }
        let n_sv: usize = n_support.iter().sum();
        if support_vectors.len() != n_sv {
            return Err(ModelError::Invalid(format!(
                "n_support sums to {n_sv} but {} support vectors were given",
                support_vectors.len()
            )));
        }
        if dual_coef.len() != n_classes - 1 || dual_coef.iter().any(|row| row.len() != n_sv) {
            return Err(ModelError::Invalid(format!(
                "dual_coef must be {} x {n_sv}",
                n_classes - 1
            )));
        }
        let n_pairs = n_classes * (n_classes - 1) / 2;
        if rho.len() != n_pairs {
            return Err(ModelError::Invalid(format!(
                "rho must have {n_pairs} entries, got {}",
                rho.len()
            )));
        }
        let dim = support_vectors.first().map_or(0, Vec::len);
        if support_vectors.iter().any(|sv| sv.len() != dim) {
            return Err(ModelError::Invalid(
                "support vectors differ in length".into(),
            ));
        }

        let starts: Vec<usize> = n_support
            .iter()
            .scan(0, |acc, &n| {
                let start = *acc;
                *acc += n;
                Some(start)
            })
            .collect();
        let sv_norms_sq: Vec<f64> = support_vectors
            .iter()
            .map(|sv| sv.iter().map(|v| v * v).sum::<f64>())
            .collect();

        Ok(Self {
            params,
            support_vectors,
            sv_norms_sq,
            starts,
            n_support,
            dual_coef,
            rho,
            dim,
        })
    }
}

impl Classifier for SvcClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<usize, ModelError> {
        check_feature_dim(features, self.dim)?;

        let x_norm_sq = features.norm().powi(2);
        let kvalues: Vec<f64> = self
            .support_vectors
            .iter()
            .zip(&self.sv_norms_sq)
            .map(|(sv, &sv_norm_sq)| self.params.eval(sv, sv_norm_sq, features, x_norm_sq))
            .collect();

        let n_classes = self.n_support.len();
        let mut votes = vec![0u32; n_classes];
        let mut pair = 0;
        for i in 0..n_classes {
            for j in (i + 1)..n_classes {
                let (si, ni) = (self.starts[i], self.n_support[i]);
                let (sj, nj) = (self.starts[j], self.n_support[j]);
                let coef_i = &self.dual_coef[j - 1];
                let coef_j = &self.dual_coef[i];

                let mut sum: f64 = (si..si + ni).map(|k| coef_i[k] * kvalues[k]).sum();
                sum += (sj..sj + nj).map(|k| coef_j[k] * kvalues[k]).sum::<f64>();
                sum -= self.rho[pair];

                if sum > 0.0 {
                    votes[i] += 1;
                } else {
                    votes[j] += 1;
                }
                pair += 1;
            }
        }

        // Most votes wins; lowest index on ties.
        let mut best = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }
        Ok(best)
    }

    fn n_classes(&self) -> usize {
        self.n_support.len()
    }

    fn dim(&self) -> usize {
        self.dim
    }
}
