//! Scoring pass for the credit default model

use crate::features::{align_columns, FeatureEncoder};
use crate::model::scaler::StandardScaler;
use crate::types::{ClientRecord, Prediction};
use anyhow::{bail, Context, Result};
use ort::memory::Allocator;
use ort::session::Session;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::RwLock;
use tracing::debug;

/// Probability at or above which a client is predicted to default
pub const DECISION_THRESHOLD: f64 = 0.5;

/// A fitted binary classifier exposing its positive-class probability.
///
/// The production implementation runs an ONNX session; tests inject
/// fixed-probability mocks through the same seam.
pub trait ProbabilityClassifier: Send + Sync {
    fn predict_proba(&self, features: &[f64]) -> Result<f64>;
}

/// ONNX-backed classifier.
///
/// The session sits behind an `RwLock` because `Session::run` needs
/// exclusive access; the session itself is loaded once and never replaced.
pub struct OnnxClassifier {
    session: RwLock<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxClassifier {
    /// Wrap a loaded session, discovering its input and output names.
    pub fn from_session(session: Session) -> Self {
        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        Self {
            session: RwLock::new(session),
            input_name,
            output_name,
        }
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Extract the positive-class probability from session outputs.
    ///
    /// Handles both plain tensor outputs and the seq(map(int64, float))
    /// format scikit-learn ONNX exports produce for probabilities.
    fn extract_probability(&self, outputs: &ort::session::SessionOutputs) -> Result<f64> {
        // Try the discovered probability output by name first.
        if let Some(output) = outputs.get(&self.output_name) {
            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                if let Some(prob) = positive_prob_from_tensor(&shape, data) {
                    debug!(prob = prob, "Extracted probability from tensor");
                    return Ok(prob);
                }
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = extract_from_sequence_map(output) {
                    return Ok(prob);
                }
            }
        }

        // Fallback: scan all outputs, skipping the label tensor.
        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }

            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                if let Some(prob) = positive_prob_from_tensor(&shape, data) {
                    debug!(output = %name, prob = prob, "Extracted probability from tensor (fallback)");
                    return Ok(prob);
                }
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = extract_from_sequence_map(&output) {
                    return Ok(prob);
                }
            }
        }

        bail!("no probability output found in classifier outputs")
    }
}

impl ProbabilityClassifier for OnnxClassifier {
    fn predict_proba(&self, features: &[f64]) -> Result<f64> {
        use ort::value::Tensor;

        let input: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let shape = vec![1_i64, input.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, input)).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![&self.input_name => input_tensor])?;

        self.extract_probability(&outputs)
    }
}

/// Extract the positive-class probability from seq(map(int64, float))
/// output, the format used by scikit-learn's ZipMap node.
fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

    if maps.is_empty() {
        bail!("empty probability sequence");
    }

    // Batch size is always 1 here.
    let kv_pairs = maps[0].try_extract_key_values::<i64, f32>()?;

    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            return Ok(*prob as f64);
        }
    }

    // Some exports only carry the negative class.
    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - *prob as f64);
        }
    }

    bail!("no class probability found in map output")
}

/// Read the positive-class probability out of a probability tensor.
fn positive_prob_from_tensor(shape: &ort::tensor::Shape, data: &[f32]) -> Option<f64> {
    let dims: Vec<i64> = shape.iter().copied().collect();

    if dims.len() == 2 {
        let num_classes = dims[1] as usize;
        if num_classes >= 2 {
            // [batch, num_classes]: positive class is index 1
            return Some(data[1] as f64);
        } else if num_classes == 1 {
            return Some(data[0] as f64);
        }
    } else if dims.len() == 1 {
        let num_classes = dims[0] as usize;
        if num_classes >= 2 {
            return Some(data[1] as f64);
        } else if num_classes == 1 {
            return Some(data[0] as f64);
        }
    }

    None
}

/// Scale an aligned feature vector, classify it, and threshold the
/// resulting probability at [`DECISION_THRESHOLD`].
pub fn score(
    aligned: &[f64],
    scaler: &StandardScaler,
    classifier: &dyn ProbabilityClassifier,
) -> Result<Prediction> {
    let scaled = scaler.transform(aligned)?;
    let probability = classifier.predict_proba(&scaled)?;
    let label = u8::from(probability >= DECISION_THRESHOLD);

    Ok(Prediction {
        prediction: label,
        probability_default: probability,
    })
}

/// Immutable bundle of the three frozen artifacts.
///
/// Built once at startup and shared read-only by every request; no
/// request ever mutates it.
pub struct ScoringContext {
    classifier: Box<dyn ProbabilityClassifier>,
    scaler: StandardScaler,
    feature_columns: Vec<String>,
    encoder: FeatureEncoder,
}

impl ScoringContext {
    pub fn new(
        classifier: Box<dyn ProbabilityClassifier>,
        scaler: StandardScaler,
        feature_columns: Vec<String>,
    ) -> Self {
        Self {
            classifier,
            scaler,
            feature_columns,
            encoder: FeatureEncoder::new(),
        }
    }

    /// Number of columns in the training schema
    pub fn feature_count(&self) -> usize {
        self.feature_columns.len()
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Run the full scoring pass for one raw record:
    /// encode, align, scale, classify, threshold.
    pub fn predict(&self, record: &ClientRecord) -> Result<Prediction> {
        let encoded = self.encoder.encode(record);
        let aligned = align_columns(&encoded, &self.feature_columns);
        score(&aligned, &self.scaler, self.classifier.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Classifier returning a fixed probability regardless of input
    struct FixedClassifier(f64);

    impl ProbabilityClassifier for FixedClassifier {
        fn predict_proba(&self, _features: &[f64]) -> Result<f64> {
            Ok(self.0)
        }
    }

    /// Classifier capturing the features it was handed
    struct SpyClassifier {
        probability: f64,
        seen: Arc<Mutex<Vec<f64>>>,
    }

    impl ProbabilityClassifier for SpyClassifier {
        fn predict_proba(&self, features: &[f64]) -> Result<f64> {
            *self.seen.lock().unwrap() = features.to_vec();
            Ok(self.probability)
        }
    }

    fn schema(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_score_above_threshold() {
        let scaler = StandardScaler::identity(2);
        let result = score(&[1.0, 2.0], &scaler, &FixedClassifier(0.7)).unwrap();
        assert_eq!(result.prediction, 1);
        assert_eq!(result.probability_default, 0.7);
    }

    #[test]
    fn test_score_below_threshold() {
        let scaler = StandardScaler::identity(2);
        let result = score(&[1.0, 2.0], &scaler, &FixedClassifier(0.4)).unwrap();
        assert_eq!(result.prediction, 0);
        assert_eq!(result.probability_default, 0.4);
    }

    #[test]
    fn test_exact_threshold_predicts_default() {
        let scaler = StandardScaler::identity(2);
        let result = score(&[0.0, 0.0], &scaler, &FixedClassifier(0.5)).unwrap();
        assert_eq!(result.prediction, 1);
    }

    #[test]
    fn test_schema_mismatch_is_an_error() {
        // Scaler fitted on 3 columns, vector has 2: inconsistent artifacts.
        let scaler = StandardScaler::identity(3);
        assert!(score(&[1.0, 2.0], &scaler, &FixedClassifier(0.9)).is_err());
    }

    #[test]
    fn test_context_runs_full_pipeline() {
        let columns = schema(&["LIMIT_BAL", "AGE", "SEX_M", "SEX_F"]);
        let scaler = StandardScaler::new(vec![10000.0, 20.0, 0.0, 0.0], vec![2.0, 2.0, 1.0, 1.0]);
        let classifier = Box::new(SpyClassifier {
            probability: 0.8,
            seen: Arc::new(Mutex::new(Vec::new())),
        });

        let context = ScoringContext::new(classifier, scaler, columns);

        let mut record = ClientRecord::new(20000.0, 24);
        record.sex = "M".to_string();

        let prediction = context.predict(&record).unwrap();
        assert_eq!(prediction.prediction, 1);
        assert_eq!(prediction.probability_default, 0.8);
    }

    #[test]
    fn test_context_scales_aligned_vector() {
        let columns = schema(&["LIMIT_BAL", "AGE", "SEX_M", "SEX_F"]);
        let scaler = StandardScaler::new(vec![10000.0, 20.0, 0.0, 0.0], vec![2.0, 2.0, 1.0, 1.0]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let classifier = SpyClassifier {
            probability: 0.1,
            seen: seen.clone(),
        };

        let context = ScoringContext::new(Box::new(classifier), scaler, columns);

        let mut record = ClientRecord::new(20000.0, 24);
        record.sex = "M".to_string();
        context.predict(&record).unwrap();

        // aligned [20000, 24, 1, 0] scaled to [5000, 2, 1, 0]
        assert_eq!(*seen.lock().unwrap(), vec![5000.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_context_feature_count() {
        let columns = schema(&["LIMIT_BAL", "AGE"]);
        let context = ScoringContext::new(
            Box::new(FixedClassifier(0.5)),
            StandardScaler::identity(2),
            columns,
        );
        assert_eq!(context.feature_count(), 2);
    }
}
