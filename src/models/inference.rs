//! Inference engine: prediction plus explanation for one record

use crate::config::AppConfig;
use crate::error::ModelError;
use crate::models::loader::ModelLoader;
use crate::models::{Classifier, Explainer};
use crate::types::{Evaluation, TransactionRecord, Verdict};
use anyhow::{bail, Result};
use tracing::{debug, info};

/// Predictor and explainer, loaded once and read-only afterwards
pub struct InferenceEngine {
    classifier: Box<dyn Classifier>,
    explainer: Box<dyn Explainer>,
}

impl InferenceEngine {
    /// Load both artifacts named in the configuration.
    ///
    /// Fails if either artifact is missing or malformed.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.models.onnx_threads);
        let classifier = loader.load_classifier(&config.models)?;
        let explainer = loader.load_explainer(&config.models.explainer_path)?;
        ensure_compatible(classifier.as_ref(), explainer.as_ref())?;

        info!(
            model = %classifier.name(),
            features = classifier.feature_names().len(),
            "Inference engine initialized"
        );

        Ok(Self::from_parts(classifier, explainer))
    }

    /// Build an engine from already constructed components
    pub fn from_parts(classifier: Box<dyn Classifier>, explainer: Box<dyn Explainer>) -> Self {
        Self {
            classifier,
            explainer,
        }
    }

    /// Loaded model name
    pub fn model_name(&self) -> &str {
        self.classifier.name()
    }

    /// Score and explain one record.
    ///
    /// The first failing step aborts the evaluation; nothing is retried.
    pub fn evaluate(&self, record: &TransactionRecord) -> Result<Evaluation, ModelError> {
        let label = self.classifier.predict(record)?;
        let probabilities = self.classifier.predict_proba(record)?;
        let verdict = Verdict::from_label(label)?;

        debug!(
            model = %self.classifier.name(),
            label = label,
            fraud_probability = probabilities.fraud(),
            "Prediction complete"
        );

        let features = self.classifier.feature_transform(record)?;
        let feature_names = self.classifier.feature_names();
        if features.len() != feature_names.len() {
            return Err(ModelError::DimensionMismatch {
                expected: feature_names.len(),
                actual: features.len(),
            });
        }

        let explanation = self.explainer.explain(&features, &feature_names)?;
        explanation.check_shape(feature_names.len())?;

        debug!(
            base_value = explanation.base_value,
            output_value = explanation.output_value(),
            "Explanation complete"
        );

        Ok(Evaluation::new(record.clone(), verdict, probabilities, explanation))
    }
}

/// Both artifacts must agree on the transformed feature count
fn ensure_compatible(classifier: &dyn Classifier, explainer: &dyn Explainer) -> Result<()> {
    let features = classifier.feature_names().len();
    if let Some(expected) = explainer.expected_features() {
        if expected != features {
            bail!(
                "Explainer expects {} features but model {} produces {}",
                expected,
                classifier.name(),
                features
            );
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::explainer::LinearExplainer;
    use crate::models::logistic::{LogisticPipeline, LogisticRegression};
    use crate::preprocessor::Preprocessor;
    use crate::types::{ClassProbabilities, Explanation, TransactionType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Classifier returning fixed outputs
    pub(crate) struct StubClassifier {
        pub label: i64,
        pub probabilities: ClassProbabilities,
        pub fail_transform: bool,
        pub calls: Arc<AtomicUsize>,
    }

    impl StubClassifier {
        pub(crate) fn new(label: i64, fraud: f64) -> Self {
            Self {
                label,
                probabilities: ClassProbabilities::from_fraud(fraud),
                fail_transform: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Classifier for StubClassifier {
        fn predict_proba(&self, _record: &TransactionRecord) -> Result<ClassProbabilities, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.probabilities)
        }

        fn predict(&self, _record: &TransactionRecord) -> Result<i64, ModelError> {
            Ok(self.label)
        }

        fn feature_transform(&self, record: &TransactionRecord) -> Result<Vec<f64>, ModelError> {
            if self.fail_transform {
                return Err(ModelError::Backend("prep step missing".to_string()));
            }
            Ok(vec![record.amount, record.old_balance_orig])
        }

        fn feature_names(&self) -> Vec<String> {
            vec!["num__amount".to_string(), "num__oldbalanceOrg".to_string()]
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    /// Explainer attributing each feature its own value
    pub(crate) struct IdentityExplainer;

    /// Explainer that drops the last feature name
    struct TruncatingExplainer;

    impl Explainer for TruncatingExplainer {
        fn explain(&self, features: &[f64], feature_names: &[String]) -> Result<Explanation, ModelError> {
            let mut explanation = IdentityExplainer.explain(features, feature_names)?;
            explanation.feature_names.pop();
            Ok(explanation)
        }
    }

    impl Explainer for IdentityExplainer {
        fn explain(&self, features: &[f64], feature_names: &[String]) -> Result<Explanation, ModelError> {
            Ok(Explanation {
                base_value: 0.0,
                feature_names: feature_names.to_vec(),
                data: features.to_vec(),
                values: features.to_vec(),
            })
        }
    }

    #[test]
    fn test_evaluate_fraud() {
        let engine = InferenceEngine::from_parts(
            Box::new(StubClassifier::new(1, 0.73)),
            Box::new(IdentityExplainer),
        );
        let record = TransactionRecord::new(TransactionType::Transfer, 5000.0);

        let eval = engine.evaluate(&record).unwrap();

        assert_eq!(eval.verdict, Verdict::Fraud);
        assert_eq!(eval.label, 1);
        assert_eq!(eval.fraud_percent(), "73.00%");
        assert_eq!(eval.explanation.values, vec![5000.0, 0.0]);
        assert_eq!(eval.record, record);
    }

    #[test]
    fn test_evaluate_legitimate() {
        let engine = InferenceEngine::from_parts(
            Box::new(StubClassifier::new(0, 0.02)),
            Box::new(IdentityExplainer),
        );
        let eval = engine.evaluate(&TransactionRecord::default()).unwrap();

        assert_eq!(eval.verdict, Verdict::Legitimate);
        assert_eq!(eval.verdict.message(), "This transaction looks like safe");
    }

    #[test]
    fn test_failure_aborts_evaluation() {
        let mut classifier = StubClassifier::new(1, 0.9);
        classifier.fail_transform = true;
        let engine = InferenceEngine::from_parts(Box::new(classifier), Box::new(IdentityExplainer));

        assert!(matches!(
            engine.evaluate(&TransactionRecord::default()),
            Err(ModelError::Backend(_))
        ));
    }

    #[test]
    fn test_invalid_label_rejected() {
        let engine = InferenceEngine::from_parts(
            Box::new(StubClassifier::new(7, 0.5)),
            Box::new(IdentityExplainer),
        );
        assert!(matches!(
            engine.evaluate(&TransactionRecord::default()),
            Err(ModelError::InvalidLabel(7))
        ));
    }

    #[test]
    fn test_each_trigger_is_independent() {
        let classifier = StubClassifier::new(1, 0.6);
        let calls = classifier.calls.clone();
        let engine = InferenceEngine::from_parts(Box::new(classifier), Box::new(IdentityExplainer));

        let first = TransactionRecord::new(TransactionType::Payment, 100.0);
        let second = TransactionRecord::new(TransactionType::CashOut, 5000.0)
            .with_sender_balances(5000.0, 0.0);

        let a = engine.evaluate(&first).unwrap();
        let b = engine.evaluate(&second).unwrap();

        assert_eq!(a.record, first);
        assert_eq!(b.record, second);
        assert_eq!(a.explanation.data, vec![100.0, 0.0]);
        assert_eq!(b.explanation.data, vec![5000.0, 5000.0]);
        assert_ne!(a.evaluation_id, b.evaluation_id);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_inconsistent_explanation_rejected() {
        let engine = InferenceEngine::from_parts(
            Box::new(StubClassifier::new(1, 0.9)),
            Box::new(TruncatingExplainer),
        );
        assert!(matches!(
            engine.evaluate(&TransactionRecord::default()),
            Err(ModelError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_mismatched_artifacts_rejected() {
        let model = LogisticPipeline::new(
            Preprocessor::new(),
            LogisticRegression {
                coefficients: vec![0.1; 10],
                intercept: -1.0,
            },
        );
        let short = LinearExplainer::new(vec![0.1; 3], -1.0, vec![0.0; 3]);
        let err = ensure_compatible(&model, &short).unwrap_err();
        assert!(err.to_string().contains("expects 3 features"));

        let full = LinearExplainer::new(vec![0.1; 10], -1.0, vec![0.0; 10]);
        assert!(ensure_compatible(&model, &full).is_ok());
        assert!(ensure_compatible(&model, &IdentityExplainer).is_ok());
    }

    #[test]
    fn test_new_fails_on_mismatched_artifacts() {
        let dir = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
        std::fs::create_dir_all(&dir).unwrap();

        let model = LogisticPipeline::new(
            Preprocessor::new(),
            LogisticRegression {
                coefficients: vec![0.1; 10],
                intercept: -1.0,
            },
        );
        let explainer = LinearExplainer::new(vec![0.1; 4], -1.0, vec![0.0; 4]);
        let model_path = dir.join("model.json");
        let explainer_path = dir.join("explainer.json");
        std::fs::write(&model_path, serde_json::to_string(&model).unwrap()).unwrap();
        std::fs::write(&explainer_path, serde_json::to_string(&explainer).unwrap()).unwrap();

        let mut config = AppConfig::default();
        config.models.model_path = model_path.to_string_lossy().into_owned();
        config.models.explainer_path = explainer_path.to_string_lossy().into_owned();
        assert!(InferenceEngine::new(&config).is_err());

        std::fs::remove_dir_all(dir).ok();
    }
}
