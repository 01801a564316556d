use std::sync::Arc;

use anyhow::Result;

use crate::error::PipelineError;
use crate::features::build_features;
use crate::labels::{Label, LabelMap};
use crate::types::{FeatureVector, LandmarkSet};

/// A loaded model that scores one feature vector.
///
/// Implementations are shared read-only by every session, hence `Send + Sync`.
pub trait Classifier: Send + Sync {
    fn name(&self) -> String;
    fn scores(&self, features: &FeatureVector) -> Result<Vec<f32>>;
}

/// Stand-in used when the model could not be loaded at startup.
/// Every prediction fails, the service itself stays up.
pub struct UnavailableClassifier {
    reason: String,
}

impl UnavailableClassifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl Classifier for UnavailableClassifier {
    fn name(&self) -> String {
        "unavailable".to_string()
    }

    fn scores(&self, _features: &FeatureVector) -> Result<Vec<f32>> {
        Err(PipelineError::ModelUnavailable(self.reason.clone()).into())
    }
}

/// What startup managed to load, kept around for the health endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelStatus {
    Ready { name: String },
    Unavailable { reason: String },
}

/// Index of the highest score; the first one wins on ties and NaNs never win.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if s.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

/// Landmarks → features → scores → label. Holds no per-call state.
#[derive(Clone)]
pub struct InferencePipeline {
    classifier: Arc<dyn Classifier>,
    labels: Arc<LabelMap>,
}

impl InferencePipeline {
    pub fn new(classifier: Arc<dyn Classifier>, labels: LabelMap) -> Self {
        Self {
            classifier,
            labels: Arc::new(labels),
        }
    }

    pub fn name(&self) -> String {
        self.classifier.name()
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn predict(&self, set: &LandmarkSet) -> Result<Label, PipelineError> {
        let features = build_features(set);
        let scores = self.classifier.scores(&features).map_err(|e| {
            match e.downcast::<PipelineError>() {
                Ok(pe) => pe,
                Err(other) => PipelineError::Backend(other),
            }
        })?;
        let index = argmax(&scores).ok_or(PipelineError::EmptyOutput)?;
        Ok(self.labels.label(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Landmark, LANDMARK_COUNT};
    use std::sync::Mutex;

    /// Puts the top score on a fixed class and records what it was fed.
    struct FixedClassifier {
        winner: usize,
        classes: usize,
        seen: Mutex<Vec<FeatureVector>>,
    }

    impl FixedClassifier {
        fn new(winner: usize, classes: usize) -> Self {
            Self { winner, classes, seen: Mutex::new(Vec::new()) }
        }
    }

    impl Classifier for FixedClassifier {
        fn name(&self) -> String {
            "fixed".to_string()
        }

        fn scores(&self, features: &FeatureVector) -> Result<Vec<f32>> {
            self.seen.lock().unwrap().push(*features);
            let mut scores = vec![0.0; self.classes];
            if self.winner < self.classes {
                scores[self.winner] = 1.0;
            }
            Ok(scores)
        }
    }

    fn hand() -> LandmarkSet {
        let points: Vec<Landmark> = (0..LANDMARK_COUNT)
            .map(|i| Landmark::new(0.5 + i as f64 * 0.01, 0.5, 0.0))
            .collect();
        LandmarkSet::try_from(points).unwrap()
    }

    #[test]
    fn argmax_picks_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.9, 0.3, 0.9]), Some(1));
        assert_eq!(argmax(&[-3.0, -1.0, -2.0]), Some(1));
        assert_eq!(argmax(&[f32::NAN, 0.2, 0.1]), Some(1));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[f32::NAN]), None);
    }

    #[test]
    fn predicts_mapped_letter() {
        let classifier = Arc::new(FixedClassifier::new(2, 26));
        let pipeline = InferencePipeline::new(classifier.clone(), LabelMap::sibi());

        let label = pipeline.predict(&hand()).unwrap();
        assert_eq!(label, Label::Letter('C'));

        let seen = classifier.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_slice().len(), 63);
        assert_eq!(seen[0].0[0], 0.0);
    }

    #[test]
    fn out_of_table_index_is_unknown() {
        let pipeline = InferencePipeline::new(Arc::new(FixedClassifier::new(29, 30)), LabelMap::sibi());
        assert_eq!(pipeline.predict(&hand()).unwrap(), Label::Unknown);
    }

    #[test]
    fn empty_scores_fail() {
        let pipeline = InferencePipeline::new(Arc::new(FixedClassifier::new(0, 0)), LabelMap::sibi());
        assert!(matches!(pipeline.predict(&hand()), Err(PipelineError::EmptyOutput)));
    }

    #[test]
    fn unavailable_model_fails_every_prediction() {
        let pipeline = InferencePipeline::new(
            Arc::new(UnavailableClassifier::new("models/missing.onnx not found")),
            LabelMap::sibi(),
        );
        match pipeline.predict(&hand()) {
            Err(PipelineError::ModelUnavailable(reason)) => assert!(reason.contains("missing")),
            other => panic!("expected ModelUnavailable, got {:?}", other),
        }
    }
}
