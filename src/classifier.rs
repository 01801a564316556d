use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use anyhow::{anyhow, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use tracing::{debug, error, info};

use crate::config::ModelConfig;
use crate::pipeline::{Classifier, ModelStatus, UnavailableClassifier};
use crate::types::{FeatureVector, FEATURE_LEN};

/// A fixed set of interchangeable sessions.
///
/// ort runs a session through `&mut`, so each one is behind its own lock;
/// a caller takes whichever is free and only waits when all of them are busy.
pub struct SessionPool<T> {
    slots: Vec<Mutex<T>>,
    next: AtomicUsize,
}

impl<T> SessionPool<T> {
    pub fn new(slots: Vec<T>) -> Result<Self> {
        if slots.is_empty() {
            return Err(anyhow!("session pool needs at least one session"));
        }
        Ok(Self {
            slots: slots.into_iter().map(Mutex::new).collect(),
            next: AtomicUsize::new(0),
        })
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn checkout(&self) -> Result<MutexGuard<'_, T>> {
        let start = self.next.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        for offset in 0..self.slots.len() {
            let i = (start + offset) % self.slots.len();
            match self.slots[i].try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::WouldBlock) => continue,
                Err(TryLockError::Poisoned(_)) => return Err(anyhow!("model session {} poisoned", i)),
            }
        }

        debug!("all {} model sessions busy, waiting", self.slots.len());
        self.slots[start]
            .lock()
            .map_err(|_| anyhow!("model session {} poisoned", start))
    }
}

/// ONNX export of the 1D-CNN alphabet model: input `[1, 63, 1]`, output
/// `[1, 26]` class scores.
pub struct OnnxClassifier {
    pool: SessionPool<Session>,
    path: String,
}

impl OnnxClassifier {
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let model_path = config.path.as_str();
        if !Path::new(model_path).exists() {
            return Err(anyhow!("model file not found at {}", model_path));
        }

        let count = config.sessions.max(1);
        let mut sessions = Vec::with_capacity(count);
        for _ in 0..count {
            let session = Session::builder()?
                .with_optimization_level(GraphOptimizationLevel::Level3)?
                .with_intra_threads(config.intra_threads.max(1))?
                .with_execution_providers([
                    ort::execution_providers::CPUExecutionProvider::default().build(),
                ])?
                .commit_from_file(model_path)
                .with_context(|| format!("failed to load model from {}", model_path))?;
            sessions.push(session);
        }

        Ok(Self {
            pool: SessionPool::new(sessions)?,
            path: model_path.to_string(),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> String {
        format!("CNN alphabet ({}, {} sessions)", self.path, self.pool.size())
    }

    fn scores(&self, features: &FeatureVector) -> Result<Vec<f32>> {
        // (batch, channels, length)
        let shape = vec![1_i64, FEATURE_LEN as i64, 1];
        let input = Tensor::from_array((shape, features.as_slice().to_vec()))?;

        let mut session = self.pool.checkout()?;
        let outputs = session.run(ort::inputs![input])?;
        let (_shape, scores) = outputs[0].try_extract_tensor::<f32>()?;
        Ok(scores.to_vec())
    }
}

/// Load the model once at startup.
///
/// A failed load is logged and turned into an [`UnavailableClassifier`] so the
/// service still comes up; the returned status tells the caller which it got.
pub fn load_classifier(config: &ModelConfig) -> (Arc<dyn Classifier>, ModelStatus) {
    match OnnxClassifier::load(config) {
        Ok(model) => {
            info!("Model loaded successfully from {}", config.path);
            let status = ModelStatus::Ready { name: model.name() };
            (Arc::new(model), status)
        }
        Err(e) => {
            error!("Error loading model: {:#}", e);
            let reason = format!("{:#}", e);
            (
                Arc::new(UnavailableClassifier::new(reason.clone())),
                ModelStatus::Unavailable { reason },
            )
        }
    }
}
