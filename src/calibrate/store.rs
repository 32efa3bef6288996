//! The calibration model store: the only shared mutable resource on the calibration
//! path. All mutation happens under one mutex guard, so a promotion is atomic with
//! respect to readers and other writers.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{BucketKey, CalibrationModel, ModelState};

#[derive(Debug, Default)]
pub struct CalibrationStore {
    inner: Mutex<Vec<CalibrationModel>>,
}
impl CalibrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<CalibrationModel>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The active model for `(model_version, bucket)`, if one has been promoted.
    pub fn get_active(&self, model_version: &str, bucket: &BucketKey) -> Option<CalibrationModel> {
        self.guard()
            .iter()
            .find(|model| {
                model.state == ModelState::Active
                    && model.model_version == model_version
                    && model.bucket == *bucket
            })
            .cloned()
    }

    /// Every model ever recorded for `bucket`, in insertion order, including
    /// superseded ones. The audit trail is never pruned.
    pub fn list_all(&self, bucket: &BucketKey) -> Vec<CalibrationModel> {
        self.guard()
            .iter()
            .filter(|model| model.bucket == *bucket)
            .cloned()
            .collect()
    }

    /// Activates `model`, atomically superseding whichever model was active for the
    /// same (version, bucket). Activation is scoped per model version: promoting for
    /// version "v2" leaves "v1" models untouched.
    pub fn promote(&self, mut model: CalibrationModel) {
        let mut models = self.guard();
        for existing in models.iter_mut() {
            if existing.state == ModelState::Active
                && existing.model_version == model.model_version
                && existing.bucket == model.bucket
            {
                existing.state = ModelState::Superseded;
            }
        }
        debug!(
            "promoting {:?} model for ({}, {})",
            model.method, model.model_version, model.bucket
        );
        model.state = ModelState::Active;
        models.push(model);
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}
