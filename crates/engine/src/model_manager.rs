// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-slot model lifecycle manager.
//!
//! An engine process holds at most one model at a time. Loading replaces
//! the slot; a failed load leaves the slot empty. All operations are
//! serialized on one mutex — a load in progress blocks every other model
//! call, which is intentional (loads take seconds to minutes and nothing
//! useful can happen against a half-loaded slot).

use std::sync::Arc;

use hark_core::{Clock, SystemClock};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::info;

/// Request to load a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Engine-chosen alias the caller uses to address the model.
    pub model_id: String,
    /// Catalog identifier of the model artifact.
    pub model_name: String,
    /// Optional local path overriding catalog resolution.
    pub model_path: Option<String>,
    /// Execution providers in preference order; empty selects automatically.
    pub providers: Vec<String>,
    pub intra_op_threads: i32,
    pub vad_backend: String,
}

impl ModelSpec {
    pub fn new(model_id: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            model_name: model_name.into(),
            model_path: None,
            providers: Vec::new(),
            intra_op_threads: 8,
            vad_backend: "silero".to_string(),
        }
    }
}

/// A model resident in memory.
#[derive(Clone)]
pub struct LoadedModel<M> {
    pub spec: ModelSpec,
    pub handle: M,
    pub loaded_at_ms: u64,
    pub auth_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported model id: {0}")]
    Unsupported(String),
    #[error("model load failed: {0}")]
    Failed(String),
}

/// Engine-specific model construction, invoked under the manager lock.
pub type Loader<M> = Arc<dyn Fn(&ModelSpec, Option<&str>) -> Result<M, LoadError> + Send + Sync>;

/// Owns the single model slot of an engine process.
pub struct ModelManager<M> {
    loader: Loader<M>,
    /// Whether a changed auth token forces a reload for this spec.
    token_sensitive: fn(&ModelSpec) -> bool,
    slot: Mutex<Option<LoadedModel<M>>>,
}

impl<M: Clone> ModelManager<M> {
    pub fn new(loader: Loader<M>) -> Self {
        Self { loader, token_sensitive: |_| false, slot: Mutex::new(None) }
    }

    /// A manager whose `ensure_loaded` reloads when the auth token changes
    /// for specs matching the predicate (pyannote pipelines: the token
    /// scopes the model identity).
    pub fn with_token_sensitivity(loader: Loader<M>, token_sensitive: fn(&ModelSpec) -> bool) -> Self {
        Self { loader, token_sensitive, slot: Mutex::new(None) }
    }

    /// Load a model, replacing any currently loaded one. On failure the
    /// slot is left empty.
    pub fn load(&self, spec: ModelSpec, auth_token: Option<&str>) -> Result<LoadedModel<M>, LoadError> {
        let mut slot = self.slot.lock();
        *slot = None;
        let loaded = self.run_loader(&spec, auth_token)?;
        info!(model_id = %spec.model_id, model_name = %spec.model_name, "model loaded");
        *slot = Some(loaded.clone());
        Ok(loaded)
    }

    /// Unload the current model. With a `model_id`, unload only on match.
    /// Returns whether an unload occurred.
    pub fn unload(&self, model_id: Option<&str>) -> bool {
        let mut slot = self.slot.lock();
        match (&*slot, model_id) {
            (None, _) => false,
            (Some(loaded), Some(id)) if loaded.spec.model_id != id => false,
            (Some(loaded), _) => {
                info!(model_id = %loaded.spec.model_id, "model unloaded");
                *slot = None;
                true
            }
        }
    }

    pub fn get_loaded(&self) -> Option<LoadedModel<M>> {
        self.slot.lock().clone()
    }

    /// Idempotent load keyed by `model_id`. Reloads when the id differs
    /// or, for token-sensitive specs, when the auth token has changed.
    pub fn ensure_loaded(
        &self,
        spec: &ModelSpec,
        auth_token: Option<&str>,
    ) -> Result<LoadedModel<M>, LoadError> {
        let mut slot = self.slot.lock();
        let reload = match &*slot {
            None => true,
            Some(current) => {
                current.spec.model_id != spec.model_id
                    || ((self.token_sensitive)(spec)
                        && auth_token.is_some()
                        && current.auth_token.as_deref() != auth_token)
            }
        };
        if reload {
            *slot = None;
            let loaded = self.run_loader(spec, auth_token)?;
            info!(model_id = %spec.model_id, model_name = %spec.model_name, "model loaded");
            *slot = Some(loaded.clone());
            Ok(loaded)
        } else {
            // Checked non-empty above.
            slot.clone().ok_or_else(|| LoadError::Failed("model slot empty".to_string()))
        }
    }

    fn run_loader(&self, spec: &ModelSpec, auth_token: Option<&str>) -> Result<LoadedModel<M>, LoadError> {
        let handle = (self.loader)(spec, auth_token)?;
        Ok(LoadedModel {
            spec: spec.clone(),
            handle,
            loaded_at_ms: SystemClock.epoch_ms(),
            auth_token: auth_token.map(str::to_string),
        })
    }
}

#[cfg(test)]
#[path = "model_manager_tests.rs"]
mod tests;
