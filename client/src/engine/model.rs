//! Bounded model streaming
//!
//! A model request is polled once per frame and gives up after a fixed
//! number of polls instead of spinning until the engine delivers.

use thiserror::Error;

use super::Engine;

/// Polls granted to a model load when nothing is configured
pub const DEFAULT_MODEL_LOAD_ATTEMPTS: u32 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelLoadError {
    #[error("model '{0}' is not known to the engine")]
    Invalid(String),
    #[error("model '{0}' is not part of the game assets")]
    NotInImage(String),
    #[error("model '{model}' did not load after {attempts} attempts")]
    Timeout { model: String, attempts: u32 },
}

/// Result of one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLoad {
    Pending,
    Ready,
    Failed(ModelLoadError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    model: String,
    attempts: u32,
    max_attempts: u32,
}

impl ModelRequest {
    /// Ask the engine to stream `model` in
    pub fn start<E: Engine + ?Sized>(engine: &mut E, model: &str, max_attempts: u32) -> Self {
        engine.request_model(model);
        log::debug!("Requested model {}", model);
        Self {
            model: model.to_string(),
            attempts: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn poll<E: Engine + ?Sized>(&mut self, engine: &E) -> ModelLoad {
        if engine.has_model_loaded(&self.model) {
            return ModelLoad::Ready;
        }

        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            return ModelLoad::Failed(ModelLoadError::Timeout {
                model: self.model.clone(),
                attempts: self.attempts,
            });
        }
        ModelLoad::Pending
    }

    /// Hand the model back to the engine
    pub fn release<E: Engine + ?Sized>(self, engine: &mut E) {
        engine.release_model(&self.model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SandboxEngine;

    #[test]
    fn test_request_becomes_ready_after_stream_delay() {
        let mut engine = SandboxEngine::new();
        engine.set_stream_frames(2);

        let mut request = ModelRequest::start(&mut engine, "prop_idol_01", 10);
        assert_eq!(request.poll(&engine), ModelLoad::Pending);
        engine.advance_streaming();
        assert_eq!(request.poll(&engine), ModelLoad::Pending);
        engine.advance_streaming();
        assert_eq!(request.poll(&engine), ModelLoad::Ready);
        assert_eq!(request.attempts(), 2);
    }

    #[test]
    fn test_request_times_out() {
        let mut engine = SandboxEngine::new();
        engine.set_stream_frames(u32::MAX);

        let mut request = ModelRequest::start(&mut engine, "prop_idol_01", 3);
        assert_eq!(request.poll(&engine), ModelLoad::Pending);
        assert_eq!(request.poll(&engine), ModelLoad::Pending);
        assert_eq!(
            request.poll(&engine),
            ModelLoad::Failed(ModelLoadError::Timeout {
                model: "prop_idol_01".to_string(),
                attempts: 3,
            })
        );
    }

    #[test]
    fn test_release_unloads_model() {
        let mut engine = SandboxEngine::new();
        engine.set_stream_frames(0);

        let mut request = ModelRequest::start(&mut engine, "prop_idol_01", 3);
        assert_eq!(request.poll(&engine), ModelLoad::Ready);
        request.release(&mut engine);
        assert!(!engine.has_model_loaded("prop_idol_01"));
    }
}
