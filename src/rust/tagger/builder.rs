use std::path::Path;
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};
use ort::session::Session;
use log::{info, error};

use super::error::TaggerError;
use super::encoding::SequenceClassification;
use super::labels::LabelSet;
use super::tagger::Tagger;
use crate::model_manager::{LABELS_FILE, MODEL_FILE, TOKENIZER_FILE};
use crate::{BuiltinModel, ModelManager, runtime::{RuntimeConfig, create_session_builder}};

/// Number of tags returned when `with_top_k` is not called.
pub const DEFAULT_TOP_K: usize = 5;

const REQUIRED_INPUTS: [&str; 2] = ["input_ids", "attention_mask"];

/// A builder for constructing a Tagger with a fluent interface.
#[derive(Debug)]
pub struct TaggerBuilder {
    model_name: Option<String>,
    model_path: Option<String>,
    tokenizer_path: Option<String>,
    labels_path: Option<String>,
    tokenizer: Option<Tokenizer>,
    session: Option<Session>,
    labels: Option<LabelSet>,
    max_sequence_length: Option<usize>,
    top_k: usize,
    runtime_config: RuntimeConfig,
}

impl Default for TaggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceClassification for TaggerBuilder {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        self.tokenizer.as_ref()
    }

    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn max_sequence_length(&self) -> Option<usize> {
        self.max_sequence_length
    }
}

impl TaggerBuilder {
    /// Creates a new empty TaggerBuilder instance with default configuration
    pub fn new() -> Self {
        Self {
            model_name: None,
            model_path: None,
            tokenizer_path: None,
            labels_path: None,
            tokenizer: None,
            session: None,
            labels: None,
            max_sequence_length: None,
            top_k: DEFAULT_TOP_K,
            runtime_config: RuntimeConfig::default(),
        }
    }

    /// Sets the runtime configuration for ONNX model execution.
    ///
    /// Must be called before a model is loaded to take effect.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Sets how many tags `predict` returns.
    ///
    /// # Errors
    /// `ValidationError` if `k` is zero.
    pub fn with_top_k(mut self, k: usize) -> Result<Self, TaggerError> {
        if k == 0 {
            return Err(TaggerError::ValidationError("top_k must be at least 1".into()));
        }
        self.top_k = k;
        Ok(self)
    }

    /// Loads a built-in model that `manager` has already downloaded.
    ///
    /// # Errors
    /// - `BuildError` if a model is already set or the files are missing
    /// - Any error from loading the tokenizer, model or labels
    pub fn with_model(self, model: BuiltinModel, manager: &ModelManager) -> Result<Self, TaggerError> {
        if !manager.is_model_downloaded(model.name()) {
            return Err(TaggerError::BuildError(format!(
                "Model '{}' is not downloaded. Please download it first using ModelManager::download_model()",
                model.name()
            )));
        }

        let max_len = model.characteristics().max_sequence_length;
        let mut builder = self.with_model_dir(manager.get_model_dir(model.name()), max_len)?;
        builder.model_name = Some(model.name().to_string());
        Ok(builder)
    }

    /// Loads `model.onnx`, `tokenizer.json` and `labels.json` from `dir`.
    ///
    /// The directory name becomes the model name.
    pub fn with_model_dir<P: AsRef<Path>>(
        self,
        dir: P,
        max_sequence_length: usize,
    ) -> Result<Self, TaggerError> {
        let dir = dir.as_ref();
        let model_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "custom".to_string());

        let mut builder = self.with_custom_model(
            &dir.join(MODEL_FILE).to_string_lossy(),
            &dir.join(TOKENIZER_FILE).to_string_lossy(),
            &dir.join(LABELS_FILE).to_string_lossy(),
            Some(max_sequence_length),
        )?;
        builder.model_name = Some(model_name);
        Ok(builder)
    }

    /// Sets explicit model, tokenizer and label file paths.
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `tokenizer_path` - Path to the tokenizer file
    /// * `labels_path` - Path to the JSON label set
    /// * `max_sequence_length` - Truncation length, 512 when `None`
    ///
    /// # Errors
    /// - `BuildError` if a path is empty, missing, or a model is already set
    /// - `BuildError` / `ModelError` if the tokenizer or model fails to load
    /// - `LabelError` if the label set is invalid
    pub fn with_custom_model(
        mut self,
        model_path: &str,
        tokenizer_path: &str,
        labels_path: &str,
        max_sequence_length: Option<usize>,
    ) -> Result<Self, TaggerError> {
        if model_path.is_empty() || tokenizer_path.is_empty() || labels_path.is_empty() {
            return Err(TaggerError::BuildError("Model, tokenizer and labels paths cannot be empty".to_string()));
        }
        if self.model_path.is_some() || self.tokenizer_path.is_some() {
            return Err(TaggerError::BuildError("Model and tokenizer paths already set".to_string()));
        }

        for (kind, path) in [("Model", model_path), ("Tokenizer", tokenizer_path), ("Labels", labels_path)] {
            if !Path::new(path).exists() {
                return Err(TaggerError::BuildError(format!("{} file not found: {}", kind, path)));
            }
        }

        let max_sequence_length = max_sequence_length.unwrap_or(512);
        if max_sequence_length == 0 {
            return Err(TaggerError::ValidationError("max_sequence_length must be at least 1".into()));
        }

        let tokenizer = Self::load_tokenizer(tokenizer_path, max_sequence_length)?;
        info!("Tokenizer loaded successfully");

        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(model_path)?;
        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        let labels = LabelSet::from_file(labels_path)?;
        info!("Loaded {} labels", labels.len());

        self.tokenizer = Some(tokenizer);
        self.session = Some(session);
        self.labels = Some(labels);
        self.max_sequence_length = Some(max_sequence_length);
        self.model_path = Some(model_path.to_string());
        self.tokenizer_path = Some(tokenizer_path.to_string());
        self.labels_path = Some(labels_path.to_string());
        Ok(self)
    }

    fn load_tokenizer(path: &str, max_length: usize) -> Result<Tokenizer, TaggerError> {
        let mut tokenizer = Tokenizer::from_file(path).map_err(|e| {
            error!("Failed to load tokenizer: {}", e);
            TaggerError::BuildError(format!("Failed to load tokenizer: {}", e))
        })?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| TaggerError::TokenizerError(format!("Failed to configure truncation: {}", e)))?;
        tokenizer.with_padding(None);

        Ok(tokenizer)
    }

    /// Builds and returns the final Tagger instance.
    ///
    /// Runs one probe inference so a model whose output width disagrees
    /// with the label set is rejected here rather than on the first request.
    pub fn build(mut self) -> Result<Tagger, TaggerError> {
        if self.model_path.is_none() || self.tokenizer_path.is_none() {
            return Err(TaggerError::BuildError("Model and tokenizer paths must be set".to_string()));
        }

        let labels = self.labels.take()
            .ok_or_else(|| TaggerError::BuildError("No labels loaded".into()))?;

        let probe = self.logits_for_text("Test input to check the label count")?;
        if probe.len() != labels.len() {
            return Err(TaggerError::BuildError(format!(
                "Model outputs {} logits but the label set has {} entries",
                probe.len(),
                labels.len()
            )));
        }
        info!("Model output width matches {} labels", labels.len());

        let tokenizer = self.tokenizer.take()
            .ok_or_else(|| TaggerError::BuildError("No tokenizer loaded".into()))?;
        let session = self.session.take()
            .ok_or_else(|| TaggerError::BuildError("No ONNX model loaded".into()))?;
        let max_sequence_length = self.max_sequence_length
            .ok_or_else(|| TaggerError::BuildError("Max sequence length not set".into()))?;

        Ok(Tagger {
            model_name: self.model_name.take().unwrap_or_else(|| "custom".to_string()),
            model_path: self.model_path.take().unwrap_or_default(),
            tokenizer_path: self.tokenizer_path.take().unwrap_or_default(),
            labels_path: self.labels_path.take().unwrap_or_default(),
            tokenizer: Arc::new(tokenizer),
            session: Arc::new(session),
            labels: Arc::new(labels),
            top_k: self.top_k,
            max_sequence_length,
        })
    }

    /// Validates that the model has the expected input/output structure
    fn validate_model(session: &Session) -> Result<(), TaggerError> {
        let inputs = &session.inputs;
        if inputs.len() < 2 {
            return Err(TaggerError::ModelError(format!(
                "Model must have at least 2 inputs (input_ids and attention_mask), found {}",
                inputs.len()
            )));
        }
        for required in REQUIRED_INPUTS {
            if !inputs.iter().any(|input| input.name == required) {
                return Err(TaggerError::ModelError(format!("Model has no '{}' input", required)));
            }
        }

        if session.outputs.is_empty() {
            return Err(TaggerError::ModelError(
                "Model must have at least 1 output for logits".to_string()
            ));
        }

        Ok(())
    }
}
