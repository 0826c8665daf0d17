use tokenizers::Tokenizer;
use ort::session::Session;
use ndarray::{Array1, Array2};
use ort::value::Tensor;
use std::collections::HashMap;

use super::error::TaggerError;

/// Token ids and attention mask for a single unpadded sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EncodedInput {
    pub ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
}

/// Runs a sequence-classification model over text.
///
/// The ONNX model is expected to:
/// - Accept two inputs: input_ids and attention_mask (both shape [batch_size, sequence_length])
/// - Output logits of shape [batch_size, num_labels]
pub(crate) trait SequenceClassification {
    /// Returns the initialized tokenizer if available
    fn tokenizer(&self) -> Option<&Tokenizer>;

    /// Returns the initialized ONNX session if available
    fn session(&self) -> Option<&Session>;

    /// Returns the maximum sequence length the model can handle
    fn max_sequence_length(&self) -> Option<usize>;

    /// Counts the tokens the model would see for `text`, special tokens included.
    ///
    /// # Errors
    /// - `TokenizerError` if the tokenizer is not initialized
    /// - `TokenizerError` if the text cannot be encoded
    fn count_tokens(&self, text: &str) -> Result<usize, TaggerError> {
        let tokenizer = self.tokenizer()
            .ok_or_else(|| TaggerError::TokenizerError("Tokenizer not initialized".into()))?;

        tokenizer.encode(text, true)
            .map_err(|e| TaggerError::TokenizerError(e.to_string()))
            .map(|encoding| encoding.get_ids().len())
    }

    /// Converts text into model input.
    ///
    /// The tokenizer truncates to `max_sequence_length`; a longer encoding
    /// here means truncation was not configured.
    ///
    /// # Errors
    /// - `TokenizerError` if the tokenizer is not initialized or encoding fails
    /// - `ValidationError` if the encoding is empty or too long
    fn encode(&self, text: &str) -> Result<EncodedInput, TaggerError> {
        let tokenizer = self.tokenizer()
            .ok_or_else(|| TaggerError::TokenizerError("Tokenizer not initialized".into()))?;
        let max_length = self.max_sequence_length()
            .ok_or_else(|| TaggerError::TokenizerError("Max sequence length not set".into()))?;

        let encoding = tokenizer.encode(text, true)
            .map_err(|e| TaggerError::TokenizerError(e.to_string()))?;
        let token_ids = encoding.get_ids();

        if token_ids.is_empty() {
            return Err(TaggerError::ValidationError("Input produced no tokens".into()));
        }
        if token_ids.len() > max_length {
            return Err(TaggerError::ValidationError(format!(
                "Input text too long: {} tokens (max: {})",
                token_ids.len(),
                max_length
            )));
        }

        Ok(EncodedInput {
            ids: token_ids.iter().map(|&id| i64::from(id)).collect(),
            attention_mask: encoding.get_attention_mask().iter().map(|&m| i64::from(m)).collect(),
        })
    }

    /// Tokenizes `text` and returns the raw logits for it.
    fn logits_for_text(&self, text: &str) -> Result<Array1<f32>, TaggerError> {
        let input = self.encode(text)?;
        self.logits(&input)
    }

    /// Runs one forward pass.
    ///
    /// # Model Output Format
    /// - Shape: [batch_size=1, num_labels]
    ///
    /// # Errors
    /// - `ModelError` if the session is not initialized, tensor creation
    ///   fails, the run fails, or the output has an unexpected shape
    fn logits(&self, input: &EncodedInput) -> Result<Array1<f32>, TaggerError> {
        let session = self.session()
            .ok_or_else(|| TaggerError::ModelError("Session not initialized".into()))?;
        let len = input.ids.len();

        let input_array = Array2::from_shape_vec((1, len), input.ids.clone())
            .map_err(|e| TaggerError::ModelError(format!("Failed to create input array: {}", e)))?;
        let mask_array = Array2::from_shape_vec((1, len), input.attention_mask.clone())
            .map_err(|e| TaggerError::ModelError(format!("Failed to create mask array: {}", e)))?;

        let mut input_tensors = HashMap::new();
        input_tensors.insert("input_ids", Tensor::from_array(input_array)
            .map_err(|e| TaggerError::ModelError(format!("Failed to create input tensor: {}", e)))?);
        input_tensors.insert("attention_mask", Tensor::from_array(mask_array)
            .map_err(|e| TaggerError::ModelError(format!("Failed to create mask tensor: {}", e)))?);

        let outputs = session.run(input_tensors)
            .map_err(|e| TaggerError::ModelError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| TaggerError::ModelError(format!("Failed to extract output tensor: {}", e)))?;

        let shape = output_tensor.shape();
        if shape.len() != 2 || shape[0] != 1 {
            return Err(TaggerError::ModelError(format!(
                "Expected logits of shape [1, num_labels], got {:?}",
                shape
            )));
        }

        Ok(output_tensor.iter().copied().collect())
    }
}
