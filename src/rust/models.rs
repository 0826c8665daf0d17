/// Represents the pretrained tagging models the service knows how to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinModel {
    /// DistilBERT fine-tuned for multi-label tagging of StackExchange questions
    ///
    /// Characteristics:
    /// - Max sequence length: 512
    /// - Size: ~255MB
    StackExchangeDistilBert,
}

/// Characteristics of a model including its capabilities and requirements
#[derive(Debug, Clone)]
pub struct ModelCharacteristics {
    /// Maximum sequence length the model can handle
    pub max_sequence_length: usize,
    /// Approximate size of the model in memory
    pub model_size_mb: usize,
}

/// Where to fetch a model's artifacts from and how to check them.
///
/// Hashes are hex-encoded SHA-256 digests. A `None` hash skips verification
/// for that file.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub model_url: String,
    pub tokenizer_url: String,
    pub labels_url: String,
    pub model_hash: Option<String>,
    pub tokenizer_hash: Option<String>,
    pub labels_hash: Option<String>,
}

impl ModelInfo {
    /// Builds download locations for `name` under `base_url`.
    ///
    /// The artifacts are expected at `<base_url>/model.onnx`,
    /// `<base_url>/tokenizer.json` and `<base_url>/labels.json`.
    pub fn from_base_url(name: impl Into<String>, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            name: name.into(),
            model_url: format!("{}/model.onnx", base),
            tokenizer_url: format!("{}/tokenizer.json", base),
            labels_url: format!("{}/labels.json", base),
            model_hash: None,
            tokenizer_hash: None,
            labels_hash: None,
        }
    }
}

impl BuiltinModel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StackExchangeDistilBert => "distilbert-finetuned-stackexchange-multi-label",
        }
    }

    /// Get the characteristics of the model
    pub fn characteristics(&self) -> ModelCharacteristics {
        match self {
            Self::StackExchangeDistilBert => ModelCharacteristics {
                max_sequence_length: 512,
                model_size_mb: 255,
            },
        }
    }

    pub fn get_model_info(&self, base_url: &str) -> ModelInfo {
        ModelInfo::from_base_url(self.name(), base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_info_urls() {
        let info = BuiltinModel::StackExchangeDistilBert
            .get_model_info("https://models.example.org/tagwizard/");
        assert_eq!(info.name, "distilbert-finetuned-stackexchange-multi-label");
        assert_eq!(info.model_url, "https://models.example.org/tagwizard/model.onnx");
        assert_eq!(info.tokenizer_url, "https://models.example.org/tagwizard/tokenizer.json");
        assert_eq!(info.labels_url, "https://models.example.org/tagwizard/labels.json");
        assert!(info.model_hash.is_none());
    }

    #[test]
    fn test_characteristics() {
        let c = BuiltinModel::StackExchangeDistilBert.characteristics();
        assert_eq!(c.max_sequence_length, 512);
    }
}
