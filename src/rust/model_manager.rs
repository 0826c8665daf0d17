use std::path::{Path, PathBuf};
use std::fs;
use std::io;
use std::sync::Arc;
use std::env;
use tokio::sync::Mutex;
use sha2::{Sha256, Digest};

use crate::models::ModelInfo;

pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const LABELS_FILE: &str = "labels.json";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not downloaded: {0}")]
    NotDownloaded(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("Download of {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Model verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// One artifact of a model: what it is, where it comes from, where it goes.
struct Artifact<'a> {
    file_type: &'static str,
    url: &'a str,
    path: PathBuf,
    hash: Option<&'a str>,
}

/// Keeps model, tokenizer and label files under a per-model directory.
#[derive(Clone, Debug)]
pub struct ModelManager {
    models_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("TAGWIZARD_CACHE") {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("tagwizard").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("tagwizard").join("models");
        }

        // 4. If all else fails, use system temp directory
        env::temp_dir().join("tagwizard").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn get_model_dir(&self, name: &str) -> PathBuf {
        self.models_dir.join(name)
    }

    pub fn get_model_path(&self, name: &str) -> PathBuf {
        self.get_model_dir(name).join(MODEL_FILE)
    }

    pub fn get_tokenizer_path(&self, name: &str) -> PathBuf {
        self.get_model_dir(name).join(TOKENIZER_FILE)
    }

    pub fn get_labels_path(&self, name: &str) -> PathBuf {
        self.get_model_dir(name).join(LABELS_FILE)
    }

    pub fn is_model_downloaded(&self, name: &str) -> bool {
        let model_path = self.get_model_path(name);
        let tokenizer_path = self.get_tokenizer_path(name);
        let labels_path = self.get_labels_path(name);
        log::debug!("Checking if model '{}' is downloaded:", name);
        log::debug!("  Model path: {:?} (exists: {})", model_path, model_path.exists());
        log::debug!("  Tokenizer path: {:?} (exists: {})", tokenizer_path, tokenizer_path.exists());
        log::debug!("  Labels path: {:?} (exists: {})", labels_path, labels_path.exists());
        model_path.exists() && tokenizer_path.exists() && labels_path.exists()
    }

    fn artifacts<'a>(&self, info: &'a ModelInfo) -> [Artifact<'a>; 3] {
        [
            Artifact {
                file_type: "model",
                url: &info.model_url,
                path: self.get_model_path(&info.name),
                hash: info.model_hash.as_deref(),
            },
            Artifact {
                file_type: "tokenizer",
                url: &info.tokenizer_url,
                path: self.get_tokenizer_path(&info.name),
                hash: info.tokenizer_hash.as_deref(),
            },
            Artifact {
                file_type: "labels",
                url: &info.labels_url,
                path: self.get_labels_path(&info.name),
                hash: info.labels_hash.as_deref(),
            },
        ]
    }

    /// Downloads every artifact that is missing or fails verification.
    ///
    /// On failure all of the model's files are removed so a half-written
    /// model is never picked up by a later start.
    pub async fn download_model(&self, info: &ModelInfo) -> Result<(), ModelError> {
        let _lock = self.download_lock.lock().await;

        let model_dir = self.get_model_dir(&info.name);
        log::info!("Creating model directory at {:?}", model_dir);
        fs::create_dir_all(&model_dir)?;

        for artifact in self.artifacts(info) {
            if let Err(e) = self.ensure_artifact(&artifact).await {
                log::error!("Failed to setup {} file: {}", artifact.file_type, e);
                let _ = self.remove_download(&info.name);
                return Err(e);
            }
        }

        log::info!("Model '{}' ready to use", info.name);
        Ok(())
    }

    async fn ensure_artifact(&self, artifact: &Artifact<'_>) -> Result<(), ModelError> {
        if artifact.path.exists() {
            log::info!("{} file exists at {:?}, verifying...", artifact.file_type, artifact.path);
            if self.verify_file(&artifact.path, artifact.hash)? {
                return Ok(());
            }
            log::warn!("{} file verification failed, redownloading", artifact.file_type);
        }
        self.download_and_verify_file(artifact).await
    }

    fn verify_file(&self, path: &Path, expected_hash: Option<&str>) -> Result<bool, ModelError> {
        let Some(expected_hash) = expected_hash else {
            return Ok(path.exists());
        };
        let bytes = fs::read(path)?;
        let hash = sha256_hex(&bytes);
        log::debug!("Verifying {:?}: calculated {}, expected {}", path, hash, expected_hash);
        Ok(hash == expected_hash)
    }

    /// Checks that all artifacts exist and match their known hashes.
    pub fn verify_model(&self, info: &ModelInfo) -> Result<bool, ModelError> {
        for artifact in self.artifacts(info) {
            if !artifact.path.exists() {
                log::info!("{} file does not exist at {:?}", artifact.file_type, artifact.path);
                return Ok(false);
            }
            if !self.verify_file(&artifact.path, artifact.hash)? {
                log::info!("{} hash verification failed", artifact.file_type);
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn download_and_verify_file(&self, artifact: &Artifact<'_>) -> Result<(), ModelError> {
        log::info!(
            "Downloading {} file from {} to {:?}",
            artifact.file_type, artifact.url, artifact.path
        );
        let response = reqwest::get(artifact.url).await?;
        if !response.status().is_success() {
            return Err(ModelError::HttpStatus {
                url: artifact.url.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected_hash) = artifact.hash {
            let hash = sha256_hex(&bytes);
            if hash != expected_hash {
                log::error!(
                    "{} hash mismatch: expected {}, got {}",
                    artifact.file_type, expected_hash, hash
                );
                return Err(ModelError::HashMismatch {
                    file_type: artifact.file_type.to_string(),
                    expected: expected_hash.to_string(),
                    actual: hash,
                });
            }
        }

        if let Some(parent) = artifact.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&artifact.path, &bytes)?;

        if !self.verify_file(&artifact.path, artifact.hash)? {
            return Err(ModelError::VerificationFailed);
        }

        log::info!("{} file downloaded and verified successfully", artifact.file_type);
        Ok(())
    }

    pub fn remove_download(&self, name: &str) -> Result<(), ModelError> {
        for path in [
            self.get_model_path(name),
            self.get_tokenizer_path(name),
            self.get_labels_path(name),
        ] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Ensures that a model is downloaded and verified.
    /// If the model doesn't exist, it will be downloaded.
    /// If verification fails, it will be re-downloaded.
    pub async fn ensure_model_downloaded(&self, info: &ModelInfo) -> Result<(), ModelError> {
        log::info!("Checking if model '{}' is downloaded...", info.name);
        if !self.is_model_downloaded(&info.name) {
            log::info!("Model not found, downloading...");
            self.download_model(info).await?;
        } else if !self.verify_model(info)? {
            log::info!("Model verification failed, re-downloading...");
            self.remove_download(&info.name)?;
            self.download_model(info).await?;
        } else {
            log::info!("Model verification successful");
        }
        Ok(())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info_with_hashes(name: &str, model: &[u8], tokenizer: &[u8], labels: &[u8]) -> ModelInfo {
        ModelInfo {
            name: name.to_string(),
            model_url: "http://127.0.0.1:9/model.onnx".to_string(),
            tokenizer_url: "http://127.0.0.1:9/tokenizer.json".to_string(),
            labels_url: "http://127.0.0.1:9/labels.json".to_string(),
            model_hash: Some(sha256_hex(model)),
            tokenizer_hash: Some(sha256_hex(tokenizer)),
            labels_hash: Some(sha256_hex(labels)),
        }
    }

    fn write_artifacts(manager: &ModelManager, name: &str) {
        fs::create_dir_all(manager.get_model_dir(name)).unwrap();
        fs::write(manager.get_model_path(name), b"onnx bytes").unwrap();
        fs::write(manager.get_tokenizer_path(name), b"{}").unwrap();
        fs::write(manager.get_labels_path(name), b"[\"rust\"]").unwrap();
    }

    #[test]
    fn test_model_paths() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(dir.path()).unwrap();
        assert!(manager.get_model_path("tagger").ends_with("tagger/model.onnx"));
        assert!(manager.get_tokenizer_path("tagger").ends_with("tagger/tokenizer.json"));
        assert!(manager.get_labels_path("tagger").ends_with("tagger/labels.json"));
    }

    #[test]
    fn test_is_model_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(dir.path()).unwrap();
        assert!(!manager.is_model_downloaded("tagger"));

        write_artifacts(&manager, "tagger");
        assert!(manager.is_model_downloaded("tagger"));

        fs::remove_file(manager.get_labels_path("tagger")).unwrap();
        assert!(!manager.is_model_downloaded("tagger"));
    }

    #[test]
    fn test_verify_model() -> Result<(), ModelError> {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(dir.path())?;
        let info = info_with_hashes("tagger", b"onnx bytes", b"{}", b"[\"rust\"]");

        assert!(!manager.verify_model(&info)?);

        write_artifacts(&manager, "tagger");
        assert!(manager.verify_model(&info)?);

        // Corrupt file and verify
        fs::write(manager.get_model_path("tagger"), "corrupted data")?;
        assert!(!manager.verify_model(&info)?);
        Ok(())
    }

    #[test]
    fn test_verify_without_hashes_only_checks_presence() -> Result<(), ModelError> {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(dir.path())?;
        let info = ModelInfo::from_base_url("tagger", "http://127.0.0.1:9");

        write_artifacts(&manager, "tagger");
        fs::write(manager.get_model_path("tagger"), "anything")?;
        assert!(manager.verify_model(&info)?);
        Ok(())
    }

    #[test]
    fn test_remove_download() -> Result<(), ModelError> {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(dir.path())?;
        write_artifacts(&manager, "tagger");

        manager.remove_download("tagger")?;
        assert!(!manager.get_model_path("tagger").exists());
        assert!(!manager.get_tokenizer_path("tagger").exists());
        assert!(!manager.get_labels_path("tagger").exists());

        // Removing again is a no-op
        manager.remove_download("tagger")?;
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_verified_model_skips_download() -> Result<(), ModelError> {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(dir.path())?;
        let info = info_with_hashes("tagger", b"onnx bytes", b"{}", b"[\"rust\"]");
        write_artifacts(&manager, "tagger");

        // The URLs point at a closed port, so this only succeeds without a download.
        manager.ensure_model_downloaded(&info).await?;
        assert!(manager.is_model_downloaded("tagger"));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_download_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(dir.path()).unwrap();
        let info = info_with_hashes("tagger", b"onnx bytes", b"{}", b"[\"rust\"]");
        write_artifacts(&manager, "tagger");
        fs::write(manager.get_model_path("tagger"), "corrupted data").unwrap();

        let result = manager.download_model(&info).await;
        assert!(result.is_err());
        assert!(!manager.is_model_downloaded("tagger"));
    }
}
