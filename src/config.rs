use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Archivar";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the settings file inside the application data directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "archivar=info"
}

/// Application data directory: ~/Archivar/ on all platforms.
/// `None` when the home directory cannot be determined.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME))
}

pub fn settings_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(SETTINGS_FILE))
}

/// Models directory (ONNX embeddings)
pub fn models_dir() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("models"))
}

/// Default embedding model directory (paraphrase-multilingual-MiniLM-L12-v2)
pub fn embedding_model_dir() -> Option<PathBuf> {
    models_dir().map(|dir| dir.join("paraphrase-multilingual-MiniLM-L12-v2"))
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables of the document pipeline, loaded from `settings.json`.
///
/// Missing fields take their defaults, so an empty JSON object is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Keywords kept per document.
    pub max_keywords: usize,
    /// Cosine similarity at or above which a document is a near duplicate.
    pub duplicate_threshold: f32,
    /// Load the embedding model and enable semantic scoring.
    pub semantic_enabled: bool,
    /// Per-engine OCR confidence (0-100) counted as "high".
    pub high_confidence: f32,
    /// Characters of merged text embedded for classification.
    pub classify_sample_chars: usize,
    /// Characters of merged text embedded for duplicate detection.
    pub fingerprint_sample_chars: usize,
    /// Records whose category confidence is below this get the low-confidence flag.
    pub low_confidence_threshold: f64,
    /// JSON taxonomy file; the built-in German taxonomy when unset.
    pub taxonomy_path: Option<PathBuf>,
    /// ONNX model directory; [`embedding_model_dir`] when unset.
    pub embedding_model_dir: Option<PathBuf>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_keywords: 20,
            duplicate_threshold: 0.95,
            semantic_enabled: false,
            high_confidence: 80.0,
            classify_sample_chars: 2000,
            fingerprint_sample_chars: 1000,
            low_confidence_threshold: 0.5,
            taxonomy_path: None,
            embedding_model_dir: None,
        }
    }
}

impl PipelineSettings {
    /// Read and validate settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&raw)?;
        settings.validate()?;
        tracing::debug!(path = %path.display(), "Pipeline settings loaded");
        Ok(settings)
    }

    /// Load `settings.json` from `dir`, or defaults when the file does not exist.
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(SETTINGS_FILE);
        if !path.exists() {
            tracing::info!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_keywords == 0 {
            return Err(invalid("max_keywords", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.duplicate_threshold) {
            return Err(invalid(
                "duplicate_threshold",
                format!("{} is outside [0, 1]", self.duplicate_threshold),
            ));
        }
        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err(invalid(
                "low_confidence_threshold",
                format!("{} is outside [0, 1]", self.low_confidence_threshold),
            ));
        }
        if !(0.0..=100.0).contains(&self.high_confidence) {
            return Err(invalid(
                "high_confidence",
                format!("{} is outside [0, 100]", self.high_confidence),
            ));
        }
        if self.classify_sample_chars == 0 || self.fingerprint_sample_chars == 0 {
            return Err(invalid("sample_chars", "sample sizes must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
