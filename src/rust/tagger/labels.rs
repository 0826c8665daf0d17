use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::error::TaggerError;

/// Ordered tag names. Position `i` is the tag for classifier output `i`.
///
/// Read from JSON, either a bare array of strings or an object with a
/// `classes` array (the shape a multi-label binarizer exports).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelFile {
    Bare(Vec<String>),
    Classes {
        #[serde(alias = "classes_")]
        classes: Vec<String>,
    },
}

impl LabelSet {
    pub fn new(labels: Vec<impl Into<String>>) -> Result<Self, TaggerError> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(TaggerError::LabelError("Label set cannot be empty".into()));
        }
        if let Some(pos) = labels.iter().position(|l| l.trim().is_empty()) {
            return Err(TaggerError::LabelError(format!("Label {} is empty", pos)));
        }
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(TaggerError::LabelError(format!("Duplicate label '{}'", label)));
            }
        }
        Ok(Self { labels })
    }

    pub fn from_json(json: &str) -> Result<Self, TaggerError> {
        let file: LabelFile = serde_json::from_str(json)
            .map_err(|e| TaggerError::LabelError(format!("Invalid label file: {}", e)))?;
        match file {
            LabelFile::Bare(labels) | LabelFile::Classes { classes: labels } => Self::new(labels),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TaggerError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            TaggerError::LabelError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array() {
        let labels = LabelSet::from_json(r#"["python", "rust", "sql"]"#).unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get(1), Some("rust"));
        assert_eq!(labels.get(3), None);
    }

    #[test]
    fn test_classes_object() {
        let labels = LabelSet::from_json(r#"{"classes_": ["c#", "java"]}"#).unwrap();
        assert_eq!(labels.iter().collect::<Vec<_>>(), vec!["c#", "java"]);

        let labels = LabelSet::from_json(r#"{"classes": ["go"]}"#).unwrap();
        assert_eq!(labels.get(0), Some("go"));
    }

    #[test]
    fn test_rejects_bad_sets() {
        assert!(matches!(LabelSet::from_json("[]"), Err(TaggerError::LabelError(_))));
        assert!(matches!(LabelSet::from_json(r#"["a", "a"]"#), Err(TaggerError::LabelError(_))));
        assert!(matches!(LabelSet::from_json(r#"["a", " "]"#), Err(TaggerError::LabelError(_))));
        assert!(matches!(LabelSet::from_json("not json"), Err(TaggerError::LabelError(_))));
    }

    #[test]
    fn test_from_missing_file() {
        let result = LabelSet::from_file("/nonexistent/labels.json");
        assert!(matches!(result, Err(TaggerError::LabelError(_))));
    }
}
