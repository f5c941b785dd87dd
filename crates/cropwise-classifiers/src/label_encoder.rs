//! Shared class index ↔ crop name mapping

use cropwise_core::{Error, Result};
use std::collections::HashMap;

/// Normalize a crop label for lookups (trimmed, lowercase)
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Bidirectional mapping between classifier class indices and crop names.
///
/// Every classifier artifact must be trained against the same encoder so
/// that index `i` means the same crop for all of them.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Create an encoder from class names in index order
    pub fn from_classes<I, S>(classes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err(Error::artifact("label encoder has no classes"));
        }

        let mut index = HashMap::with_capacity(classes.len());
        for (i, class) in classes.iter().enumerate() {
            if index.insert(normalize_label(class), i).is_some() {
                return Err(Error::artifact(format!(
                    "label encoder lists '{}' more than once",
                    class
                )));
            }
        }

        Ok(Self { classes, index })
    }

    /// Crop name for a class index
    pub fn decode(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// Class index for a crop name (case and whitespace insensitive)
    pub fn encode(&self, crop: &str) -> Option<usize> {
        self.index.get(&normalize_label(crop)).copied()
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the encoder is empty (never true for a constructed encoder)
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class names in index order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}
