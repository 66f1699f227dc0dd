//! Named page templates.
//!
//! A [`TemplateSet`] maps a page name to its JSON template document. Sets are
//! loaded from a directory (one `<page>.json` per page) or taken from the
//! defaults compiled into the crate.

use crate::error::Result;
use crate::PipelineError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN: [(&str, &str); 3] = [
    ("faq", include_str!("../templates/faq.json")),
    ("product_page", include_str!("../templates/product_page.json")),
    ("comparison", include_str!("../templates/comparison.json")),
];

/// Page name -> template document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateSet {
    templates: BTreeMap<String, Value>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default `faq`, `product_page` and `comparison` templates.
    pub fn builtin() -> Result<Self> {
        let mut set = Self::new();
        for (name, source) in BUILTIN {
            let template = serde_json::from_str(source).map_err(|e| {
                PipelineError::Configuration(format!(
                    "built-in template '{}' is invalid: {}",
                    name, e
                ))
            })?;
            set.insert(name, template);
        }
        Ok(set)
    }

    /// Load every `*.json` file in `dir`, keyed by file stem.
    ///
    /// Other files and subdirectories are ignored. A file that is not valid
    /// JSON is a `Configuration` error naming the file.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            PipelineError::Configuration(format!(
                "cannot read template directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let mut set = Self::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = std::fs::read_to_string(&path)?;
            let template = serde_json::from_str(&text).map_err(|e| {
                PipelineError::Configuration(format!(
                    "template {} is not valid JSON: {}",
                    path.display(),
                    e
                ))
            })?;
            tracing::debug!(template = name, path = %path.display(), "loaded template");
            set.insert(name, template);
        }
        Ok(set)
    }

    /// Add or replace a template.
    pub fn insert(&mut self, name: impl Into<String>, template: Value) {
        self.templates.insert(name.into(), template);
    }

    pub fn with(mut self, name: impl Into<String>, template: Value) -> Self {
        self.insert(name, template);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.templates.get(name)
    }

    /// Borrow `name`, or fail with a `Configuration` error.
    pub fn require(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| {
            PipelineError::Configuration(format!(
                "missing page template '{}' (have: [{}])",
                name,
                self.names().join(", ")
            ))
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_has_three_pages() {
        let set = TemplateSet::builtin().unwrap();
        assert_eq!(set.names(), vec!["comparison", "faq", "product_page"]);
        assert_eq!(set.get("faq").unwrap()["questions"], "{logic.faq_list}");
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("faq.json"), r#"{"q": "{logic.faq_list}"}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();

        let set = TemplateSet::load_dir(dir.path()).unwrap();
        assert_eq!(set.names(), vec!["faq"]);
        assert_eq!(set.get("faq"), Some(&json!({"q": "{logic.faq_list}"})));
    }

    #[test]
    fn test_load_dir_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ nope").unwrap();
        let err = TemplateSet::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(ref m) if m.contains("bad.json")));
    }

    #[test]
    fn test_load_dir_missing() {
        let err = TemplateSet::load_dir("/definitely/not/here").unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_require() {
        let set = TemplateSet::new().with("faq", json!({}));
        assert!(set.require("faq").is_ok());
        let err = set.require("comparison").unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(ref m) if m.contains("comparison")));
    }
}
