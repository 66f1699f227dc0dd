//! Persisting rendered pages as one JSON file per page.

use crate::error::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Write each page to `<dir>/<page>.json` and return the written paths.
///
/// The directory is created if needed. Output is pretty-printed with a
/// four-space indent and a trailing newline. Every page is serialized and
/// staged as a hidden temp file before any page is moved into place; if any
/// step fails, the files of this call are removed again.
pub fn write_pages(
    dir: impl AsRef<Path>,
    pages: &BTreeMap<String, Value>,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();

    let mut rendered = Vec::with_capacity(pages.len());
    for (name, page) in pages {
        rendered.push((name, to_pretty_json(page)?));
    }
    std::fs::create_dir_all(dir)?;

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(rendered.len());
    for (name, text) in &rendered {
        let tmp = dir.join(format!(".{}.json.tmp", name));
        if let Err(e) = std::fs::write(&tmp, text) {
            discard(staged.iter().map(|(tmp, _)| tmp).chain(std::iter::once(&tmp)));
            return Err(e.into());
        }
        staged.push((tmp, dir.join(format!("{}.json", name))));
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(tmp, path) {
            discard(written.iter().chain(staged[i..].iter().map(|(tmp, _)| tmp)));
            return Err(e.into());
        }
        tracing::info!(path = %path.display(), "wrote page");
        written.push(path.clone());
    }
    Ok(written)
}

/// Best-effort removal of files from a failed write.
fn discard<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not remove page file");
        }
    }
}

/// Four-space indented JSON.
pub fn to_pretty_json(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| crate::PipelineError::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pretty_json_four_spaces() {
        let text = to_pretty_json(&json!({"a": [1]})).unwrap();
        assert_eq!(text, "{\n    \"a\": [\n        1\n    ]\n}\n");
    }

    #[test]
    fn test_write_pages() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("outputs");
        let pages = BTreeMap::from([
            ("faq".to_string(), json!({"questions": []})),
            ("comparison".to_string(), json!({"title": "A vs ₹B"})),
        ]);

        let written = write_pages(&out, &pages).unwrap();
        assert_eq!(written, vec![out.join("comparison.json"), out.join("faq.json")]);

        let back: Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("comparison.json")).unwrap())
                .unwrap();
        assert_eq!(back["title"], "A vs ₹B");
    }

    #[test]
    fn test_failed_write_leaves_no_pages() {
        let dir = tempfile::tempdir().unwrap();
        // a directory in the way makes the second page fail to land
        std::fs::create_dir(dir.path().join("faq.json")).unwrap();
        let pages = BTreeMap::from([
            ("comparison".to_string(), json!({"title": "A vs B"})),
            ("faq".to_string(), json!({"questions": []})),
        ]);

        assert!(write_pages(dir.path(), &pages).is_err());

        let mut left: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left, vec!["faq.json"]);
        assert!(dir.path().join("faq.json").is_dir());
    }

    #[test]
    fn test_write_no_pages_creates_dir_only() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty");
        assert!(write_pages(&out, &BTreeMap::new()).unwrap().is_empty());
        assert!(out.is_dir());
    }
}
