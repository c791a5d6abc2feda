use crate::domain::models::DocumentType;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::path::PathBuf;

/// A parsed governance document: ordered frontmatter plus body text.
/// Constructed once per run and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub doc_type: DocumentType,
    pub frontmatter: Mapping,
    /// Top-level frontmatter keys in file order, including the literal
    /// `metadata` key but not its children.
    pub key_order: Vec<String>,
    pub body: String,
}

impl Document {
    pub fn without_frontmatter(path: PathBuf, doc_type: DocumentType, body: String) -> Self {
        Self {
            path,
            doc_type,
            frontmatter: Mapping::new(),
            key_order: Vec::new(),
            body,
        }
    }

    pub fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    /// Field lookup matching the validator convention: top-level first,
    /// then inside the `metadata` sub-mapping.
    pub fn field(&self, name: &str) -> Option<&Value> {
        if let Some(v) = self.frontmatter.get(name) {
            return Some(v);
        }
        self.metadata()?.get(name)
    }

    pub fn metadata(&self) -> Option<&Mapping> {
        match self.frontmatter.get("metadata") {
            Some(Value::Mapping(m)) => Some(m),
            _ => None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FrontmatterError {
    #[error("Missing frontmatter")]
    Missing,
    #[error("Missing closing frontmatter marker ---")]
    Unterminated,
    #[error("Empty frontmatter")]
    Empty,
    #[error("{0}")]
    Malformed(String),
}

/// Split a document into (frontmatter mapping, top-level key order, body).
pub fn parse(text: &str) -> Result<(Mapping, Vec<String>, String), FrontmatterError> {
    let lines: Vec<&str> = text.lines().collect();
    match lines.first() {
        Some(first) if first.trim() == "---" => {}
        _ => return Err(FrontmatterError::Missing),
    }

    let close = lines[1..]
        .iter()
        .position(|l| l.trim() == "---")
        .map(|i| i + 1)
        .ok_or(FrontmatterError::Unterminated)?;

    let fm_lines = &lines[1..close];
    let body = lines[close + 1..].join("\n");

    let parsed: Value = serde_yaml::from_str(&fm_lines.join("\n"))
        .map_err(|e| FrontmatterError::Malformed(classify_yaml_error(&e)))?;

    let mapping = match parsed {
        Value::Null => return Err(FrontmatterError::Empty),
        Value::Mapping(m) => m,
        _ => {
            return Err(FrontmatterError::Malformed(
                "YAML structure error: frontmatter must be a key-value mapping".to_string(),
            ))
        }
    };

    Ok((mapping, scan_key_order(fm_lines), body))
}

/// Top-level keys in file order. A key counts as top-level when its line has
/// no leading indentation; indented lines (nested maps, list items, the
/// children of `metadata:`) never contribute, so nested structure under any
/// key cannot corrupt the ordering.
fn scan_key_order(fm_lines: &[&str]) -> Vec<String> {
    let key_re = Regex::new(r"^([A-Za-z0-9_-]+)\s*:").expect("static regex");
    let mut order: Vec<String> = Vec::new();
    for line in fm_lines {
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }
        if let Some(caps) = key_re.captures(line) {
            let key = caps[1].to_string();
            if !order.contains(&key) {
                order.push(key);
            }
        }
    }
    order
}

fn classify_yaml_error(err: &serde_yaml::Error) -> String {
    let msg = err.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("indent") {
        "YAML indentation error: check that array items and metadata fields are indented with 2 spaces".to_string()
    } else if lower.contains("mapping values") {
        "YAML structure error: missing colon or improper key-value format".to_string()
    } else if lower.contains("scan") {
        "YAML scanner error: check for invalid characters or unquoted strings".to_string()
    } else {
        format!("YAML parsing error: {msg}")
    }
}
