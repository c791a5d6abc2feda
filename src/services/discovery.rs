use crate::domain::models::DocumentType;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Classify a file by the corpus layout conventions. `rel` is the path
/// relative to the scanned root (or the bare path in single-file mode).
pub fn classify(rel: &Path) -> Option<DocumentType> {
    let name = rel.file_name()?.to_str()?;
    if rel.extension().and_then(|e| e.to_str()) != Some("md") {
        return None;
    }
    if name == "SKILL.md" {
        return Some(DocumentType::Skill);
    }
    if name == "AGENT.md" {
        return Some(DocumentType::Agent);
    }
    if name == "CLAUDE.md" || name == "AGENTS.md" {
        // Memory files live at the scan root; nested copies are not live
        // memory and classify as nothing else either.
        if rel.iter().count() == 1 {
            return Some(DocumentType::Memory);
        }
        return None;
    }

    let parts: Vec<&str> = rel.iter().filter_map(|p| p.to_str()).collect();

    // Governance subtrees first: governance/rules would otherwise be
    // swallowed by the generic rules/ match below.
    for pair in parts.windows(2) {
        if pair[0] == "governance" {
            match pair[1] {
                "rules" => return Some(DocumentType::RuleBlock),
                "routers" => return Some(DocumentType::Router),
                "entrypoints" => return Some(DocumentType::Entrypoint),
                "styles" => return Some(DocumentType::OutputStyle),
                _ => {}
            }
        }
    }
    if parts.contains(&"commands") && name != "README.md" {
        return Some(DocumentType::Command);
    }
    if parts.contains(&"rules") {
        return Some(DocumentType::Rule);
    }
    None
}

/// Enumerate every recognized document under `root`, sorted by path so runs
/// over an unchanged tree are byte-identical.
pub fn discover(root: &Path) -> Vec<(PathBuf, DocumentType)> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(path);
        // Backup and rollback artefacts are not live manifests.
        if rel.iter().any(|p| p == "backup") {
            continue;
        }
        if let Some(doc_type) = classify(rel) {
            out.push((path.to_path_buf(), doc_type));
        }
    }
    out.sort();
    out
}
