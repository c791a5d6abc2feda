use crate::domain::models::{DocumentType, Finding};
use crate::frontmatter::{self, Document, FrontmatterError};
use crate::schema::SchemaRegistry;
use crate::services::content::{self, CheckContext};
use crate::services::{discovery, graph, placement};
use std::path::Path;

/// Validate a file or directory tree. Directory runs add the cross-document
/// graph analysis after every document has been checked on its own; the
/// resolver needs the complete node set first.
pub fn validate_path(path: &Path, registry: &SchemaRegistry) -> anyhow::Result<Vec<Finding>> {
    if !path.exists() {
        anyhow::bail!("path does not exist: {}", path.display());
    }

    if path.is_file() {
        let Some(doc_type) = discovery::classify(path) else {
            return Ok(Vec::new());
        };
        return Ok(validate_file(path, doc_type, registry));
    }

    let mut findings = Vec::new();
    for (file, doc_type) in discovery::discover(path) {
        findings.extend(validate_file(&file, doc_type, registry));
    }
    let (_, graph_findings) = graph::analyze(path, registry);
    findings.extend(graph_findings);
    Ok(findings)
}

/// Per-document checks. A parse failure is fatal for the document only: it
/// yields exactly one critical finding and short-circuits the rest.
pub fn validate_file(path: &Path, doc_type: DocumentType, registry: &SchemaRegistry) -> Vec<Finding> {
    let path_str = path.display().to_string();
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => return vec![Finding::critical(path_str, format!("Cannot read file: {e}"))],
    };

    let doc = match load_document(path, doc_type, &text) {
        Ok(doc) => doc,
        Err(e) => return vec![Finding::critical(path_str, e.to_string())],
    };

    let mut findings = Vec::new();
    let schema = registry.for_type(doc_type);

    if !doc.frontmatter.is_empty() {
        match schema {
            Some(schema) => {
                findings.extend(placement::check_placement(&doc, schema));
                findings.extend(placement::check_field_rules(&doc, schema));
            }
            None if frontmatter_is_schema_checked(doc_type) => {
                findings.push(Finding::warning(
                    &doc.path_str(),
                    format!("No schema defined for type '{doc_type}'; skipping schema checks"),
                ));
            }
            None => {}
        }
    }

    let ctx = CheckContext { registry, schema };
    findings.extend(content::run_checks(&doc, &ctx));
    findings
}

/// Rules never carry frontmatter; memory, router, and entrypoint files may
/// omit it. Everything else must open with the frontmatter delimiter.
fn load_document(
    path: &Path,
    doc_type: DocumentType,
    text: &str,
) -> Result<Document, FrontmatterError> {
    let optional_frontmatter = matches!(
        doc_type,
        DocumentType::Memory | DocumentType::Router | DocumentType::Entrypoint
    );

    if doc_type == DocumentType::Rule {
        return Ok(Document::without_frontmatter(
            path.to_path_buf(),
            doc_type,
            text.to_string(),
        ));
    }

    match frontmatter::parse(text) {
        Ok((fm, key_order, body)) => Ok(Document {
            path: path.to_path_buf(),
            doc_type,
            frontmatter: fm,
            key_order,
            body,
        }),
        Err(FrontmatterError::Missing) if optional_frontmatter => Ok(
            Document::without_frontmatter(path.to_path_buf(), doc_type, text.to_string()),
        ),
        Err(e) => Err(e),
    }
}

/// Types whose frontmatter is validated against a schema entry; a missing
/// entry for these degrades to a warning. Rule and memory documents never
/// consult the registry.
fn frontmatter_is_schema_checked(doc_type: DocumentType) -> bool {
    !matches!(doc_type, DocumentType::Rule | DocumentType::Memory)
}
