use crate::domain::models::{
    Finding, GraphNodeView, GraphReport, JsonOut, Severity, ValidationReport,
};

pub fn summarize(findings: Vec<Finding>) -> ValidationReport {
    let critical_count = count(&findings, Severity::Critical);
    let warning_count = count(&findings, Severity::Warning);
    let info_count = count(&findings, Severity::Info);

    let mut files: Vec<&str> = findings.iter().map(|f| f.path.as_str()).collect();
    files.sort_unstable();
    files.dedup();
    let files_with_issues = files.len();

    ValidationReport {
        findings,
        critical_count,
        warning_count,
        info_count,
        files_with_issues,
    }
}

fn count(findings: &[Finding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}

pub fn print_validation(json: bool, report: &ValidationReport) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: report.critical_count == 0,
                data: report,
            })?
        );
        return Ok(());
    }

    if report.findings.is_empty() {
        println!("All files passed validation!");
        return Ok(());
    }

    for finding in &report.findings {
        println!("{finding}");
    }
    println!();
    println!("Summary:");
    println!("  Critical errors: {}", report.critical_count);
    println!("  Warnings: {}", report.warning_count);
    println!("  Info: {}", report.info_count);
    println!("  Files with issues: {}", report.files_with_issues);
    Ok(())
}

pub fn print_graph(json: bool, report: &GraphReport) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: report.critical_count == 0,
                data: report,
            })?
        );
        return Ok(());
    }

    println!("Dependency graph:");
    for node in &report.nodes {
        print_node(node);
    }
    if !report.findings.is_empty() {
        println!();
        for finding in &report.findings {
            println!("{finding}");
        }
    }
    println!();
    println!("Summary:");
    println!("  Critical errors: {}", report.critical_count);
    println!("  Warnings: {}", report.warning_count);
    println!("  Info: {}", report.info_count);
    Ok(())
}

fn print_node(node: &GraphNodeView) {
    println!("{}: {}", node.node_type.key().to_uppercase(), node.path);
    if let Some(name) = &node.name {
        println!("  name: {name}");
    }
    if node.dependencies.is_empty() {
        println!("  dependencies: none");
    } else {
        for dep in &node.dependencies {
            println!("  -> {dep}");
        }
    }
}

/// Process exit status: non-zero iff any critical finding exists.
pub fn exit_code(critical_count: usize) -> i32 {
    if critical_count > 0 {
        1
    } else {
        0
    }
}
