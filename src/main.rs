use clap::Parser;
use std::path::Path;

mod cli;
mod domain;
mod frontmatter;
mod schema;
mod services;

use cli::{Cli, Commands};
use domain::models::{GraphReport, Severity};
use schema::SchemaRegistry;
use services::{graph, report, validate};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let registry = match &cli.schema {
        Some(path) => SchemaRegistry::load(&std::fs::read_to_string(path)?)?,
        None => SchemaRegistry::load_default()?,
    };

    let code = match cli.command {
        Commands::Validate { path } => run_validate(&path, &registry, cli.json)?,
        Commands::Graph { path } => run_graph(&path, &registry, cli.json)?,
    };
    std::process::exit(code);
}

fn run_validate(path: &Path, registry: &SchemaRegistry, json: bool) -> anyhow::Result<i32> {
    let findings = validate::validate_path(path, registry)?;
    let summary = report::summarize(findings);
    report::print_validation(json, &summary)?;
    Ok(report::exit_code(summary.critical_count))
}

fn run_graph(path: &Path, registry: &SchemaRegistry, json: bool) -> anyhow::Result<i32> {
    if !path.is_dir() {
        anyhow::bail!("graph analysis requires a directory: {}", path.display());
    }
    let (graph, findings) = graph::analyze(path, registry);

    let critical_count = count(&findings, Severity::Critical);
    let graph_report = GraphReport {
        nodes: graph.views(),
        critical_count,
        warning_count: count(&findings, Severity::Warning),
        info_count: count(&findings, Severity::Info),
        findings,
    };
    report::print_graph(json, &graph_report)?;
    Ok(report::exit_code(critical_count))
}

fn count(findings: &[domain::models::Finding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}
