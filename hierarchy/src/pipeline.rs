//! Pipeline entry points.
//!
//! Stages run strictly in order: ontology source, class network, class tree,
//! ancestor chains, deprecated-class merge, encoding, persistence. Any error
//! aborts the run before anything is written.

use std::path::PathBuf;

use tracing::info;

use crate::ancestors::{extract_ancestors, merge_deprecated};
use crate::config::{DeprecatedTable, PipelineConfig};
use crate::encoder::{encode, EncodedHierarchy};
use crate::error::Result;
use crate::model::{AncestorMap, ClassNetwork};
use crate::network::build_network;
use crate::persist;
use crate::report::{Finding, RunReport};
use crate::source::{load_ontology, SubclassIndex, SubclassQuery};
use crate::tree::{to_tree, ClassTree};

/// Everything a full run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Rendered tree, when `render_tree` is on.
    pub tree_view: Option<String>,
    /// Ancestor chains after the deprecated-class merge.
    pub ancestors: AncestorMap,
    /// Vocabulary and vectors.
    pub encoded: EncodedHierarchy,
    /// Non-fatal findings.
    pub report: RunReport,
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
}

/// Reads the configured ontology file.
///
/// # Errors
///
/// See [`load_ontology`].
pub fn load_source(config: &PipelineConfig) -> Result<SubclassIndex> {
    load_ontology(&config.ontology_path, config.namespace.as_deref())
}

/// Builds the tree of all descendants of the configured root class.
///
/// # Errors
///
/// Returns any error of [`load_source`], [`build_network`] or [`to_tree`].
pub fn build_descendants_tree(config: &PipelineConfig) -> Result<ClassTree> {
    let source = load_source(config)?;
    descendants_tree(config, &source, &mut RunReport::new())
}

/// Builds the ancestor chain of every class below the configured root.
///
/// # Errors
///
/// See [`build_descendants_tree`].
pub fn build_ancestor_map(config: &PipelineConfig) -> Result<AncestorMap> {
    Ok(extract_ancestors(&build_descendants_tree(config)?))
}

/// Runs the whole pipeline against the configured ontology file.
///
/// # Errors
///
/// See [`run_with_source`]; additionally fails if the ontology cannot be read.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let source = load_source(config)?;
    run_with_source(config, &source)
}

/// Runs the whole pipeline against an already loaded source.
///
/// # Errors
///
/// Returns [`HierarchyError::MissingInput`](crate::HierarchyError::MissingInput)
/// if the deprecated-class table is configured but absent,
/// [`HierarchyError::MalformedOntology`](crate::HierarchyError::MalformedOntology)
/// if the subclass relation is not a tree or a deprecated-class chain is
/// invalid,
/// [`HierarchyError::EncodingInconsistency`](crate::HierarchyError::EncodingInconsistency)
/// if a chain names an unknown class, and I/O or encoding errors from
/// persistence.
pub fn run_with_source<Q>(config: &PipelineConfig, source: &Q) -> Result<PipelineOutput>
where
    Q: SubclassQuery + ?Sized,
{
    let mut report = RunReport::new();
    let deprecated = config
        .deprecated_table_path
        .as_deref()
        .map(DeprecatedTable::load)
        .transpose()?;

    let tree = descendants_tree(config, source, &mut report)?;
    let tree_view = config.render_tree.then(|| tree.render());

    let mut ancestors = extract_ancestors(&tree);
    if let Some(table) = &deprecated {
        let overridden = merge_deprecated(&mut ancestors, table)?;
        report.push(Finding::info(
            "merge",
            format!("{} deprecated classes merged", table.len()),
        ));
        if !overridden.is_empty() {
            report.push(Finding::warn_with_details(
                "merge",
                format!("{} live ancestor chains replaced by the deprecated-class table", overridden.len()),
                overridden.iter().map(ToString::to_string).collect(),
            ));
        }
    }

    let encoded = encode(&ancestors)?;
    report.push(Finding::info(
        "encoder",
        format!(
            "{} classes encoded over a vocabulary of {}",
            encoded.vectors.len(),
            encoded.vocabulary.len()
        ),
    ));

    let mut written = Vec::new();
    if config.save_vector_map {
        written = persist::save_artifacts(
            &config.vector_map_path,
            &encoded.vectors,
            config
                .vocabulary_path
                .as_deref()
                .map(|path| (path, &encoded.vocabulary)),
        )?;
        for path in &written {
            report.push(Finding::info("persist", format!("written {}", path.display())));
        }
    }

    info!(
        classes = encoded.vectors.len(),
        warnings = report.warning_count(),
        "pipeline finished"
    );
    Ok(PipelineOutput {
        tree_view,
        ancestors,
        encoded,
        report,
        written,
    })
}

fn descendants_tree<Q>(config: &PipelineConfig, source: &Q, report: &mut RunReport) -> Result<ClassTree>
where
    Q: SubclassQuery + ?Sized,
{
    let network = build_network(&config.root_class, source, config.on_duplicate_edge)?;
    record_network(&network, report);
    to_tree(&network, &config.root_class)
}

fn record_network(network: &ClassNetwork, report: &mut RunReport) {
    report.push(Finding::info(
        "network",
        format!("{} classes visited below {}", network.len(), network.root()),
    ));
    if network.len() == 1 {
        report.push(Finding::warn_with_details(
            "network",
            format!("root class {} has no subclasses", network.root()),
            Vec::new(),
        ));
    }
    let dropped = network.dropped_edges();
    if !dropped.is_empty() {
        report.push(Finding::warn_with_details(
            "network",
            format!("{} redundant subclass edges dropped", dropped.len()),
            dropped
                .iter()
                .map(|e| match &e.kept_parent {
                    Some(kept) => format!("{} -> {} (kept under {kept})", e.parent, e.child),
                    None => format!("{} -> {} (root)", e.parent, e.child),
                })
                .collect(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;

    fn sample_source() -> SubclassIndex {
        SubclassIndex::from_edges([("A", "Root"), ("B", "Root"), ("C", "A"), ("C", "B")])
    }

    #[test]
    fn run_without_persistence() -> Result<()> {
        let mut config = PipelineConfig::new("unused.ttl", "Root");
        config.save_vector_map = false;
        let output = run_with_source(&config, &sample_source())?;

        assert!(output.written.is_empty());
        assert_eq!(output.encoded.vocabulary.len(), 4);
        assert_eq!(output.tree_view.as_deref(), Some("Root\n├── A\n│   └── C\n└── B\n"));
        assert_eq!(output.report.warning_count(), 1);
        assert!(output
            .report
            .for_stage("network")
            .any(|f| f.severity == Severity::Warning && f.details == ["B -> C (kept under A)"]));
        Ok(())
    }

    #[test]
    fn tree_view_is_optional() -> Result<()> {
        let mut config = PipelineConfig::new("unused.ttl", "Root");
        config.save_vector_map = false;
        config.render_tree = false;
        assert!(run_with_source(&config, &sample_source())?.tree_view.is_none());
        Ok(())
    }

    #[test]
    fn missing_deprecated_table_aborts_before_building() {
        let mut config = PipelineConfig::new("unused.ttl", "Root");
        config.save_vector_map = false;
        config.deprecated_table_path = Some(PathBuf::from("/nonexistent/deprecated.toml"));
        assert!(matches!(
            run_with_source(&config, &sample_source()),
            Err(crate::HierarchyError::MissingInput(_))
        ));
    }
}
