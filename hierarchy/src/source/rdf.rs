//! Turtle 1.1 / N-Triples reader for `rdfs:subClassOf` statements.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use sophia_api::source::TripleSource;
use sophia_api::term::Term;
use sophia_api::triple::Triple;
use sophia_turtle::parser::{nt, turtle};
use tracing::{debug, info, warn};

use super::SubclassIndex;
use crate::error::{HierarchyError, Result};
use crate::model::{iris, ClassName};

/// Serialization of an ontology file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// Turtle 1.1.
    Turtle,
    /// N-Triples.
    NTriples,
}

impl RdfFormat {
    /// Picks the format from the file extension; anything but `.nt` is read
    /// as Turtle.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("nt") => RdfFormat::NTriples,
            _ => RdfFormat::Turtle,
        }
    }
}

/// Reads every `rdfs:subClassOf` statement between two IRIs from `path`.
///
/// Blank-node superclasses (OWL restrictions) are skipped. When `namespace`
/// is given, both IRIs must start with it. Class names are IRI local names,
/// see [`local_name`]; IRIs with an empty local name are skipped, and IRIs
/// that share a local name are merged into one class with a warning.
///
/// # Errors
///
/// Returns [`HierarchyError::MissingInput`] if the file does not exist,
/// [`HierarchyError::Io`] if it cannot be opened, and
/// [`HierarchyError::Parse`] if it is not valid Turtle / N-Triples.
pub fn load_ontology(path: &Path, namespace: Option<&str>) -> Result<SubclassIndex> {
    if !path.exists() {
        return Err(HierarchyError::MissingInput(format!(
            "ontology file not found: {}",
            path.display()
        )));
    }
    let format = RdfFormat::from_path(path);
    info!(path = %path.display(), ?format, "reading ontology");

    let file = File::open(path).map_err(|e| HierarchyError::io(path, e))?;
    let reader = BufReader::new(file);
    let mut index = SubclassIndex::new();
    let mut names = LocalNames::default();
    let outcome = match format {
        RdfFormat::Turtle => collect(turtle::parse_bufread(reader), namespace, &mut names, &mut index),
        RdfFormat::NTriples => collect(nt::parse_bufread(reader), namespace, &mut names, &mut index),
    };
    outcome.map_err(|message| HierarchyError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    info!(edges = index.edge_count(), "ontology parsed");
    Ok(index)
}

fn collect<S: TripleSource>(
    mut source: S,
    namespace: Option<&str>,
    names: &mut LocalNames,
    index: &mut SubclassIndex,
) -> std::result::Result<(), String> {
    source
        .for_each_triple(|t| {
            let (s, p, o) = (t.s(), t.p(), t.o());
            let Some(predicate) = p.iri() else { return };
            if predicate.as_str() != iris::RDFS_SUBCLASS_OF {
                return;
            }
            let (Some(child), Some(parent)) = (s.iri(), o.iri()) else {
                return;
            };
            let (child, parent) = (child.as_str(), parent.as_str());
            if let Some(ns) = namespace {
                if !child.starts_with(ns) || !parent.starts_with(ns) {
                    return;
                }
            }
            if child == parent {
                debug!(class = child, "skipping reflexive subClassOf");
                return;
            }
            let (Some(child), Some(parent)) = (names.class(child), names.class(parent)) else {
                return;
            };
            index.insert(child, parent);
        })
        .map_err(|e| e.to_string())
}

/// Maps IRIs to class names, remembering which IRI claimed each name first.
#[derive(Default)]
struct LocalNames {
    owners: HashMap<String, String>,
    reported: HashSet<String>,
}

impl LocalNames {
    fn class(&mut self, iri: &str) -> Option<ClassName> {
        let local = local_name(iri);
        if local.is_empty() {
            warn!(iri, "skipping IRI with an empty local name");
            return None;
        }
        let owner = self
            .owners
            .entry(local.to_string())
            .or_insert_with(|| iri.to_string());
        if owner.as_str() != iri && self.reported.insert(local.to_string()) {
            warn!(
                class = local,
                first = %owner,
                other = iri,
                "IRIs from different namespaces share a local name and are merged"
            );
        }
        Some(ClassName::from(local))
    }
}

/// Returns the local part of an IRI: the text after the last `#`, or after
/// the last `/` when there is no fragment.
#[must_use]
pub fn local_name(iri: &str) -> &str {
    match iri.rsplit_once('#') {
        Some((_, local)) => local,
        None => iri.rsplit_once('/').map_or(iri, |(_, local)| local),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SubclassQuery;

    #[test]
    fn local_names() {
        assert_eq!(
            local_name("http://standards.buildingsmart.org/IFC/DEV/IFC2x3/TC1/OWL#IfcWall"),
            "IfcWall"
        );
        assert_eq!(local_name("https://example.org/onto/Beam"), "Beam");
        assert_eq!(local_name("Plain"), "Plain");
        assert_eq!(local_name("http://example.org/a#"), "");
    }

    #[test]
    fn empty_and_shared_local_names() -> Result<()> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("local_names.ttl");
        let index = load_ontology(&path, None)?;
        assert_eq!(index.edge_count(), 1);
        assert_eq!(index.direct_subclasses(&"Root".into()), vec![ClassName::from("A")]);
        assert!(index.direct_subclasses(&"".into()).is_empty());
        Ok(())
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(RdfFormat::from_path(Path::new("a.nt")), RdfFormat::NTriples);
        assert_eq!(RdfFormat::from_path(Path::new("a.NT")), RdfFormat::NTriples);
        assert_eq!(RdfFormat::from_path(Path::new("a.ttl")), RdfFormat::Turtle);
        assert_eq!(RdfFormat::from_path(Path::new("a")), RdfFormat::Turtle);
    }

    #[test]
    fn missing_file_is_missing_input() {
        let err = load_ontology(Path::new("/nonexistent/onto.ttl"), None);
        assert!(matches!(err, Err(HierarchyError::MissingInput(_))));
    }
}
