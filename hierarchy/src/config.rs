//! Pipeline configuration and the deprecated-class table.
//!
//! Configuration is an explicit [`PipelineConfig`] value. It is read from a
//! TOML document, optionally patched by [`ConfigOverrides`] (the CLI flags),
//! and then checked for the required settings:
//!
//! ```toml
//! ontology_path = "data/IFC2X3_TC1.ttl"
//! root_class = "IfcProduct"
//! render_tree = true
//! deprecated_table_path = "config/deprecated_classes.toml"
//! vector_map_path = "class2vec.bin"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{HierarchyError, Result};
use crate::model::ClassName;
use crate::network::DuplicateEdgePolicy;

/// Default output path of the vector artifact.
pub const DEFAULT_VECTOR_MAP_PATH: &str = "class2vec.bin";

/// Configuration file read when none is named.
pub const DEFAULT_CONFIG_PATH: &str = "config/defaults.toml";

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Ontology file (Turtle, or N-Triples with a `.nt` extension).
    pub ontology_path: PathBuf,
    /// Class the hierarchy is rooted at.
    pub root_class: ClassName,
    /// Only read subclass statements whose IRIs start with this prefix.
    pub namespace: Option<String>,
    /// Produce a textual tree view.
    pub render_tree: bool,
    /// Handling of classes reached through a second parent.
    pub on_duplicate_edge: DuplicateEdgePolicy,
    /// Deprecated-class table merged in before encoding.
    pub deprecated_table_path: Option<PathBuf>,
    /// Persist the vector map at the end of the run.
    pub save_vector_map: bool,
    /// Where the vector map is written.
    pub vector_map_path: PathBuf,
    /// Where the vocabulary sidecar is written, if anywhere.
    pub vocabulary_path: Option<PathBuf>,
}

impl PipelineConfig {
    /// Creates a configuration with every optional setting at its default.
    pub fn new(ontology_path: impl Into<PathBuf>, root_class: impl Into<ClassName>) -> Self {
        Self {
            ontology_path: ontology_path.into(),
            root_class: root_class.into(),
            namespace: None,
            render_tree: true,
            on_duplicate_edge: DuplicateEdgePolicy::default(),
            deprecated_table_path: None,
            save_vector_map: true,
            vector_map_path: PathBuf::from(DEFAULT_VECTOR_MAP_PATH),
            vocabulary_path: None,
        }
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// See [`PipelineConfig::resolve`].
    pub fn load(path: &Path) -> Result<Self> {
        Self::resolve(Some(path), ConfigOverrides::default())
    }

    /// Picks the configuration file for a run.
    ///
    /// A named file is always returned, present or not, so that resolving
    /// it reports a missing file. Without one, [`DEFAULT_CONFIG_PATH`] is
    /// used if it exists.
    #[must_use]
    pub fn locate(explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit.or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            default.exists().then_some(default)
        })
    }

    /// Reads `path` (if given), applies `overrides`, and checks that the
    /// ontology path and root class are set.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::MissingInput`] if `path` does not exist or
    /// a required setting is absent, and [`HierarchyError::Config`] if the
    /// document is not valid TOML of the expected shape.
    pub fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let (raw, origin) = match path {
            Some(path) => (RawConfig::read(path)?, path.display().to_string()),
            None => (RawConfig::default(), "command-line overrides".to_string()),
        };

        let ontology_path = overrides
            .ontology_path
            .or(raw.ontology_path)
            .ok_or_else(|| missing_key("ontology_path", &origin))?;
        let root_class = overrides
            .root_class
            .or(raw.root_class)
            .ok_or_else(|| missing_key("root_class", &origin))?;

        let mut config = Self::new(ontology_path, root_class);
        config.namespace = raw.namespace;
        config.render_tree = overrides
            .render_tree
            .or(raw.render_tree)
            .unwrap_or(config.render_tree);
        config.on_duplicate_edge = raw.on_duplicate_edge.unwrap_or_default();
        config.deprecated_table_path = raw.deprecated_table_path;
        config.save_vector_map = raw.save_vector_map.unwrap_or(config.save_vector_map);
        if let Some(out) = overrides.vector_map_path.or(raw.vector_map_path) {
            config.vector_map_path = out;
        }
        config.vocabulary_path = raw.vocabulary_path;
        Ok(config)
    }
}

fn missing_key(key: &str, origin: &str) -> HierarchyError {
    HierarchyError::MissingInput(format!("`{key}` not set in {origin}"))
}

/// Values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces `ontology_path`.
    pub ontology_path: Option<PathBuf>,
    /// Replaces `root_class`.
    pub root_class: Option<ClassName>,
    /// Replaces `render_tree`.
    pub render_tree: Option<bool>,
    /// Replaces `vector_map_path`.
    pub vector_map_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    ontology_path: Option<PathBuf>,
    root_class: Option<ClassName>,
    namespace: Option<String>,
    render_tree: Option<bool>,
    on_duplicate_edge: Option<DuplicateEdgePolicy>,
    deprecated_table_path: Option<PathBuf>,
    save_vector_map: Option<bool>,
    vector_map_path: Option<PathBuf>,
    vocabulary_path: Option<PathBuf>,
}

impl RawConfig {
    fn read(path: &Path) -> Result<Self> {
        let content = read_existing(path, "config file")?;
        toml::from_str(&content).map_err(|source| HierarchyError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn read_existing(path: &Path, what: &str) -> Result<String> {
    if !path.exists() {
        return Err(HierarchyError::MissingInput(format!(
            "{what} not found: {}",
            path.display()
        )));
    }
    std::fs::read_to_string(path).map_err(|e| HierarchyError::io(path, e))
}

/// Fixed ancestor chains for classes that are no longer in the live
/// ontology but still appear in legacy data.
///
/// Stored as a `[deprecated_classes]` table, TOML or JSON:
///
/// ```toml
/// [deprecated_classes]
/// IfcElectricDistributionPoint = ["IfcFlowController", "IfcDistributionFlowElement"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeprecatedTable {
    #[serde(default)]
    deprecated_classes: BTreeMap<ClassName, Vec<ClassName>>,
}

impl DeprecatedTable {
    /// Builds a table from `(class, chain)` entries.
    pub fn from_entries<I, C, A>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, Vec<A>)>,
        C: Into<ClassName>,
        A: Into<ClassName>,
    {
        let deprecated_classes = entries
            .into_iter()
            .map(|(class, chain)| (class.into(), chain.into_iter().map(Into::into).collect()))
            .collect();
        Self { deprecated_classes }
    }

    /// Reads a table from a `.json` file, or from TOML for any other
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::MissingInput`] if the file does not exist,
    /// and [`HierarchyError::Config`] / [`HierarchyError::Json`] if it cannot
    /// be decoded.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_existing(path, "deprecated-class table")?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&content).map_err(|source| HierarchyError::Json {
                path: path.to_path_buf(),
                source,
            })
        } else {
            toml::from_str(&content).map_err(|source| HierarchyError::Config {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    /// Chain for `class`, if listed.
    #[must_use]
    pub fn get(&self, class: &str) -> Option<&[ClassName]> {
        self.deprecated_classes.get(class).map(Vec::as_slice)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&ClassName, &Vec<ClassName>)> {
        self.deprecated_classes.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deprecated_classes.len()
    }

    /// Returns true if the table lists nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deprecated_classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_settings() -> Result<()> {
        let raw: RawConfig = toml::from_str(
            r#"
            ontology_path = "onto.ttl"
            root_class = "IfcProduct"
            "#,
        )
        .map_err(|source| HierarchyError::Config {
            path: PathBuf::from("inline"),
            source,
        })?;
        assert_eq!(raw.root_class.as_ref().map(ClassName::as_str), Some("IfcProduct"));

        let config = PipelineConfig::new("onto.ttl", "IfcProduct");
        assert!(config.render_tree);
        assert!(config.save_vector_map);
        assert_eq!(config.on_duplicate_edge, DuplicateEdgePolicy::Drop);
        assert_eq!(config.vector_map_path, PathBuf::from(DEFAULT_VECTOR_MAP_PATH));
        Ok(())
    }

    #[test]
    fn overrides_without_file() -> Result<()> {
        let config = PipelineConfig::resolve(
            None,
            ConfigOverrides {
                ontology_path: Some("x.ttl".into()),
                root_class: Some("Root".into()),
                render_tree: Some(false),
                vector_map_path: None,
            },
        )?;
        assert_eq!(config.ontology_path, PathBuf::from("x.ttl"));
        assert!(!config.render_tree);
        Ok(())
    }

    #[test]
    fn missing_root_is_missing_input() {
        let err = PipelineConfig::resolve(
            None,
            ConfigOverrides {
                ontology_path: Some("x.ttl".into()),
                ..ConfigOverrides::default()
            },
        );
        assert!(matches!(err, Err(HierarchyError::MissingInput(ref m)) if m.contains("root_class")));
    }

    #[test]
    fn missing_file_is_missing_input() {
        assert!(matches!(
            PipelineConfig::load(Path::new("/nonexistent/defaults.toml")),
            Err(HierarchyError::MissingInput(_))
        ));
        assert!(matches!(
            DeprecatedTable::load(Path::new("/nonexistent/deprecated.toml")),
            Err(HierarchyError::MissingInput(_))
        ));
    }

    #[test]
    fn named_config_file_must_exist() {
        let overrides = ConfigOverrides {
            ontology_path: Some("x.ttl".into()),
            root_class: Some("Root".into()),
            ..ConfigOverrides::default()
        };
        let file = PipelineConfig::locate(Some(PathBuf::from("/nonexistent/typo.toml")));
        assert_eq!(file, Some(PathBuf::from("/nonexistent/typo.toml")));
        assert!(matches!(
            PipelineConfig::resolve(file.as_deref(), overrides),
            Err(HierarchyError::MissingInput(ref m)) if m.contains("typo.toml")
        ));
    }

    #[test]
    fn duplicate_policy_parses_lowercase() {
        let raw: std::result::Result<RawConfig, _> = toml::from_str(r#"on_duplicate_edge = "reject""#);
        assert!(matches!(
            raw,
            Ok(RawConfig {
                on_duplicate_edge: Some(DuplicateEdgePolicy::Reject),
                ..
            })
        ));
    }

    #[test]
    fn deprecated_table_from_toml() -> Result<()> {
        let table: DeprecatedTable = toml::from_str(
            r#"
            [deprecated_classes]
            D = ["A", "Root"]
            "#,
        )
        .map_err(|source| HierarchyError::Config {
            path: PathBuf::from("inline"),
            source,
        })?;
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("D").map(|c| c.iter().map(ClassName::as_str).collect::<Vec<_>>()),
            Some(vec!["A", "Root"])
        );
        Ok(())
    }
}
