//! Error types for the hierarchy pipeline.
//!
//! Every error aborts the whole run; there is no partial-success mode.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ClassName;

/// Structural defects in the subclass relation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    /// A class would be inserted into the tree a second time.
    #[error("class {class} already exists in the tree (second parent {parent})")]
    DuplicateNode {
        /// The repeated class.
        class: ClassName,
        /// Parent the repeated insertion was attempted under.
        parent: ClassName,
    },
    /// A child references a parent that is not in the tree yet.
    #[error("class {child} references parent {parent}, which is not in the tree")]
    UnknownParent {
        /// The missing parent.
        parent: ClassName,
        /// The child that referenced it.
        child: ClassName,
    },
    /// The subclass relation loops back onto an ancestor.
    #[error("subclass cycle: {class} is declared a subclass of its descendant {descendant}")]
    Cycle {
        /// The class reached again.
        class: ClassName,
        /// The descendant that lists it as a subclass.
        descendant: ClassName,
    },
    /// A class has more than one direct superclass below the root.
    #[error("class {class} has multiple parents: {first} and {second}")]
    MultipleParents {
        /// The class with several parents.
        class: ClassName,
        /// Parent through which the class was first reached.
        first: ClassName,
        /// The additional parent.
        second: ClassName,
    },
    /// A deprecated-class table entry is not a usable ancestor chain.
    #[error("deprecated class {class} has an invalid ancestor chain: {defect}")]
    InvalidDeprecatedChain {
        /// The table entry.
        class: ClassName,
        /// What is wrong with its chain.
        defect: ChainDefect,
    },
}

/// Ways a deprecated-class chain can be invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainDefect {
    /// The chain lists the class itself.
    #[error("the class is listed as its own ancestor")]
    SelfReference,
    /// The chain lists a name twice.
    #[error("ancestor {0} is listed more than once")]
    Repeated(ClassName),
    /// The chain is empty but the class is not the root.
    #[error("the chain is empty but the class is not the root")]
    Empty,
}

/// Errors raised by the hierarchy pipeline.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// A referenced file or required setting is absent.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// The subclass relation is not a single-parent tree.
    #[error("malformed ontology: {0}")]
    MalformedOntology(#[from] StructureError),

    /// An ancestor name is absent from the vocabulary.
    #[error("encoding inconsistency: ancestor {ancestor} of {class} is not in the vocabulary")]
    EncodingInconsistency {
        /// Class whose chain holds the unknown name.
        class: ClassName,
        /// The unknown ancestor.
        ancestor: ClassName,
    },

    /// The ontology file could not be parsed.
    #[error("failed to parse ontology {path}: {message}")]
    Parse {
        /// The ontology file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A TOML document could not be decoded.
    #[error("failed to decode {path}: {source}")]
    Config {
        /// The document.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// A JSON document could not be read or written.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// The document.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The vector artifact could not be encoded or decoded.
    #[error("failed to (de)serialize vector map {path}: {source}")]
    Persist {
        /// The artifact path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: bincode::Error,
    },
}

impl HierarchyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = HierarchyError> = std::result::Result<T, E>;
