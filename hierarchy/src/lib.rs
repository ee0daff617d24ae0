//! Class hierarchy vectors from an `rdfs:subClassOf` taxonomy.
//!
//! The `class2vec` crate expands the subclass relation of an ontology below a
//! chosen root class into a single-parent tree, extracts every class's
//! ancestor chain, and encodes each class as a fixed-length multi-hot vector
//! that flags the class and all of its ancestors.
//!
//! # Entry Point
//!
//! ```no_run
//! use class2vec::{pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::new("IFC2X3_TC1.ttl", "IfcProduct");
//! let output = pipeline::run(&config).expect("pipeline failed");
//! println!("{} classes", output.encoded.vocabulary.len());
//! ```
//!
//! # Stages
//!
//! ```
//! use class2vec::source::SubclassIndex;
//! use class2vec::{ancestors, encoder, network, tree};
//!
//! let source = SubclassIndex::from_edges([("A", "Root"), ("B", "Root"), ("C", "A")]);
//! let root = "Root".into();
//! let net = network::build_network(&root, &source, network::DuplicateEdgePolicy::Drop)?;
//! let tree = tree::to_tree(&net, &root)?;
//! let chains = ancestors::extract_ancestors(&tree);
//! let encoded = encoder::encode(&chains)?;
//! assert_eq!(encoded.vocabulary.len(), 4);
//! assert_eq!(encoded.vectors["C"].count_ones(), 3);
//! # Ok::<(), class2vec::HierarchyError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod ancestors;
pub mod config;
pub mod encoder;
pub mod error;
pub mod model;
pub mod network;
pub mod persist;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod tree;

pub use config::{ConfigOverrides, DeprecatedTable, PipelineConfig};
pub use encoder::{EncodedHierarchy, Vocabulary};
pub use error::{ChainDefect, HierarchyError, StructureError};
pub use model::{AncestorMap, ClassName, ClassNetwork, ClassVector, DroppedEdge, VectorMap};
pub use network::DuplicateEdgePolicy;
pub use pipeline::PipelineOutput;
pub use report::{Finding, RunReport, Severity};
pub use tree::ClassTree;
