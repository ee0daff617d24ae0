//! `class2vec`: builds and inspects class hierarchy vector artifacts.
//!
//! **Subcommands:**
//! - `build`: runs the pipeline: ontology → class tree → ancestor chains →
//!   multi-hot vectors, then writes the vector map.
//! - `inspect`: reads a vector map back and prints what it holds.
//!
//! **Usage:**
//! ```
//! class2vec build [--config <path>] [--ontology <path>] [--root-class <name>] [--no-tree] [--out <path>]
//! class2vec inspect <vectors> [--vocabulary <path>] [--class <name>]
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to change the level (default `info`).

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use class2vec::{persist, pipeline, ClassName, ConfigOverrides, PipelineConfig};
use tracing_subscriber::EnvFilter;

/// Build and inspect class hierarchy vectors.
#[derive(Parser)]
#[command(
    name = "class2vec",
    about = "Encode an rdfs:subClassOf taxonomy as multi-hot ancestor vectors"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline and write the vector map.
    Build {
        /// Pipeline configuration file (TOML); defaults to
        /// `config/defaults.toml` when that file exists.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Ontology file; overrides `ontology_path`.
        #[arg(long)]
        ontology: Option<PathBuf>,

        /// Root class; overrides `root_class`.
        #[arg(long)]
        root_class: Option<String>,

        /// Do not print the class tree.
        #[arg(long)]
        no_tree: bool,

        /// Vector map output; overrides `vector_map_path`.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the contents of a vector map.
    Inspect {
        /// Vector map written by `build`.
        vectors: PathBuf,

        /// Vocabulary sidecar, to print names instead of indices.
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Class whose vector to print.
        #[arg(long)]
        class: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Build {
            config,
            ontology,
            root_class,
            no_tree,
            out,
        } => build(config, ontology, root_class, no_tree, out),
        Command::Inspect {
            vectors,
            vocabulary,
            class,
        } => inspect(vectors, vocabulary, class),
    }
}

fn build(
    config_path: Option<PathBuf>,
    ontology: Option<PathBuf>,
    root_class: Option<String>,
    no_tree: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let overrides = ConfigOverrides {
        ontology_path: ontology,
        root_class: root_class.map(ClassName::from),
        render_tree: no_tree.then_some(false),
        vector_map_path: out,
    };
    // Without a config file, the overrides must carry the required settings.
    let file = PipelineConfig::locate(config_path);
    let config = PipelineConfig::resolve(file.as_deref(), overrides).with_context(|| {
        match &file {
            Some(path) => format!("Failed to load configuration {}", path.display()),
            None => "Failed to resolve configuration from command-line flags".to_string(),
        }
    })?;

    println!(
        "class2vec: {} rooted at {}",
        config.ontology_path.display(),
        config.root_class
    );

    let output = pipeline::run(&config).context("Pipeline failed")?;

    if let Some(view) = &output.tree_view {
        print!("{view}");
        println!();
    }

    for finding in &output.report.findings {
        println!("{finding}");
    }
    println!();
    println!(
        "Summary: {} classes, vector length {}, {} warnings",
        output.encoded.vectors.len(),
        output.encoded.vocabulary.len(),
        output.report.warning_count()
    );
    for path in &output.written {
        println!("  Written: {}", path.display());
    }
    println!("Build complete.");
    Ok(())
}

fn inspect(vectors: PathBuf, vocabulary: Option<PathBuf>, class: Option<String>) -> Result<()> {
    let map = persist::load_vectors(&vectors)
        .with_context(|| format!("Failed to read {}", vectors.display()))?;
    let vocab = vocabulary
        .as_deref()
        .map(persist::load_vocabulary)
        .transpose()
        .context("Failed to read vocabulary")?;

    let width = map.values().next().map_or(0, class2vec::ClassVector::len);
    println!("{}: {} classes, vector length {}", vectors.display(), map.len(), width);
    if let Some(vocab) = &vocab {
        if vocab.len() != width {
            bail!(
                "vocabulary has {} names but vectors have length {}",
                vocab.len(),
                width
            );
        }
    }

    let Some(class) = class else {
        return Ok(());
    };
    let Some(vector) = map.get(class.as_str()) else {
        bail!("class {class} not found in {}", vectors.display());
    };
    match &vocab {
        Some(vocab) => {
            let names: Vec<&str> = vocab.decode(vector).into_iter().map(ClassName::as_str).collect();
            println!("{class}: {}", names.join(", "));
        }
        None => println!("{class}: active indices {:?}", vector.active_indices()),
    }
    Ok(())
}
