//! Persistence of the vector map and its vocabulary.
//!
//! The vector map is a bincode-encoded `BTreeMap<String, Vec<f32>>`. The
//! vocabulary sidecar is a JSON array of names in index order.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::encoder::Vocabulary;
use crate::error::{HierarchyError, Result};
use crate::model::{ClassName, VectorMap};

/// Writes `vectors` to `path`.
///
/// The map is first written to a sibling temporary file and then renamed
/// into place, so `path` never holds a partial artifact.
///
/// # Errors
///
/// Returns [`HierarchyError::Io`] if the file cannot be written and
/// [`HierarchyError::Persist`] if encoding fails.
pub fn save_vectors(path: &Path, vectors: &VectorMap) -> Result<()> {
    save_artifacts(path, vectors, None).map(drop)
}

/// Writes the vector map and, if given, the vocabulary sidecar as one unit.
///
/// Both files are staged first and only renamed into place once every write
/// has succeeded. On failure the staged files are removed, along with any
/// artifact this call already committed. Returns the committed paths in
/// write order: vocabulary first, then the vector map.
///
/// # Errors
///
/// Returns [`HierarchyError::Io`] if a file cannot be written or renamed,
/// [`HierarchyError::Json`] if the vocabulary cannot be encoded, and
/// [`HierarchyError::Persist`] if the vector map cannot be encoded.
pub fn save_artifacts(
    vector_map: &Path,
    vectors: &VectorMap,
    vocabulary: Option<(&Path, &Vocabulary)>,
) -> Result<Vec<PathBuf>> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::new();
    if let Some((path, vocab)) = vocabulary {
        staged.push((stage(path, |w| write_vocabulary(w, path, vocab))?, path));
    }
    match stage(vector_map, |w| write_vectors(w, vector_map, vectors)) {
        Ok(staging) => staged.push((staging, vector_map)),
        Err(err) => {
            discard(staged.iter().map(|(staging, _)| staging.as_path()));
            return Err(err);
        }
    }

    let mut written: Vec<PathBuf> = Vec::new();
    for (staging, path) in &staged {
        if let Err(e) = fs::rename(staging, path) {
            discard(staged.iter().map(|(staging, _)| staging.as_path()));
            discard(written.iter().map(PathBuf::as_path));
            return Err(HierarchyError::io(*path, e));
        }
        written.push(path.to_path_buf());
    }

    info!(
        path = %vector_map.display(),
        entries = vectors.len(),
        vocabulary = vocabulary.map(|(_, v)| v.len()),
        "vector map saved"
    );
    Ok(written)
}

fn stage<F>(path: &Path, write: F) -> Result<PathBuf>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let staging = staging_path(path);
    let outcome = create(&staging).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush().map_err(|e| HierarchyError::io(&staging, e))
    });
    match outcome {
        Ok(()) => Ok(staging),
        Err(err) => {
            let _ = fs::remove_file(&staging);
            Err(err)
        }
    }
}

fn discard<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

fn write_vectors(writer: &mut BufWriter<File>, path: &Path, vectors: &VectorMap) -> Result<()> {
    bincode::serialize_into(writer, vectors).map_err(|source| HierarchyError::Persist {
        path: path.to_path_buf(),
        source,
    })
}

fn write_vocabulary(writer: &mut BufWriter<File>, path: &Path, vocabulary: &Vocabulary) -> Result<()> {
    serde_json::to_writer_pretty(writer, vocabulary.names()).map_err(|source| HierarchyError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a vector map written by [`save_vectors`].
///
/// # Errors
///
/// Returns [`HierarchyError::MissingInput`] if `path` does not exist,
/// [`HierarchyError::Io`] if it cannot be opened, and
/// [`HierarchyError::Persist`] if it is not a vector map.
pub fn load_vectors(path: &Path) -> Result<VectorMap> {
    if !path.exists() {
        return Err(HierarchyError::MissingInput(format!(
            "vector map not found: {}",
            path.display()
        )));
    }
    let file = File::open(path).map_err(|e| HierarchyError::io(path, e))?;
    bincode::deserialize_from(BufReader::new(file)).map_err(|source| HierarchyError::Persist {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the vocabulary as a JSON array of names in index order.
///
/// Staged and renamed into place like [`save_vectors`].
///
/// # Errors
///
/// Returns [`HierarchyError::Io`] if the file cannot be written and
/// [`HierarchyError::Json`] if encoding fails.
pub fn save_vocabulary(path: &Path, vocabulary: &Vocabulary) -> Result<()> {
    let staging = stage(path, |w| write_vocabulary(w, path, vocabulary))?;
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(HierarchyError::io(path, e));
    }
    info!(path = %path.display(), size = vocabulary.len(), "vocabulary saved");
    Ok(())
}

/// Reads a vocabulary written by [`save_vocabulary`].
///
/// # Errors
///
/// Returns [`HierarchyError::MissingInput`] if `path` does not exist,
/// [`HierarchyError::Io`] if it cannot be opened, and
/// [`HierarchyError::Json`] if it is not a JSON array of names.
pub fn load_vocabulary(path: &Path) -> Result<Vocabulary> {
    if !path.exists() {
        return Err(HierarchyError::MissingInput(format!(
            "vocabulary not found: {}",
            path.display()
        )));
    }
    let file = File::open(path).map_err(|e| HierarchyError::io(path, e))?;
    let names: Vec<ClassName> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| HierarchyError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Vocabulary::from_names(names))
}

fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| HierarchyError::io(parent, e))?;
    }
    File::create(path).map_err(|e| HierarchyError::io(path, e))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}
