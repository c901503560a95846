//! Directory-backed artifact persistence.
//!
//! Every artifact lives in `<dir>/<name>.bin` and starts with a small header
//! carrying its [`ArtifactKind`] and logical name, followed by the bincode
//! payload. Writes go to a temporary file in the same directory that is then
//! renamed over the target, so readers never observe a partial file.

use crate::core::constants::ARTIFACT_EXTENSION;
use crate::core::error::{PipelineError, Result};
use crate::core::types::ArtifactKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A value that can be persisted in an [`ArtifactStore`].
pub trait Artifact: Serialize + DeserializeOwned {
    /// Kind tag written ahead of the payload
    const KIND: ArtifactKind;
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactHeader {
    kind: ArtifactKind,
    name: String,
}

/// An encoded artifact waiting in a temporary file for its rename.
#[derive(Debug)]
pub struct StagedArtifact {
    name: String,
    target: PathBuf,
    file: NamedTempFile,
}

impl StagedArtifact {
    /// Logical artifact name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Durable store of codecs and models keyed by logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`; the directory is created on first save.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        ArtifactStore { dir: dir.into() }
    }

    /// Directory holding the artifacts
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path of an artifact
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, ARTIFACT_EXTENSION))
    }

    /// True when the artifact file exists
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    /// Encode `value` into a temporary file next to its target.
    pub fn stage<T: Artifact>(&self, name: &str, value: &T) -> Result<StagedArtifact> {
        fs::create_dir_all(&self.dir)?;

        let file = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(file.as_file());
            let header = ArtifactHeader {
                kind: T::KIND,
                name: name.to_string(),
            };
            bincode::serialize_into(&mut writer, &header)?;
            bincode::serialize_into(&mut writer, value)?;
            writer.flush()?;
        }
        file.as_file().sync_all()?;

        log::debug!("Staged {} artifact '{}'", T::KIND, name);
        Ok(StagedArtifact {
            name: name.to_string(),
            target: self.path(name),
            file,
        })
    }

    /// Rename every staged artifact over its target.
    pub fn commit(&self, staged: Vec<StagedArtifact>) -> Result<()> {
        for artifact in staged {
            artifact
                .file
                .persist(&artifact.target)
                .map_err(|e| PipelineError::from(e.error))?;
            log::info!(
                "Saved artifact '{}' to {}",
                artifact.name,
                artifact.target.display()
            );
        }
        Ok(())
    }

    /// Persist one artifact, atomically replacing any previous version.
    pub fn save<T: Artifact>(&self, name: &str, value: &T) -> Result<()> {
        let staged = self.stage(name, value)?;
        self.commit(vec![staged])
    }

    /// Load an artifact; missing, corrupt or mistyped files are `ArtifactLoad` errors.
    pub fn load<T: Artifact>(&self, name: &str) -> Result<T> {
        self.read(name).map_err(|message| {
            log::error!("Failed to load artifact '{}': {}", name, message);
            PipelineError::artifact_load(name, message)
        })
    }

    fn read<T: Artifact>(&self, name: &str) -> std::result::Result<T, String> {
        let path = self.path(name);
        let file = File::open(&path)
            .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
        let mut reader = BufReader::new(file);

        let header: ArtifactHeader = bincode::deserialize_from(&mut reader)
            .map_err(|e| format!("corrupt header in {}: {}", path.display(), e))?;
        if header.kind != T::KIND {
            return Err(format!(
                "{} holds a {} artifact, expected a {}",
                path.display(),
                header.kind,
                T::KIND
            ));
        }
        if header.name != name {
            return Err(format!(
                "{} holds artifact '{}', expected '{}'",
                path.display(),
                header.name,
                name
            ));
        }

        bincode::deserialize_from(&mut reader)
            .map_err(|e| format!("corrupt payload in {}: {}", path.display(), e))
    }
}

/// Write `bytes` to `path` through a temporary file in the same directory.
pub fn write_file_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut file = NamedTempFile::new_in(&dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| PipelineError::from(e.error))?;

    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
