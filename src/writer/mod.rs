//! Report persistence
//!
//! Every artifact is written to a temporary file in its destination
//! directory and renamed into place, so the target path only ever holds a
//! complete document. The Markdown summary is rendered from the same
//! [`ReportArtifact`] as the JSON, never from raw tool output.

mod markdown;

pub use markdown::render_markdown;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::report::ReportArtifact;

/// Errors from writing report artifacts
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WriteError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Paths that were written
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenReport {
    pub json_path: PathBuf,
    pub md_path: Option<PathBuf>,
    pub fingerprint: String,
}

/// Writes report artifacts atomically
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportWriter;

impl ReportWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the JSON report and, when requested, the Markdown summary.
    ///
    /// Both files are staged before either is renamed into place, and the
    /// JSON goes last: a failed run leaves the previous JSON untouched.
    pub fn write(
        &self,
        artifact: &ReportArtifact,
        json_path: &Path,
        md_path: Option<&Path>,
    ) -> Result<WrittenReport, WriteError> {
        let json = artifact.to_json()?;
        let fingerprint = artifact.fingerprint()?;

        let staged_md = md_path
            .map(|path| StagedFile::stage(path, render_markdown(artifact).as_bytes()))
            .transpose()?;
        let staged_json = StagedFile::stage(json_path, json.as_bytes())?;

        if let Some(md) = staged_md {
            md.commit()?;
        }
        staged_json.commit()?;

        tracing::info!(
            json = %json_path.display(),
            md = ?md_path.map(|p| p.display().to_string()),
            %fingerprint,
            "report written"
        );

        Ok(WrittenReport {
            json_path: json_path.to_path_buf(),
            md_path: md_path.map(Path::to_path_buf),
            fingerprint,
        })
    }

    pub fn write_json(&self, artifact: &ReportArtifact, path: &Path) -> Result<(), WriteError> {
        let json = artifact.to_json()?;
        write_atomic(path, json.as_bytes())
    }

    pub fn write_markdown(&self, artifact: &ReportArtifact, path: &Path) -> Result<(), WriteError> {
        write_atomic(path, render_markdown(artifact).as_bytes())
    }
}

/// Write `contents` to `path` via a temp file in the same directory.
///
/// The temp file has a unique name, so concurrent writers to the same path
/// never share a partially written file; the last rename wins.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    StagedFile::stage(path, contents)?.commit()
}

/// Fully written and synced temp file, not yet at its destination.
///
/// Dropping it without `commit` removes the temp file.
struct StagedFile {
    temp: NamedTempFile,
    path: PathBuf,
}

impl StagedFile {
    fn stage(path: &Path, contents: &[u8]) -> Result<Self, WriteError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| WriteError::io(&dir, e))?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| WriteError::io(&dir, e))?;
        temp.write_all(contents).map_err(|e| WriteError::io(path, e))?;
        temp.as_file().sync_all().map_err(|e| WriteError::io(path, e))?;

        Ok(Self {
            temp,
            path: path.to_path_buf(),
        })
    }

    fn commit(self) -> Result<(), WriteError> {
        let Self { temp, path } = self;
        temp.persist(&path).map_err(|e| WriteError::io(&path, e.error))?;
        Ok(())
    }
}
