#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bytes::Bytes;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Extension filter offered by the file selection control.
pub const ACCEPT_FILTER: &str = ".pdf,.docx";

/// Where a candidate file's bytes live.
///
/// On-disk content is only read when the upload request is built, so an
/// oversized selection can be rejected without loading it.
#[derive(Debug, Clone)]
pub enum FileContent {
    InMemory(Bytes),
    OnDisk(PathBuf),
}

/// A resume the user has selected or dropped. Replaced, never mutated.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    /// Declared type. Authoritative for validation; contents are never sniffed.
    pub mime_type: String,
    pub size_bytes: u64,
    pub content: FileContent,
}

impl CandidateFile {
    pub fn in_memory(name: impl Into<String>, mime_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as u64,
            content: FileContent::InMemory(bytes),
        }
    }

    pub fn on_disk(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
        path: PathBuf,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            content: FileContent::OnDisk(path),
        }
    }

    /// Human-readable size, e.g. "1.25 MB".
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / 1024.0 / 1024.0)
    }

    /// Loads the file bytes for the upload body.
    pub async fn read_bytes(&self) -> std::io::Result<Bytes> {
        match &self.content {
            FileContent::InMemory(bytes) => Ok(bytes.clone()),
            FileContent::OnDisk(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

/// The selection control: filters by extension and declares a MIME type the
/// way a browser file input does.
#[derive(Debug, Clone, Default)]
pub struct FilePicker {
    /// Declared type to use instead of the extension-derived one.
    pub content_type_override: Option<String>,
}

impl FilePicker {
    pub fn with_content_type(content_type: Option<String>) -> Self {
        Self {
            content_type_override: content_type,
        }
    }

    /// Whether the selection control would offer this path at all.
    pub fn accepts(path: &Path) -> bool {
        declared_type_for(path).is_some()
    }

    pub async fn pick(&self, path: &Path) -> Result<CandidateFile> {
        let declared = match (&self.content_type_override, declared_type_for(path)) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(mime)) => mime.to_string(),
            (None, None) => bail!(
                "'{}' is not offered by the file picker (accepts {ACCEPT_FILTER})",
                path.display()
            ),
        };

        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        if !metadata.is_file() {
            bail!("'{}' is not a regular file", path.display());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(CandidateFile::on_disk(
            name,
            declared,
            metadata.len(),
            path.to_path_buf(),
        ))
    }
}

fn declared_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(PDF_MIME),
        "docx" => Some(DOCX_MIME),
        _ => None,
    }
}
