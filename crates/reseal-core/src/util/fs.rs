//! Filesystem utilities.

use reseal_types::{ResealError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Expand a leading `~` to the home directory.
pub fn expand_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }

    path.to_path_buf()
}

/// A temporary file holding sensitive content.
///
/// The file is created owner-readable only and is removed when the value
/// is dropped, whichever way the owning scope exits.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Create a file named `<prefix>XXXXXX<suffix>` in `dir` (or the system
    /// temp dir) and write `contents` to it.
    pub fn create(dir: Option<&Path>, prefix: &str, suffix: &str, contents: &[u8]) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(suffix);

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| ResealError::Io(std::io::Error::new(e.kind(), format!("Failed to create temp file: {}", e))))?;

        file.write_all(contents)?;
        file.flush()?;

        Ok(Self { file })
    }

    /// Location of the file on disk.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
